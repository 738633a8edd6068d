//! Client configuration.
//!
//! `ClientConfig` is immutable once handed to a client. It deserializes with
//! serde (field names match the construction options other SDKs accept:
//! `api_key`, `secure`) and can also be read from the environment.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Production host of the calculator endpoint.
pub const DEFAULT_HOST: &str = "api.apiverve.com";

/// Path of the calculator endpoint on every host.
pub const ENDPOINT_PATH: &str = "/v1/menstrualcyclecalculator";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "APIVERVE_API_KEY";

/// Fallback variable used by the example scripts of other SDKs.
pub const API_KEY_FALLBACK_ENV: &str = "API_KEY";

/// Set to `false` / `0` to talk plain HTTP.
pub const SECURE_ENV: &str = "APIVERVE_SECURE";

const MISSING_KEY_MESSAGE: &str = "API key is required. Get your API key at: https://apiverve.com";

/// How query options travel to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestEncoding {
    /// `POST` with the options as a JSON body.
    #[default]
    JsonBody,
    /// `GET` with the options as URL query parameters.
    QueryString,
}

/// Configuration for `MenstrualCycleClient`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: String,

    /// Use HTTPS when true (default), HTTP otherwise.
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Host (and optional port) of the endpoint.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub encoding: RequestEncoding,

    /// Run `QueryOptions::validate` before sending.
    #[serde(default)]
    pub validate: bool,
}

fn default_secure() -> bool {
    true
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("secure", &self.secure)
            .field("host", &self.host)
            .field("encoding", &self.encoding)
            .field("validate", &self.validate)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secure: default_secure(),
            host: default_host(),
            encoding: RequestEncoding::default(),
            validate: false,
        }
    }

    /// Build a configuration from `APIVERVE_API_KEY` (or `API_KEY`) and
    /// `APIVERVE_SECURE`.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var(API_KEY_ENV)
            .or_else(|_| std::env::var(API_KEY_FALLBACK_ENV))
            .map_err(|_| ClientError::Config(MISSING_KEY_MESSAGE.to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(raw) = std::env::var(SECURE_ENV) {
            config.secure = parse_bool(&raw).ok_or_else(|| {
                ClientError::Config(format!("{SECURE_ENV} must be true or false, got {raw:?}"))
            })?;
        }
        config.check()?;
        Ok(config)
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn encoding(mut self, encoding: RequestEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Full endpoint URL, e.g. `https://api.apiverve.com/v1/menstrualcyclecalculator`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}{ENDPOINT_PATH}",
            self.scheme(),
            self.host.trim_end_matches('/')
        )
    }

    /// Reject configurations no request could succeed with.
    pub(crate) fn check(&self) -> Result<(), ClientError> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::Config(MISSING_KEY_MESSAGE.to_string()));
        }
        if !self.api_key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ClientError::Config(
                "API key must contain only visible ASCII characters".to_string(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(ClientError::Config("host must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

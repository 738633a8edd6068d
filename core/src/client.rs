//! Request builder, response parser and async executor for the calculator API.
//!
//! # Design
//! `MenstrualCycleClient` holds only its immutable `ClientConfig` and a
//! transport, and carries no mutable state between calls, so one instance can
//! serve any number of concurrent `execute` calls. Each call is split into
//! `build_request`, which produces an `HttpRequest`, and `parse_response`,
//! which consumes an `HttpResponse`. `execute` glues the two halves around a
//! single `Transport::send`; hosts that do their own I/O (the C ABI, blocking
//! callers) use the halves directly through a client built with
//! `without_transport`.

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::config::{ClientConfig, RequestEncoding};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{ApiResponse, QueryOptions};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the Menstrual Cycle Calculator endpoint.
///
/// `T` is the transport used by `execute`; `()` means the caller performs the
/// round-trip itself between `build_request` and `parse_response`.
#[derive(Debug, Clone)]
pub struct MenstrualCycleClient<T = ()> {
    config: ClientConfig,
    transport: T,
}

/// Client backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type DefaultClient = MenstrualCycleClient<crate::transport::ReqwestTransport>;

#[cfg(feature = "reqwest")]
impl MenstrualCycleClient<crate::transport::ReqwestTransport> {
    /// Build a client using a fresh `reqwest` connection pool.
    ///
    /// Fails with `ClientError::Config` when the API key is missing or blank.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, crate::transport::ReqwestTransport::new())
    }
}

impl MenstrualCycleClient<()> {
    /// Build a client that only builds requests and parses responses.
    pub fn without_transport(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, ())
    }
}

impl<T> MenstrualCycleClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        config.check()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `query`; `None` sends an empty object.
    pub fn build_request(&self, query: Option<&QueryOptions>) -> Result<HttpRequest, ClientError> {
        if self.config.validate {
            match query {
                Some(q) => q.validate()?,
                None => QueryOptions::default().validate()?,
            }
        }
        let params = match query {
            Some(q) => serde_json::to_value(q).map_err(|e| ClientError::Serialization(e.to_string()))?,
            None => Value::Object(Map::new()),
        };
        self.request_for(params)
    }

    /// Build the request for an arbitrary parameter object. No client-side
    /// validation is applied.
    pub fn build_raw_request(&self, params: &Map<String, Value>) -> Result<HttpRequest, ClientError> {
        self.request_for(Value::Object(params.clone()))
    }

    fn request_for(&self, params: Value) -> Result<HttpRequest, ClientError> {
        let endpoint = self.config.endpoint();
        let api_key = (API_KEY_HEADER.to_string(), self.config.api_key.clone());

        match self.config.encoding {
            RequestEncoding::JsonBody => {
                let body =
                    serde_json::to_string(&params).map_err(|e| ClientError::Serialization(e.to_string()))?;
                Ok(HttpRequest {
                    method: HttpMethod::Post,
                    url: endpoint,
                    headers: vec![
                        api_key,
                        ("content-type".to_string(), "application/json".to_string()),
                    ],
                    body: Some(body),
                })
            }
            RequestEncoding::QueryString => {
                let mut url = url::Url::parse(&endpoint)
                    .map_err(|e| ClientError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
                let pairs = query_pairs(&params);
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
                Ok(HttpRequest {
                    method: HttpMethod::Get,
                    url: url.into(),
                    headers: vec![api_key],
                    body: None,
                })
            }
        }
    }

    /// Interpret a raw response.
    ///
    /// 2xx with an `"ok"` envelope yields the envelope untouched. Non-2xx
    /// responses and error-shaped bodies become `ClientError::Api`; a numeric
    /// `status` in the body wins over the HTTP status in both cases.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse, ClientError> {
        let body: Option<Value> = serde_json::from_str(&response.body).ok();

        if !response.is_success() {
            let status = body.as_ref().and_then(body_status).unwrap_or(response.status);
            let error = body
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("Request failed with status code {}", response.status));
            return Err(ClientError::Api { status, error });
        }

        let Some(body) = body else {
            return Err(ClientError::Deserialization(format!(
                "response body is not JSON ({} bytes)",
                response.body.len()
            )));
        };

        if is_error_envelope(&body) {
            let status = body_status(&body).unwrap_or(response.status);
            let error = error_message(&body)
                .unwrap_or_else(|| "The service reported an error without a message".to_string());
            return Err(ClientError::Api { status, error });
        }

        serde_json::from_value(body).map_err(|e| ClientError::Deserialization(e.to_string()))
    }
}

impl<T: Transport> MenstrualCycleClient<T> {
    /// Send one request for `query` and return the parsed envelope.
    pub async fn execute(&self, query: Option<&QueryOptions>) -> Result<ApiResponse, ClientError> {
        let request = self.build_request(query)?;
        self.dispatch(request).await
    }

    /// Same as `execute`, with the body taken from an arbitrary JSON object.
    pub async fn execute_raw(&self, params: &Map<String, Value>) -> Result<ApiResponse, ClientError> {
        let request = self.build_raw_request(params)?;
        self.dispatch(request).await
    }

    /// Run `execute` and hand the outcome to `callback` before returning it.
    pub async fn execute_with_callback<F>(
        &self,
        query: Option<&QueryOptions>,
        callback: F,
    ) -> Result<ApiResponse, ClientError>
    where
        F: FnOnce(Result<&ApiResponse, &ClientError>) + Send,
    {
        let outcome = self.execute(query).await;
        callback(outcome.as_ref());
        outcome
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<ApiResponse, ClientError> {
        debug!(
            method = request.method.as_str(),
            endpoint = %self.config.endpoint(),
            "sending request"
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(cause = ?e.cause(), "transport failure");
                return Err(e.into());
            }
        };
        debug!(status = response.status, "received response");

        let outcome = self.parse_response(response);
        if let Err(ClientError::Api { status, error }) = &outcome {
            warn!(status = *status, error = %error, "service returned an error");
        }
        outcome
    }
}

/// A body counts as an error envelope when `status` is `"error"`, or when it
/// carries a non-null `error` alongside a numeric `status`.
fn is_error_envelope(body: &Value) -> bool {
    match body.get("status") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("error"),
        Some(Value::Number(_)) => body.get("error").is_some_and(|e| !e.is_null()),
        _ => false,
    }
}

/// Numeric `status` carried in the body, if it is a valid HTTP status code.
fn body_status(body: &Value) -> Option<u16> {
    body.get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Flatten a JSON object into query pairs. Nulls are dropped, strings are
/// sent unquoted, everything else uses its JSON text.
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Some(object) = params.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k.clone(), s.clone())),
            other => Some((k.clone(), other.to_string())),
        })
        .collect()
}

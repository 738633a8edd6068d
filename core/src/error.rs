//! Error types for the Menstrual Cycle Calculator client.
//!
//! # Design
//! Three failure families reach the caller: the client could not be built
//! (`Config`), the service answered with an error (`Api`), or the request
//! never completed (`Transport`). The remaining variants cover local
//! encode/decode problems and opt-in parameter validation. Nothing is retried
//! or swallowed; every error is returned to the caller as-is.

use std::fmt;

use thiserror::Error;

/// Message carried by every transport failure. The underlying cause stays
/// available through `std::error::Error::source`.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while processing the request";

/// Errors returned by `MenstrualCycleClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client configuration is unusable (e.g. missing API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// The service returned a non-2xx status or an error envelope.
    #[error("API error ({status}): {error}")]
    Api { status: u16, error: String },

    /// The request did not complete at the network level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Query parameters failed client-side range checks.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into an `ApiResponse`.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ClientError {
    /// HTTP status attached to the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Network-level failure (DNS, connect, timeout, reset).
///
/// Deliberately unclassified: the message shown to callers is always
/// [`TRANSPORT_FAILURE_MESSAGE`].
#[derive(Debug)]
pub struct TransportError {
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            source: Some(source.into()),
        }
    }

    /// A transport failure with no underlying cause to report.
    pub fn generic() -> Self {
        Self { source: None }
    }

    /// Human-readable description of the underlying cause, for logs.
    pub fn cause(&self) -> Option<String> {
        self.source.as_ref().map(|e| e.to_string())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TRANSPORT_FAILURE_MESSAGE)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

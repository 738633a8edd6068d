//! The network seam between the client and the HTTP stack.
//!
//! `Transport` executes one `HttpRequest` and returns the raw response,
//! whatever its status. Status interpretation stays in
//! `MenstrualCycleClient::parse_response`, so every implementation only has
//! to report "got a response" or "did not".

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes HTTP requests on behalf of `MenstrualCycleClient`.
///
/// Implementations must return `Ok` for any response that arrived, including
/// 4xx/5xx, and `Err` only when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use async_trait::async_trait;
    use reqwest::Client;

    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    use super::Transport;

    /// `Transport` backed by a shared `reqwest::Client`.
    ///
    /// No request timeout is configured; the connection-level defaults of
    /// reqwest apply.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Reuse an existing client (connection pool, proxy settings, ...).
        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            };

            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(TransportError::new)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.text().await.map_err(TransportError::new)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

//! Client core for the Menstrual Cycle Calculator API.
//!
//! # Overview
//! Sends one request per call to
//! `https://api.apiverve.com/v1/menstrualcyclecalculator` with an `x-api-key`
//! header and hands back the service's JSON envelope, or a structured error.
//! The cycle computation itself happens server-side.
//!
//! # Design
//! - `MenstrualCycleClient` holds only its immutable `ClientConfig` and a
//!   transport; concurrent calls share nothing else.
//! - Every call is split into `build_request` (produces `HttpRequest`) and
//!   `parse_response` (consumes `HttpResponse`), so the I/O boundary is
//!   explicit and hosts can drive the round-trip themselves.
//! - `execute` runs both halves around a `Transport`; `ReqwestTransport` is
//!   the default (cargo feature `reqwest`).
//! - `ApiResponse` keeps the envelope exactly as sent; the typed
//!   `CycleCalculationResult` view is decoded on demand.
//!
//! ```no_run
//! # async fn run() -> Result<(), menstrual_cycle_core::ClientError> {
//! use menstrual_cycle_core::{ClientConfig, MenstrualCycleClient, QueryOptions};
//!
//! let client = MenstrualCycleClient::new(ClientConfig::from_env()?)?;
//! let query = QueryOptions::new("2024-01-01".parse().unwrap())
//!     .with_cycle_length(28)
//!     .with_period_length(5)
//!     .with_cycles(3);
//! let response = client.execute(Some(&query)).await?;
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(feature = "reqwest")]
pub use client::DefaultClient;
pub use client::{MenstrualCycleClient, API_KEY_HEADER};
pub use config::{ClientConfig, RequestEncoding};
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use types::{
    ApiResponse, Averages, CurrentStatus, Cycle, CycleCalculationResult, CyclePhases, DateWindow,
    Ovulation, OvulationPhase, Phase, PmsPhase, QueryOptions,
};

//! Domain DTOs for the Menstrual Cycle Calculator API.
//!
//! # Design
//! `QueryOptions` is the request payload: every field is optional and absent
//! fields never reach the wire, leaving business rules to the service.
//! `ApiResponse` keeps the whole envelope as the JSON object the service sent,
//! so it is handed back to the caller unmodified; `CycleCalculationResult` is
//! a typed view of `data` decoded on demand through `ApiResponse::cycle_result`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Accepted range for `QueryOptions::cycle_length`, in days.
pub const CYCLE_LENGTH_RANGE: (u32, u32) = (21, 35);
/// Accepted range for `QueryOptions::period_length`, in days.
pub const PERIOD_LENGTH_RANGE: (u32, u32) = (2, 10);
/// Accepted range for `QueryOptions::cycles`.
pub const CYCLES_RANGE: (u32, u32) = (1, 12);

/// Parameters describing the user's cycle history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// First day of the last menstrual period, sent as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_period: Option<NaiveDate>,
    /// Average cycle length in days (21-35).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_length: Option<u32>,
    /// Average period duration in days (2-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_length: Option<u32>,
    /// Number of future cycles to calculate (1-12).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
}

impl QueryOptions {
    pub fn new(last_period: NaiveDate) -> Self {
        Self {
            last_period: Some(last_period),
            ..Self::default()
        }
    }

    pub fn with_cycle_length(mut self, days: u32) -> Self {
        self.cycle_length = Some(days);
        self
    }

    pub fn with_period_length(mut self, days: u32) -> Self {
        self.period_length = Some(days);
        self
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = Some(cycles);
        self
    }

    /// Check every parameter against the documented ranges, reporting all
    /// violations at once.
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut errors = Vec::new();
        if self.last_period.is_none() {
            errors.push("Required parameter [last_period] is missing".to_string());
        }
        check_range(&mut errors, "cycle_length", self.cycle_length, CYCLE_LENGTH_RANGE);
        check_range(&mut errors, "period_length", self.period_length, PERIOD_LENGTH_RANGE);
        check_range(&mut errors, "cycles", self.cycles, CYCLES_RANGE);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(errors))
        }
    }
}

fn check_range(errors: &mut Vec<String>, name: &str, value: Option<u32>, (min, max): (u32, u32)) {
    match value {
        Some(v) if v < min => errors.push(format!("Parameter [{name}] must be at least {min}")),
        Some(v) if v > max => errors.push(format!("Parameter [{name}] must be at most {max}")),
        _ => {}
    }
}

/// Top-level envelope returned by the service.
///
/// Holds the received JSON object itself: keys the service omitted stay
/// omitted and values of any type are kept, so serializing an `ApiResponse`
/// reproduces the service's reply. The only shape requirement is a string
/// `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ApiResponse {
    raw: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for ApiResponse {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        match raw.get("status") {
            Some(Value::String(_)) => Ok(Self { raw }),
            Some(other) => Err(format!("envelope status must be a string, got {other}")),
            None => Err("envelope has no status field".to_string()),
        }
    }
}

impl From<ApiResponse> for Map<String, Value> {
    fn from(response: ApiResponse) -> Self {
        response.raw
    }
}

impl ApiResponse {
    /// `"ok"` or `"error"`.
    pub fn status(&self) -> &str {
        self.raw.get("status").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn is_ok(&self) -> bool {
        self.status().eq_ignore_ascii_case("ok")
    }

    /// The `error` field as sent, `None` when absent or null.
    pub fn error(&self) -> Option<&Value> {
        self.raw.get("error").filter(|v| !v.is_null())
    }

    /// The `error` field when it is a string.
    pub fn error_message(&self) -> Option<&str> {
        self.error().and_then(Value::as_str)
    }

    /// Calculation result, untouched. `None` when absent or null.
    pub fn data(&self) -> Option<&Value> {
        self.raw.get("data").filter(|v| !v.is_null())
    }

    pub fn code(&self) -> Option<i64> {
        self.raw.get("code").and_then(Value::as_i64)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.raw
    }

    /// Decode `data` into the typed calculation result. `Ok(None)` when the
    /// envelope carries no data.
    pub fn cycle_result(&self) -> Result<Option<CycleCalculationResult>, ClientError> {
        self.data()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| ClientError::Deserialization(e.to_string()))
            })
            .transpose()
    }
}

/// Typed view of the service's calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleCalculationResult {
    pub last_period_date: NaiveDate,
    pub cycle_length: u32,
    pub period_length: u32,
    pub cycles_calculated: u32,
    pub cycles: Vec<Cycle>,
    #[serde(default)]
    pub current_status: Option<CurrentStatus>,
    pub averages: Averages,
    pub disclaimer: String,
}

/// One predicted cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub cycle_number: u32,
    pub period: DateWindow,
    pub ovulation: Ovulation,
    pub fertile_window: DateWindow,
    pub pms_phase: PmsPhase,
    pub cycle_phases: CyclePhases,
    pub status: String,
    #[serde(default)]
    pub days_until: Option<i64>,
    #[serde(default)]
    pub days_ago: Option<i64>,
}

/// A date range with its length, used for the period and the fertile window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ovulation {
    pub date: NaiveDate,
    pub day_of_cycle: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmsPhase {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The four named phases of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePhases {
    pub menstrual: Phase,
    pub follicular: Phase,
    pub ovulation: OvulationPhase,
    pub luteal: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvulationPhase {
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStatus {
    pub phase: String,
    pub description: String,
    #[serde(default)]
    pub next_period: Option<NaiveDate>,
    #[serde(default)]
    pub days_until_next_period: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Averages {
    pub cycle_length: u32,
    pub period_duration: u32,
    pub days_between_periods: u32,
}

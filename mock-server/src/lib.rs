use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ENDPOINT_PATH: &str = "/v1/menstrualcyclecalculator";

/// Envelope served when no reply has been scripted.
pub const DEFAULT_RESPONSE: &str = include_str!("../../test-vectors/cycle_result.json");

/// One request as the server saw it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub id: Uuid,
    pub method: String,
    pub api_key: Option<String>,
    /// JSON body for POST, query parameters as an object for GET.
    pub params: Value,
}

/// What the endpoint answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    /// 200 with the given envelope.
    Envelope(Value),
    /// The given status with `{"status":"error","error":message,"data":null}`.
    Error { status: u16, message: String },
    /// The given status with a verbatim body.
    Raw { status: u16, body: Value },
}

impl Default for Reply {
    fn default() -> Self {
        Reply::Envelope(default_envelope())
    }
}

pub fn default_envelope() -> Value {
    serde_json::from_str(DEFAULT_RESPONSE).unwrap_or(Value::Null)
}

#[derive(Debug, Default)]
pub struct MockState {
    pub reply: Reply,
    pub requests: Vec<RecordedRequest>,
}

pub type Db = Arc<RwLock<MockState>>;

pub fn new_state() -> Db {
    Arc::new(RwLock::new(MockState::default()))
}

pub fn app() -> Router {
    app_with_state(new_state())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route(ENDPOINT_PATH, post(calculate_json).get(calculate_query))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, new_state()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

async fn calculate_json(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    respond(db, Method::POST, &headers, body).await
}

async fn calculate_query(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let params = params.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    respond(db, Method::GET, &headers, Value::Object(params)).await
}

async fn respond(db: Db, method: Method, headers: &HeaderMap, params: Value) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let recorded = RecordedRequest {
        id: Uuid::new_v4(),
        method: method.to_string(),
        api_key: api_key.clone(),
        params,
    };
    tracing::info!(id = %recorded.id, method = %recorded.method, "recorded request");

    let mut state = db.write().await;
    state.requests.push(recorded);

    if api_key.as_deref().is_none_or(str::is_empty) {
        return error_reply(StatusCode::UNAUTHORIZED, "API key is missing or invalid");
    }

    match &state.reply {
        Reply::Envelope(envelope) => (StatusCode::OK, Json(envelope.clone())),
        Reply::Error { status, message } => error_reply(
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        ),
        Reply::Raw { status, body } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body.clone()),
        ),
    }
}

fn error_reply(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"status": "error", "error": message, "data": null})),
    )
}

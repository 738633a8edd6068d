//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client over real
//! HTTP two ways: through `execute` with the reqwest transport, and through a
//! blocking ureq host doing the I/O between `build_request` and
//! `parse_response`.

use std::net::SocketAddr;

use menstrual_cycle_core::{
    ClientConfig, ClientError, HttpMethod, HttpRequest, HttpResponse, MenstrualCycleClient,
    QueryOptions, RequestEncoding,
};
use mock_server::{default_envelope, new_state, Db, Reply};
use serde_json::json;

fn sample_query() -> QueryOptions {
    QueryOptions::new("2024-01-01".parse().unwrap())
        .with_cycle_length(28)
        .with_period_length(5)
        .with_cycles(3)
}

fn local_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new("integration-key")
        .secure(false)
        .host(addr.to_string())
}

async fn spawn_server(db: Db) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with_state(listener, db));
    addr
}

/// Start the mock server on its own runtime thread, for blocking hosts.
fn spawn_server_blocking(db: Db) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, db).await
        })
        .unwrap();
    });
    addr
}

/// Execute an `HttpRequest` with ureq.
///
/// Disables ureq's status-code-as-error behaviour so 4xx/5xx responses come
/// back as data and the core client interprets them.
fn execute_blocking(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k, v);
            }
            builder.call()
        }
        HttpMethod::Post => {
            let mut builder = agent.post(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k, v);
            }
            builder.send(req.body.unwrap_or_default().as_bytes())
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

#[tokio::test]
async fn execute_round_trips_fixed_result() {
    let db = new_state();
    let addr = spawn_server(db.clone()).await;
    let client = MenstrualCycleClient::new(local_config(addr)).unwrap();

    let response = client.execute(Some(&sample_query())).await.unwrap();
    assert_eq!(serde_json::to_value(&response).unwrap(), default_envelope());

    let result = response.cycle_result().unwrap().unwrap();
    assert_eq!(result.cycles.len(), 3);

    let state = db.read().await;
    assert_eq!(state.requests.len(), 1);
    assert_eq!(state.requests[0].api_key.as_deref(), Some("integration-key"));
    assert_eq!(
        state.requests[0].params,
        json!({"last_period": "2024-01-01", "cycle_length": 28, "period_length": 5, "cycles": 3})
    );
}

#[tokio::test]
async fn execute_without_query_posts_empty_object() {
    let db = new_state();
    let addr = spawn_server(db.clone()).await;
    let client = MenstrualCycleClient::new(local_config(addr)).unwrap();

    client.execute(None).await.unwrap();
    assert_eq!(db.read().await.requests[0].params, json!({}));
}

#[tokio::test]
async fn execute_surfaces_scripted_api_error() {
    let db = new_state();
    db.write().await.reply = Reply::Raw {
        status: 429,
        body: json!({"error": "msg", "status": 429}),
    };
    let addr = spawn_server(db).await;
    let client = MenstrualCycleClient::new(local_config(addr)).unwrap();

    let err = client.execute(Some(&sample_query())).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 429, ref error } if error == "msg"));
}

#[tokio::test]
async fn execute_query_string_encoding_uses_get() {
    let db = new_state();
    let addr = spawn_server(db.clone()).await;
    let config = local_config(addr).encoding(RequestEncoding::QueryString);
    let client = MenstrualCycleClient::new(config).unwrap();

    client.execute(Some(&sample_query())).await.unwrap();

    let state = db.read().await;
    assert_eq!(state.requests[0].method, "GET");
    assert_eq!(state.requests[0].params["cycle_length"], "28");
}

#[tokio::test]
async fn execute_reports_connection_refused_as_transport_error() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = MenstrualCycleClient::new(local_config(addr)).unwrap();

    let err = client.execute(Some(&sample_query())).await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {err:?}");
}

#[test]
fn blocking_host_round_trip() {
    let db = new_state();
    let addr = spawn_server_blocking(db);
    let client = MenstrualCycleClient::without_transport(local_config(addr)).unwrap();

    // Step 1: success with the fixture.
    let req = client.build_request(Some(&sample_query())).unwrap();
    let response = client.parse_response(execute_blocking(req)).unwrap();
    assert_eq!(serde_json::to_value(&response).unwrap(), default_envelope());

    // Step 2: missing key is rejected by the server.
    let mut req = client.build_request(None).unwrap();
    req.headers.retain(|(k, _)| k != "x-api-key");
    let err = client.parse_response(execute_blocking(req)).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

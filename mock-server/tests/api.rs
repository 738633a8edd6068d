use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, default_envelope, new_state, Reply, ENDPOINT_PATH};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, api_key: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(body.to_string()).unwrap()
}

// --- success ---

#[tokio::test]
async fn post_returns_default_envelope() {
    let resp = app()
        .oneshot(json_request(
            ENDPOINT_PATH,
            Some("key"),
            r#"{"last_period":"2024-01-01","cycle_length":28,"period_length":5,"cycles":3}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, default_envelope());
}

#[tokio::test]
async fn post_records_body_and_key() {
    let db = new_state();
    let resp = app_with_state(db.clone())
        .oneshot(json_request(ENDPOINT_PATH, Some("abc"), r#"{"cycles":2}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let state = db.read().await;
    assert_eq!(state.requests.len(), 1);
    let recorded = &state.requests[0];
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.api_key.as_deref(), Some("abc"));
    assert_eq!(recorded.params, json!({"cycles": 2}));
}

#[tokio::test]
async fn get_records_query_params() {
    let db = new_state();
    let resp = app_with_state(db.clone())
        .oneshot(
            Request::builder()
                .uri(format!("{ENDPOINT_PATH}?last_period=2024-01-01&cycles=3"))
                .header("x-api-key", "abc")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let state = db.read().await;
    assert_eq!(state.requests[0].method, "GET");
    assert_eq!(
        state.requests[0].params,
        json!({"last_period": "2024-01-01", "cycles": "3"})
    );
}

// --- errors ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app()
        .oneshot(json_request(ENDPOINT_PATH, None, "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn scripted_error_is_served() {
    let db = new_state();
    db.write().await.reply = Reply::Error {
        status: 429,
        message: "Rate limit exceeded".to_string(),
    };
    let resp = app_with_state(db)
        .oneshot(json_request(ENDPOINT_PATH, Some("key"), "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Rate limit exceeded");
}

#[tokio::test]
async fn scripted_raw_body_is_served_verbatim() {
    let db = new_state();
    db.write().await.reply = Reply::Raw {
        status: 503,
        body: json!({"error": "maintenance", "status": 503}),
    };
    let resp = app_with_state(db)
        .oneshot(json_request(ENDPOINT_PATH, Some("key"), "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await, json!({"error": "maintenance", "status": 503}));
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let resp = app()
        .oneshot(json_request(ENDPOINT_PATH, Some("key"), "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let resp = app()
        .oneshot(json_request("/v1/other", Some("key"), "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unsupported_method_returns_405() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(ENDPOINT_PATH)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

//! Verify build/parse against the JSON test vectors in `test-vectors/`.
//!
//! Each case describes the query, the expected request, a simulated response
//! and the expected outcome. Bodies are compared as parsed JSON, not raw
//! strings, so field ordering never causes false negatives.

use menstrual_cycle_core::{
    ClientConfig, ClientError, HttpMethod, HttpResponse, MenstrualCycleClient, QueryOptions,
};

const BASE_URL: &str = "https://api.apiverve.com";

fn client() -> MenstrualCycleClient {
    MenstrualCycleClient::without_transport(ClientConfig::new("test-key")).unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

#[test]
fn execute_test_vectors() {
    let raw = include_str!("../../test-vectors/execute.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: Option<QueryOptions> = serde_json::from_value(case["input"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_request(input.as_ref()).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let req_body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(req_body, expected_req["body"], "{name}: body");

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error["kind"].as_str().unwrap() {
                "Api" => match err {
                    ClientError::Api { status, error } => {
                        assert_eq!(u64::from(status), expected_error["status"].as_u64().unwrap(), "{name}: status");
                        assert_eq!(error, expected_error["error"].as_str().unwrap(), "{name}: error");
                    }
                    other => panic!("{name}: expected Api error, got {other:?}"),
                },
                "Deserialization" => {
                    assert!(matches!(err, ClientError::Deserialization(_)), "{name}: expected Deserialization")
                }
                other => panic!("{name}: unknown expected_error kind: {other}"),
            }
        } else {
            let envelope = result.unwrap();
            assert_eq!(
                serde_json::to_value(&envelope).unwrap(),
                case["expected_result"],
                "{name}: parsed result"
            );
        }
    }
}

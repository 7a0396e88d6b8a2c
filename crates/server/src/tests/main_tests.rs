use super::*;
use axum::{body, body::Body, http::Request};
use crate::config::HandlerExecution;
use serde_json::{json, Value};
use shared::error::{ApiError, ErrorCode};
use tower::ServiceExt;

fn test_app(settings: Settings) -> Router {
    let mut registry = CallbackRegistry::new();
    demo::register_callbacks(&mut registry).expect("register");
    let state = AppState::new(DispatchCore::new(registry), &settings);
    build_router(Arc::new(state), &settings)
}

fn update_request(route: &str, payload: &Value) -> Request<Body> {
    Request::post(route)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn counter_payload(clicks: i64) -> Value {
    json!({
        "inputs": [{ "id": "btn", "property": "n_clicks", "value": clicks }],
        "state": [],
        "output": { "id": "out", "property": "children" }
    })
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app(Settings::default());
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn update_component_runs_counter_callback() {
    let app = test_app(Settings::default());
    let response = app
        .oneshot(update_request("/_dash-update-component", &counter_payload(4)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("content type"),
        "application/json"
    );
    let value: Value = json_body(response).await;
    assert_eq!(value, json!(5));
}

#[tokio::test]
async fn state_values_reach_the_callback() {
    let app = test_app(Settings::default());
    let payload = json!({
        "inputs": [{ "id": "submit", "property": "n_clicks", "value": 1 }],
        "state": [{ "id": "name", "property": "value", "value": "Ada" }],
        "output": { "id": "greeting", "property": "children" }
    });
    let response = app
        .oneshot(update_request("/_dash-update-component", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = json_body(response).await;
    assert_eq!(value, json!("Hello, Ada!"));
}

#[tokio::test]
async fn unknown_output_is_not_found() {
    let app = test_app(Settings::default());
    let payload = json!({
        "inputs": [],
        "state": [],
        "output": { "id": "nowhere", "property": "children" }
    });
    let response = app
        .oneshot(update_request("/_dash-update-component", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.message.contains("nowhere.children"));
}

#[tokio::test]
async fn client_mistakes_are_bad_requests() {
    let app = test_app(Settings::default());
    let cases = [
        json!({ "inputs": [], "state": [] }),
        json!({
            "inputs": [],
            "state": [],
            "output": { "id": "out", "property": "children" }
        }),
        json!({
            "inputs": [{ "id": "btn", "property": "n_clicks", "value": "four" }],
            "output": { "id": "out", "property": "children" }
        }),
    ];

    for payload in cases {
        let response = app
            .clone()
            .oneshot(update_request("/_dash-update-component", &payload))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload {payload}");
        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, ErrorCode::Validation);
    }

    let garbage = Request::post("/_dash-update-component")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(garbage).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failing_callback_is_an_internal_error() {
    let app = test_app(Settings::default());
    let payload = json!({
        "inputs": [{ "id": "table", "property": "data", "value": [{ "qty": "two" }] }],
        "state": [{ "id": "column", "property": "value", "value": "qty" }],
        "output": { "id": "total", "property": "children" }
    });
    let response = app
        .oneshot(update_request("/_dash-update-component", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Internal);
}

#[tokio::test]
async fn blocking_pool_matches_inline_results() {
    let settings = Settings {
        handler_execution: HandlerExecution::BlockingPool,
        max_concurrent_handlers: 1,
        ..Settings::default()
    };
    let app = test_app(settings);

    for clicks in [0, 9, 41] {
        let response = app
            .clone()
            .oneshot(update_request("/_dash-update-component", &counter_payload(clicks)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = json_body(response).await;
        assert_eq!(value, json!(clicks + 1));
    }

    let payload = json!({ "output": { "id": "out", "property": "style" } });
    let response = app
        .oneshot(update_request("/_dash-update-component", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dependencies_route_lists_registered_callbacks() {
    let app = test_app(Settings::default());
    let request = Request::get("/_dash-dependencies")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let deps: Vec<DependencySummary> = json_body(response).await;
    let outputs: Vec<String> = deps.iter().map(|d| d.output.to_string()).collect();
    assert_eq!(
        outputs,
        vec!["greeting.children", "out.children", "total.children"]
    );
}

#[tokio::test]
async fn routes_honor_configured_prefix() {
    let settings = Settings {
        routes_prefix: "/app/".into(),
        ..Settings::default()
    };
    let app = test_app(settings);

    let response = app
        .clone()
        .oneshot(update_request("/app/_dash-update-component", &counter_payload(1)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(update_request("/_dash-update-component", &counter_payload(1)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let settings = Settings {
        max_body_bytes: 64,
        ..Settings::default()
    };
    let app = test_app(settings);
    let padding = "x".repeat(256);
    let payload = json!({
        "inputs": [{ "id": "btn", "property": "n_clicks", "value": 1, "pad": padding }],
        "output": { "id": "out", "property": "children" }
    });
    let response = app
        .oneshot(update_request("/_dash-update-component", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn large_responses_are_gzipped_when_compression_is_on() {
    let app = test_app(Settings::default());
    let request = Request::get("/_dash-dependencies")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_ENCODING)
            .expect("content encoding"),
        "gzip"
    );
}

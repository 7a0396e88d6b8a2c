use super::*;

#[test]
fn display_shows_code_and_message() {
    let err = ApiError::not_found("no callback registered for out.children");
    assert_eq!(err.to_string(), "NotFound: no callback registered for out.children");
}

#[test]
fn serializes_code_in_snake_case() {
    let body = serde_json::to_value(ApiError::validation("bad")).expect("serialize");
    assert_eq!(body, serde_json::json!({ "code": "validation", "message": "bad" }));

    let boxed: Box<dyn std::error::Error> = Box::new(ApiError::internal("boom"));
    assert_eq!(boxed.to_string(), "Internal: boom");
}

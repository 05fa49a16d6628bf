mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

use common::TestApp;

fn assert_envelope(value: &serde_json::Value, code: &str) {
    assert_eq!(value["error"], true, "{}", value);
    assert_eq!(value["code"], code, "{}", value);
    assert!(value["message"].is_string(), "{}", value);
}

#[tokio::test]
async fn body_without_json_content_type_gets_the_error_envelope() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body = r#"{"title":"t","body":"b"}"#;
    let (status, value) = app.send_raw(Method::POST, "/posts", None, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&value, "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn malformed_json_gets_the_error_envelope() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (status, value) = app
        .send_raw(Method::POST, "/posts/list", Some("application/json"), "{not json")
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&value, "BAD_REQUEST");

    let (status, value) = app
        .send_raw(Method::POST, "/auth/login", Some("application/json"), "[")
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&value, "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn non_numeric_ids_get_the_error_envelope() -> Result<()> {
    let app = TestApp::spawn().await?;
    let post_id = app.post("parent").await?;

    let (status, value) = app.call(Method::GET, "/posts/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&value, "BAD_REQUEST");

    let uri = format!("/posts/{}/comments/xyz", post_id);
    let (status, value) = app.call(Method::DELETE, &uri, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&value, "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn bad_query_string_paging_is_an_invalid_query() -> Result<()> {
    let app = TestApp::spawn().await?;
    let post_id = app.post("parent").await?;

    let uri = format!("/posts/{}/comments?page=first", post_id);
    let (status, value) = app.call(Method::GET, &uri, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&value, "INVALID_QUERY");
    Ok(())
}

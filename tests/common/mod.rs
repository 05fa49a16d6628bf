#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use content_api::app::{app, AppState};
use content_api::auth::PasswordCost;
use content_api::config::AppConfig;
use content_api::database::InMemoryRepository;
use content_api::database::models::CATALOG;

pub const USERNAME: &str = "tester";
pub const PASSWORD: &str = "correct horse";

/// The full router over an in-memory store, with one user and a valid token.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::from_env();
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.filter.default_page_size = None;
        config.filter.max_in_values = 1000;
        config.filter.max_page_size = Some(1000);
        config.api.enable_request_logging = false;
        config.security.password_cost = PasswordCost::minimal();

        let repo = Arc::new(InMemoryRepository::new(CATALOG));
        let state = AppState::new(repo.clone(), &config)?;
        state.auth.create_user(USERNAME, PASSWORD).await?;
        let token = state.auth.login(USERNAME, PASSWORD).await?.access_token;

        Ok(Self { router: app(state, &config), repo, token })
    }

    /// Sends a request with the seeded user's token.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let token = self.token.clone();
        self.send(method, uri, body, Some(&token)).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", uri))?
        };
        Ok((status, value))
    }

    /// Sends a raw body with an optional content type, using the seeded token.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body from {}", uri))?;
        Ok((status, value))
    }

    /// Creates a post and returns its id.
    pub async fn post(&self, title: &str) -> Result<i64> {
        let body = serde_json::json!({ "title": title, "body": format!("{} body", title) });
        let (status, value) = self.call(Method::POST, "/posts", Some(body)).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create post failed: {} {}", status, value);
        value["data"]["id"].as_i64().context("post id")
    }

    /// Creates a comment under `post_id` and returns its id.
    pub async fn comment(&self, post_id: i64, name: &str) -> Result<i64> {
        let body =
            serde_json::json!({ "name": name, "email": "ann@example.com", "body": "original" });
        let uri = format!("/posts/{}/comments", post_id);
        let (status, value) = self.call(Method::POST, &uri, Some(body)).await?;
        anyhow::ensure!(
            status == StatusCode::CREATED,
            "create comment failed: {} {}",
            status,
            value
        );
        value["data"]["id"].as_i64().context("comment id")
    }
}

pub fn ids(value: &Value) -> Vec<i64> {
    value["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default()
}

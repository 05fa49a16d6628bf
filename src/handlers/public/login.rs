use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginResponse;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login - exchange credentials for an access token
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(body) = body?;
    let request: LoginRequest =
        serde_json::from_value(body).map_err(|e| ApiError::validation_error(e.to_string(), None))?;
    let token = state.auth.login(&request.username, &request.password).await?;
    Ok(ApiResponse::success(token))
}

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Extension, Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::models::Payload;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ResourceService, Scope};
use crate::types::Record;

use super::{list_query, payload};

/// Routes for a top-level resource mounted at `base`, e.g. `/posts`.
///
/// `param` names the id segment (`post_id` gives `/posts/:post_id`).
pub fn routes<C, U>(base: &str, param: &str, service: Arc<ResourceService>) -> Router
where
    C: DeserializeOwned + Payload + Send + 'static,
    U: DeserializeOwned + Payload + Send + 'static,
{
    Router::new()
        .route(base, post(create::<C>))
        .route(&format!("{}/list", base), post(list))
        .route(
            &format!("{}/:{}", base, param),
            get(detail).patch(update::<U>).delete(remove),
        )
        .with_state(service)
}

/// POST /{base}
async fn create<C: DeserializeOwned + Payload>(
    State(service): State<Arc<ResourceService>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let Json(body) = body?;
    let fields = payload::<C>(body)?;
    let created = service.create(Scope::Root, fields, Some(user.id)).await?;
    Ok(ApiResponse::created(created))
}

/// POST /{base}/list
async fn list(
    State(service): State<Arc<ResourceService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<Record>> {
    let Json(body) = body?;
    let query = list_query(body)?;
    Ok(ApiResponse::success(service.list(Scope::Root, &query).await?))
}

/// GET /{base}/:id
async fn detail(
    State(service): State<Arc<ResourceService>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Record> {
    let Path(id) = id?;
    Ok(ApiResponse::success(service.detail(Scope::Root, id).await?))
}

/// PATCH /{base}/:id
async fn update<U: DeserializeOwned + Payload>(
    State(service): State<Arc<ResourceService>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let Path(id) = id?;
    let Json(body) = body?;
    let patch = payload::<U>(body)?;
    Ok(ApiResponse::success(service.update(Scope::Root, id, patch).await?))
}

/// DELETE /{base}/:id
async fn remove(
    State(service): State<Arc<ResourceService>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    service.remove(Scope::Root, id).await?;
    Ok(ApiResponse::no_content())
}

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Extension, Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::models::Payload;
use crate::filter::{ListQuery, Pagination};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ResourceService, Scope};
use crate::types::Record;

use super::{list_query, payload};

type ParentPath = Result<Path<i64>, PathRejection>;
type ChildPath = Result<Path<(i64, i64)>, PathRejection>;

/// Routes for a child resource reached through its parent, e.g.
/// `/posts/:post_id/comments`. Every handler is scoped to the parent id.
pub fn routes<C, U>(base: &str, param: &str, service: Arc<ResourceService>) -> Router
where
    C: DeserializeOwned + Payload + Send + 'static,
    U: DeserializeOwned + Payload + Send + 'static,
{
    Router::new()
        .route(base, get(list_paged).post(create::<C>))
        .route(&format!("{}/list", base), post(list))
        .route(
            &format!("{}/:{}", base, param),
            get(detail).patch(update::<U>).delete(remove),
        )
        .with_state(service)
}

/// POST /{parent}/:parent_id/{child}
async fn create<C: DeserializeOwned + Payload>(
    State(service): State<Arc<ResourceService>>,
    Extension(user): Extension<AuthUser>,
    parent_id: ParentPath,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let Path(parent_id) = parent_id?;
    let Json(body) = body?;
    let fields = payload::<C>(body)?;
    let created = service
        .create(Scope::Parent(parent_id), fields, Some(user.id))
        .await?;
    Ok(ApiResponse::created(created))
}

/// GET /{parent}/:parent_id/{child}?page=&pageSize=
async fn list_paged(
    State(service): State<Arc<ResourceService>>,
    parent_id: ParentPath,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Vec<Record>> {
    let Path(parent_id) = parent_id?;
    let Query(pagination) = pagination?;
    let query = ListQuery { pagination: Some(pagination), ..Default::default() };
    Ok(ApiResponse::success(service.list(Scope::Parent(parent_id), &query).await?))
}

/// POST /{parent}/:parent_id/{child}/list
async fn list(
    State(service): State<Arc<ResourceService>>,
    parent_id: ParentPath,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<Record>> {
    let Path(parent_id) = parent_id?;
    let Json(body) = body?;
    let query = list_query(body)?;
    Ok(ApiResponse::success(service.list(Scope::Parent(parent_id), &query).await?))
}

async fn detail(State(service): State<Arc<ResourceService>>, ids: ChildPath) -> ApiResult<Record> {
    let Path((parent_id, id)) = ids?;
    Ok(ApiResponse::success(service.detail(Scope::Parent(parent_id), id).await?))
}

async fn update<U: DeserializeOwned + Payload>(
    State(service): State<Arc<ResourceService>>,
    ids: ChildPath,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let Path((parent_id, id)) = ids?;
    let Json(body) = body?;
    let patch = payload::<U>(body)?;
    Ok(ApiResponse::success(service.update(Scope::Parent(parent_id), id, patch).await?))
}

async fn remove(State(service): State<Arc<ResourceService>>, ids: ChildPath) -> ApiResult<()> {
    let Path((parent_id, id)) = ids?;
    service.remove(Scope::Parent(parent_id), id).await?;
    Ok(ApiResponse::no_content())
}

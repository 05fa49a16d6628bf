use std::sync::Arc;

use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::models::{EntityDescriptor, FieldErrors, FieldValues, RelationDef};
use crate::database::repository::StorageRepository;
use crate::filter::{Filter, ListQuery, PagingPolicy};
use crate::types::{Record, Scalar};

use super::error::{ServiceError, ServiceResult};
use super::ownership::OwnershipGuard;
use super::projection::ProjectionExecutor;

/// How a request addresses an entity: directly, or through its parent's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Root,
    Parent(i64),
}

/// CRUD over one entity, driven entirely by its descriptor.
pub struct ResourceService {
    entity: &'static EntityDescriptor,
    repo: Arc<dyn StorageRepository>,
    executor: ProjectionExecutor,
    guard: OwnershipGuard,
    paging: PagingPolicy,
}

impl ResourceService {
    pub fn new(
        entity: &'static EntityDescriptor,
        repo: Arc<dyn StorageRepository>,
        paging: PagingPolicy,
    ) -> Self {
        let executor = ProjectionExecutor::new(repo.clone());
        let guard = OwnershipGuard::new(executor.clone());
        Self { entity, repo, executor, guard, paging }
    }

    pub async fn create(
        &self,
        scope: Scope,
        fields: FieldValues,
        owner: Option<i64>,
    ) -> ServiceResult<Record> {
        self.reject_reserved(&fields)?;
        let mut fields = fields;

        if let Some((parent, parent_id)) = self.parent_scope(scope)? {
            self.resolve_parent(parent, parent_id).await?;
            fields.set(parent.foreign_key, Scalar::Int(parent_id));
        }
        if let (Some(rel), Some(user_id)) = (self.entity.owner(), owner) {
            fields.set(rel.foreign_key, Scalar::Int(user_id));
        }

        let row = self.repo.insert(self.entity, &fields).await.map_err(|err| match err {
            // The parent vanished between the lookup and the insert.
            DatabaseError::ForeignKeyViolation(_) => {
                let label = self
                    .entity
                    .relation
                    .as_ref()
                    .map_or(self.entity.label, |r| r.target.label);
                ServiceError::not_found(label)
            }
            other => storage_error(other),
        })?;

        let id = row
            .get(self.entity.primary_key().name)
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| {
                DatabaseError::QueryError(format!("{} insert returned no id", self.entity.table))
            })?;
        info!(entity = self.entity.name, id, "created");

        self.guard.verify_exists(self.entity, id, &self.entity.default_projection()).await
    }

    pub async fn list(&self, scope: Scope, query: &ListQuery) -> ServiceResult<Vec<Record>> {
        let mut filter = Filter::new(self.entity, self.paging);
        filter.assign(query)?;

        if let Some((parent, parent_id)) = self.parent_scope(scope)? {
            self.resolve_parent(parent, parent_id).await?;
            filter.scope(parent.foreign_key, parent_id);
        }

        let plan = filter.build();
        debug!(
            entity = self.entity.name,
            predicates = plan.predicates.len(),
            offset = plan.offset,
            limit = ?plan.limit,
            "list"
        );
        self.executor.execute(self.entity, &plan, &self.entity.default_projection()).await
    }

    pub async fn detail(&self, scope: Scope, id: i64) -> ServiceResult<Record> {
        self.guarded(scope, id).await
    }

    pub async fn update(&self, scope: Scope, id: i64, patch: FieldValues) -> ServiceResult<Record> {
        let current = self.guarded(scope, id).await?;
        self.reject_reserved(&patch)?;
        if patch.is_empty() {
            return Ok(current);
        }

        self.repo.update_by_id(self.entity, id, &patch).await.map_err(storage_error)?;
        info!(entity = self.entity.name, id, fields = patch.len(), "updated");
        self.guarded(scope, id).await
    }

    pub async fn remove(&self, scope: Scope, id: i64) -> ServiceResult<()> {
        let projection = self.entity.key_projection();
        match self.parent_scope(scope)? {
            Some((_, parent_id)) => {
                self.guard.verify_child_of_parent(self.entity, id, parent_id, &projection).await?
            }
            None => self.guard.verify_exists(self.entity, id, &projection).await?,
        };
        self.repo.delete_by_id(self.entity, id).await?;
        info!(entity = self.entity.name, id, "deleted");
        Ok(())
    }

    async fn guarded(&self, scope: Scope, id: i64) -> ServiceResult<Record> {
        let projection = self.entity.default_projection();
        match self.parent_scope(scope)? {
            Some((_, parent_id)) => {
                self.guard.verify_child_of_parent(self.entity, id, parent_id, &projection).await
            }
            None => self.guard.verify_exists(self.entity, id, &projection).await,
        }
    }

    async fn resolve_parent(
        &self,
        parent: &'static RelationDef,
        parent_id: i64,
    ) -> ServiceResult<()> {
        self.guard
            .verify_exists(parent.target, parent_id, &parent.target.key_projection())
            .await
            .map(|_| ())
    }

    /// Checks that `scope` matches how the entity is addressed.
    fn parent_scope(&self, scope: Scope) -> ServiceResult<Option<(&'static RelationDef, i64)>> {
        match (self.entity.parent(), scope) {
            (Some(parent), Scope::Parent(id)) => Ok(Some((parent, id))),
            (None, Scope::Root) => Ok(None),
            (Some(parent), Scope::Root) => Err(ServiceError::InvalidQuery(format!(
                "{} must be addressed through its {}",
                self.entity.name, parent.name
            ))),
            (None, Scope::Parent(_)) => Err(ServiceError::InvalidQuery(format!(
                "{} has no parent resource",
                self.entity.name
            ))),
        }
    }

    fn reject_reserved(&self, fields: &FieldValues) -> ServiceResult<()> {
        let errors: FieldErrors = fields
            .iter()
            .filter(|(f, _)| self.entity.is_reserved(f))
            .map(|(f, _)| (f.name.to_string(), "cannot be set directly".to_string()))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::validation("Reserved fields in payload", errors))
        }
    }
}

fn storage_error(err: DatabaseError) -> ServiceError {
    match err {
        DatabaseError::UniqueViolation(_) => {
            ServiceError::validation("Value already exists", FieldErrors::new())
        }
        other => ServiceError::StorageFailure(other),
    }
}

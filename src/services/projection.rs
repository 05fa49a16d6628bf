use std::sync::Arc;

use crate::database::models::{EntityDescriptor, Projection};
use crate::database::repository::StorageRepository;
use crate::filter::{FilterError, Predicate, QueryPlan};
use crate::types::Record;

use super::error::ServiceResult;

/// Runs query plans through the repository with a checked projection.
#[derive(Clone)]
pub struct ProjectionExecutor {
    repo: Arc<dyn StorageRepository>,
}

impl ProjectionExecutor {
    pub fn new(repo: Arc<dyn StorageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        entity: &'static EntityDescriptor,
        plan: &QueryPlan,
        projection: &Projection,
    ) -> ServiceResult<Vec<Record>> {
        check(entity, projection)?;
        Ok(self.repo.find(entity, plan, projection).await?)
    }

    /// First matching row, or `None`.
    pub async fn execute_one(
        &self,
        entity: &'static EntityDescriptor,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> ServiceResult<Option<Record>> {
        check(entity, projection)?;
        Ok(self.repo.find_one(entity, predicates, projection).await?)
    }
}

/// Every projected field must belong to the entity or to its relation target.
fn check(entity: &'static EntityDescriptor, projection: &Projection) -> Result<(), FilterError> {
    let invalid = |field: &str| FilterError::InvalidProjection {
        entity: entity.name,
        field: field.to_string(),
    };

    if projection.entity.table != entity.table {
        return Err(invalid(projection.entity.name));
    }
    if let Some(field) = projection.own.iter().find(|f| entity.field(f.name).is_none()) {
        return Err(invalid(field.name));
    }
    if let Some(rel) = &projection.relation {
        let declared = entity
            .relation
            .as_ref()
            .filter(|r| r.name == rel.name && r.target.table == rel.target.table);
        let Some(declared) = declared else {
            return Err(invalid(rel.name));
        };
        if let Some(field) = rel.fields.iter().find(|f| declared.target.field(f.name).is_none()) {
            return Err(invalid(field.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryRepository;
    use crate::database::models::{FieldValues, CATALOG, COMMENTS, POSTS};
    use crate::services::error::ServiceError;

    async fn seeded() -> ProjectionExecutor {
        let repo = InMemoryRepository::new(CATALOG);
        for title in ["one", "two"] {
            let post = FieldValues::new()
                .with(POSTS.field("title").unwrap(), title)
                .with(POSTS.field("body").unwrap(), "b");
            repo.insert(&POSTS, &post).await.unwrap();
        }
        ProjectionExecutor::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn execute_one_without_match_is_none() {
        let exec = seeded().await;
        let by_id = [Predicate::eq(POSTS.primary_key(), 42)];
        let found = exec
            .execute_one(&POSTS, &by_id, &POSTS.default_projection())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn projection_of_another_entity_is_rejected() {
        let exec = seeded().await;
        let err = exec
            .execute(&POSTS, &QueryPlan::default(), &COMMENTS.default_projection())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn only_requested_fields_come_back() {
        let exec = seeded().await;
        let projection = POSTS.default_projection().only(&["id", "title"]);
        let rows = exec.execute(&POSTS, &QueryPlan::default(), &projection).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.contains_key("body") && r.contains_key("user")));
    }
}

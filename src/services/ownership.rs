use crate::database::models::{record_i64, EntityDescriptor, Projection};
use crate::filter::Predicate;
use crate::types::Record;

use super::error::{ServiceError, ServiceResult};
use super::projection::ProjectionExecutor;

/// Confirms that a row exists and, for nested resources, that it hangs off
/// the parent named in the request path.
///
/// A missing child and a child owned by another parent produce the same
/// `NotFound`, so callers cannot probe ids across parents.
#[derive(Clone)]
pub struct OwnershipGuard {
    executor: ProjectionExecutor,
}

impl OwnershipGuard {
    pub fn new(executor: ProjectionExecutor) -> Self {
        Self { executor }
    }

    pub async fn verify_exists(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
        projection: &Projection,
    ) -> ServiceResult<Record> {
        self.executor
            .execute_one(entity, &[Predicate::eq(entity.primary_key(), id)], projection)
            .await?
            .ok_or_else(|| ServiceError::not_found(entity.label))
    }

    pub async fn verify_child_of_parent(
        &self,
        entity: &'static EntityDescriptor,
        child_id: i64,
        parent_id: i64,
        projection: &Projection,
    ) -> ServiceResult<Record> {
        let Some(parent) = entity.parent() else {
            return self.verify_exists(entity, child_id, projection).await;
        };
        let fk = parent.foreign_key;

        // The foreign key has to be read to compare it; drop it again unless asked for.
        let requested = projection.includes(fk.name);
        let lookup = projection.clone().with_field(fk);

        let mut record = self
            .executor
            .execute_one(entity, &[Predicate::eq(entity.primary_key(), child_id)], &lookup)
            .await?
            .ok_or_else(|| ServiceError::not_found(entity.label))?;

        if record_i64(&record, fk.name) != Some(parent_id) {
            tracing::debug!(
                entity = entity.name,
                child_id,
                parent_id,
                "child does not belong to requested parent"
            );
            return Err(ServiceError::not_found(entity.label));
        }

        if !requested {
            record.remove(fk.name);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::database::memory::InMemoryRepository;
    use crate::database::models::{FieldValues, CATALOG, COMMENTS, POSTS};
    use crate::database::repository::StorageRepository;

    async fn guard() -> OwnershipGuard {
        let repo = InMemoryRepository::new(CATALOG);
        for title in ["first", "second"] {
            let post = FieldValues::new()
                .with(POSTS.field("title").unwrap(), title)
                .with(POSTS.field("body").unwrap(), "b");
            repo.insert(&POSTS, &post).await.unwrap();
        }
        let comment = FieldValues::new()
            .with(COMMENTS.field("name").unwrap(), "ann")
            .with(COMMENTS.field("email").unwrap(), "ann@example.com")
            .with(COMMENTS.field("body").unwrap(), "hello")
            .with(COMMENTS.field("postId").unwrap(), 1);
        repo.insert(&COMMENTS, &comment).await.unwrap();
        OwnershipGuard::new(ProjectionExecutor::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn child_under_its_own_parent_is_returned_without_fk() {
        let guard = guard().await;
        let record = guard
            .verify_child_of_parent(&COMMENTS, 1, 1, &COMMENTS.default_projection())
            .await
            .unwrap();
        assert_eq!(record["id"], 1);
        assert!(!record.contains_key("postId"));
        assert_eq!(record["post"]["title"], "first");
    }

    #[tokio::test]
    async fn misowned_and_missing_children_look_the_same() {
        let guard = guard().await;
        let misowned = guard
            .verify_child_of_parent(&COMMENTS, 1, 2, &COMMENTS.default_projection())
            .await
            .unwrap_err();
        let missing = guard
            .verify_child_of_parent(&COMMENTS, 77, 1, &COMMENTS.default_projection())
            .await
            .unwrap_err();
        assert_eq!(misowned.to_string(), missing.to_string());
        assert!(matches!(misowned, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn verify_exists_reports_label() {
        let guard = guard().await;
        let err = guard.verify_exists(&POSTS, 9, &POSTS.key_projection()).await.unwrap_err();
        assert_eq!(err.to_string(), "Post not found");
    }
}

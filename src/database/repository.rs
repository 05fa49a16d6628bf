use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{EntityDescriptor, FieldValues, Projection};
use crate::filter::{Predicate, QueryPlan};
use crate::types::Record;

/// Generic storage contract shared by every entity.
///
/// Implementations must enforce foreign-key integrity on inserts and updates
/// of child rows and report violations as `DatabaseError::ForeignKeyViolation`.
/// Reads return records shaped exactly by the projection they are given.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    async fn find(
        &self,
        entity: &'static EntityDescriptor,
        plan: &QueryPlan,
        projection: &Projection,
    ) -> Result<Vec<Record>, DatabaseError>;

    async fn find_one(
        &self,
        entity: &'static EntityDescriptor,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> Result<Option<Record>, DatabaseError>;

    /// Inserts a row and returns every stored field of it, keyed by wire name.
    async fn insert(
        &self,
        entity: &'static EntityDescriptor,
        fields: &FieldValues,
    ) -> Result<Record, DatabaseError>;

    async fn update_by_id(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
        patch: &FieldValues,
    ) -> Result<(), DatabaseError>;

    async fn delete_by_id(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
    ) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

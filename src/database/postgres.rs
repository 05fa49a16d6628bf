use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::{PgArguments, PgRow}, PgPool, Postgres, Row};
use tracing::{debug, info};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{EntityDescriptor, FieldValues, Projection};
use crate::database::query_builder::{QueryBuilder, SqlResult};
use crate::database::repository::StorageRepository;
use crate::database::schema;
use crate::filter::{Predicate, QueryPlan};
use crate::types::{Record, Scalar};

/// `StorageRepository` over a PostgreSQL pool.
pub struct PgRepository {
    pool: PgPool,
    log_queries: bool,
}

impl PgRepository {
    pub fn new(pool: PgPool, log_queries: bool) -> Self {
        Self { pool, log_queries }
    }

    /// Applies the table definitions in order.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Applied {} schema statements", schema::STATEMENTS.len());
        Ok(())
    }

    async fn fetch_all(&self, sql: &SqlResult) -> Result<Vec<Record>, DatabaseError> {
        self.log(sql);
        let rows = bind_all(sqlx::query(&sql.query), &sql.params)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        rows.iter().map(row_record).collect()
    }

    async fn fetch_optional(&self, sql: &SqlResult) -> Result<Option<Record>, DatabaseError> {
        self.log(sql);
        let row = bind_all(sqlx::query(&sql.query), &sql.params)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        row.as_ref().map(row_record).transpose()
    }

    async fn execute(&self, sql: &SqlResult) -> Result<u64, DatabaseError> {
        self.log(sql);
        let result = bind_all(sqlx::query(&sql.query), &sql.params)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        Ok(result.rows_affected())
    }

    fn log(&self, sql: &SqlResult) {
        if self.log_queries {
            debug!(params = sql.params.len(), "sql: {}", sql.query);
        }
    }
}

#[async_trait]
impl StorageRepository for PgRepository {
    async fn find(
        &self,
        entity: &'static EntityDescriptor,
        plan: &QueryPlan,
        projection: &Projection,
    ) -> Result<Vec<Record>, DatabaseError> {
        let sql = QueryBuilder::new(entity).find(plan, projection);
        self.fetch_all(&sql).await
    }

    async fn find_one(
        &self,
        entity: &'static EntityDescriptor,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> Result<Option<Record>, DatabaseError> {
        let sql = QueryBuilder::new(entity).find_one(predicates, projection);
        self.fetch_optional(&sql).await
    }

    async fn insert(
        &self,
        entity: &'static EntityDescriptor,
        fields: &FieldValues,
    ) -> Result<Record, DatabaseError> {
        let sql = QueryBuilder::new(entity).insert(fields);
        self.fetch_optional(&sql)
            .await?
            .ok_or_else(|| {
                DatabaseError::QueryError(format!("insert into {} returned no row", entity.table))
            })
    }

    async fn update_by_id(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
        patch: &FieldValues,
    ) -> Result<(), DatabaseError> {
        if patch.is_empty() {
            return Ok(());
        }
        let sql = QueryBuilder::new(entity).update_by_id(id, patch);
        self.execute(&sql).await.map(|_| ())
    }

    async fn delete_by_id(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let sql = QueryBuilder::new(entity).delete_by_id(id);
        self.execute(&sql).await.map(|_| ())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

fn row_record(row: &PgRow) -> Result<Record, DatabaseError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("unexpected row format: {}", other))),
    }
}

fn bind_all<'q>(
    mut q: sqlx::query::Query<'q, Postgres, PgArguments>,
    params: &'q [Scalar],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    for p in params {
        q = match p {
            Scalar::Int(i) => q.bind(*i),
            Scalar::Text(s) => q.bind(s.as_str()),
        };
    }
    q
}

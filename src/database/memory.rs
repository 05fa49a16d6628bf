use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{EntityDescriptor, FieldValues, Projection, RelationKind};
use crate::database::repository::StorageRepository;
use crate::filter::{Predicate, QueryPlan, SortDirection, SortKey};
use crate::types::Record;

/// `StorageRepository` kept entirely in process memory.
///
/// Mirrors the SQL schema's constraints: foreign keys must resolve, unique
/// fields stay unique, deleting a parent cascades to its children and
/// deleting an owner clears the owner reference.
pub struct InMemoryRepository {
    catalog: &'static [&'static EntityDescriptor],
    state: RwLock<HashMap<&'static str, Table>>,
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Record>,
    last_id: i64,
}

impl InMemoryRepository {
    pub fn new(catalog: &'static [&'static EntityDescriptor]) -> Self {
        Self { catalog, state: RwLock::new(HashMap::new()) }
    }

    /// Number of stored rows for `entity`.
    pub async fn count(&self, entity: &'static EntityDescriptor) -> usize {
        self.state.read().await.get(entity.table).map_or(0, |t| t.rows.len())
    }

    fn check_references(
        tables: &HashMap<&'static str, Table>,
        entity: &'static EntityDescriptor,
        fields: &FieldValues,
    ) -> Result<(), DatabaseError> {
        let Some(rel) = &entity.relation else {
            return Ok(());
        };
        match fields.get(rel.foreign_key.name) {
            Some(value) => {
                let id = value.as_i64().ok_or_else(|| {
                    let column = rel.foreign_key.column;
                    DatabaseError::QueryError(format!("{} must be an integer", column))
                })?;
                let exists = tables
                    .get(rel.target.table)
                    .map_or(false, |t| t.rows.contains_key(&id));
                if exists {
                    Ok(())
                } else {
                    Err(DatabaseError::ForeignKeyViolation(format!(
                        "{}.{} = {} has no matching {} row",
                        entity.table, rel.foreign_key.column, id, rel.target.table
                    )))
                }
            }
            None => Ok(()),
        }
    }

    fn check_unique(
        table: Option<&Table>,
        entity: &'static EntityDescriptor,
        fields: &FieldValues,
        skip_id: Option<i64>,
    ) -> Result<(), DatabaseError> {
        let Some(table) = table else { return Ok(()) };
        for (field, value) in fields.iter().filter(|(f, _)| f.unique) {
            let taken = table
                .rows
                .iter()
                .filter(|(id, _)| Some(**id) != skip_id)
                .any(|(_, row)| row.get(field.name).map_or(false, |v| value.matches(v)));
            if taken {
                return Err(DatabaseError::UniqueViolation(format!(
                    "{}.{} already exists",
                    entity.table, field.column
                )));
            }
        }
        Ok(())
    }

    fn cascade_delete(
        &self,
        tables: &mut HashMap<&'static str, Table>,
        entity: &'static EntityDescriptor,
        id: i64,
    ) {
        let mut pending = vec![(entity, id)];
        while let Some((target, target_id)) = pending.pop() {
            if let Some(table) = tables.get_mut(target.table) {
                table.rows.remove(&target_id);
            }
            for child in self.catalog.iter().copied() {
                let Some(rel) = &child.relation else { continue };
                if rel.target.table != target.table {
                    continue;
                }
                let Some(child_table) = tables.get_mut(child.table) else {
                    continue;
                };
                let fk = rel.foreign_key.name;
                match rel.kind {
                    RelationKind::Parent => {
                        let doomed: Vec<i64> = child_table
                            .rows
                            .iter()
                            .filter(|(_, row)| {
                                row.get(fk).and_then(Value::as_i64) == Some(target_id)
                            })
                            .map(|(child_id, _)| *child_id)
                            .collect();
                        pending.extend(doomed.into_iter().map(|child_id| (child, child_id)));
                    }
                    RelationKind::Owner => {
                        for row in child_table.rows.values_mut() {
                            if row.get(fk).and_then(Value::as_i64) == Some(target_id) {
                                row.insert(fk.to_string(), Value::Null);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl StorageRepository for InMemoryRepository {
    async fn find(
        &self,
        entity: &'static EntityDescriptor,
        plan: &QueryPlan,
        projection: &Projection,
    ) -> Result<Vec<Record>, DatabaseError> {
        let tables = self.state.read().await;
        let Some(table) = tables.get(entity.table) else {
            return Ok(vec![]);
        };

        let mut rows: Vec<&Record> = table
            .rows
            .values()
            .filter(|row| plan.predicates.iter().all(|p| satisfies(p, row)))
            .collect();
        // Stable sort over id-ordered rows, so ties keep ascending id order.
        rows.sort_by(|a, b| compare_rows(a, b, &plan.order));

        let limit = plan.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let offset = usize::try_from(plan.offset).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(&tables, row, projection))
            .collect())
    }

    async fn find_one(
        &self,
        entity: &'static EntityDescriptor,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> Result<Option<Record>, DatabaseError> {
        let tables = self.state.read().await;
        let Some(table) = tables.get(entity.table) else {
            return Ok(None);
        };
        Ok(table
            .rows
            .values()
            .find(|row| predicates.iter().all(|p| satisfies(p, row)))
            .map(|row| project(&tables, row, projection)))
    }

    async fn insert(
        &self,
        entity: &'static EntityDescriptor,
        fields: &FieldValues,
    ) -> Result<Record, DatabaseError> {
        let mut tables = self.state.write().await;
        Self::check_references(&tables, entity, fields)?;
        if let Some(rel) = entity.parent() {
            if !fields.contains(rel.foreign_key.name) {
                return Err(DatabaseError::QueryError(format!(
                    "null value in column {} violates not-null constraint",
                    rel.foreign_key.column
                )));
            }
        }
        Self::check_unique(tables.get(entity.table), entity, fields, None)?;

        let table = tables.entry(entity.table).or_default();
        table.last_id += 1;
        let id = table.last_id;

        let mut row: Record = entity
            .fields
            .iter()
            .map(|f| (f.name.to_string(), Value::Null))
            .collect();
        for (field, value) in fields.iter() {
            row.insert(field.name.to_string(), value.to_json());
        }
        row.insert(entity.primary_key().name.to_string(), Value::from(id));
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_by_id(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
        patch: &FieldValues,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.state.write().await;
        Self::check_references(&tables, entity, patch)?;
        Self::check_unique(tables.get(entity.table), entity, patch, Some(id))?;
        if let Some(row) = tables.get_mut(entity.table).and_then(|t| t.rows.get_mut(&id)) {
            for (field, value) in patch.iter() {
                row.insert(field.name.to_string(), value.to_json());
            }
        }
        Ok(())
    }

    async fn delete_by_id(
        &self,
        entity: &'static EntityDescriptor,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.state.write().await;
        let exists = tables
            .get(entity.table)
            .map_or(false, |t| t.rows.contains_key(&id));
        if exists {
            self.cascade_delete(&mut tables, entity, id);
        }
        Ok(())
    }
}

fn satisfies(predicate: &Predicate, row: &Record) -> bool {
    match predicate {
        Predicate::Eq { field, value } => row.get(field.name).map_or(false, |v| value.matches(v)),
        Predicate::In { field, values } => {
            row.get(field.name).map_or(false, |v| values.iter().any(|value| value.matches(v)))
        }
    }
}

fn compare_rows(a: &Record, b: &Record, order: &[SortKey]) -> Ordering {
    for key in order {
        let ordering = compare_values(a.get(key.field.name), b.get(key.field.name));
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// PostgreSQL default ordering: nulls sort after every value when ascending.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_i64().cmp(&y.as_i64()),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn project(tables: &HashMap<&'static str, Table>, row: &Record, projection: &Projection) -> Record {
    let mut out: Record = projection
        .own
        .iter()
        .map(|f| (f.name.to_string(), row.get(f.name).cloned().unwrap_or(Value::Null)))
        .collect();

    if let Some(rel) = &projection.relation {
        let related = row
            .get(rel.foreign_key.name)
            .and_then(Value::as_i64)
            .and_then(|id| tables.get(rel.target.table).and_then(|t| t.rows.get(&id)));
        let nested = match related {
            Some(target) => Value::Object(
                rel.fields
                    .iter()
                    .map(|f| {
                        let value = target.get(f.name).cloned().unwrap_or(Value::Null);
                        (f.name.to_string(), value)
                    })
                    .collect::<Map<String, Value>>(),
            ),
            None => Value::Null,
        };
        out.insert(rel.name.to_string(), nested);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CATALOG, COMMENTS, POSTS, USERS};
    use crate::filter::Predicate;

    fn post(title: &str) -> FieldValues {
        FieldValues::new()
            .with(POSTS.field("title").unwrap(), title)
            .with(POSTS.field("body").unwrap(), "body")
    }

    fn comment(post_id: i64, name: &str) -> FieldValues {
        FieldValues::new()
            .with(COMMENTS.field("name").unwrap(), name)
            .with(COMMENTS.field("email").unwrap(), "a@example.com")
            .with(COMMENTS.field("body").unwrap(), "hi")
            .with(COMMENTS.field("postId").unwrap(), post_id)
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_returns_full_row() {
        let repo = InMemoryRepository::new(CATALOG);
        let first = repo.insert(&POSTS, &post("a")).await.unwrap();
        let second = repo.insert(&POSTS, &post("b")).await.unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(second["userId"], Value::Null);
    }

    #[tokio::test]
    async fn child_insert_requires_existing_parent() {
        let repo = InMemoryRepository::new(CATALOG);
        let err = repo.insert(&COMMENTS, &comment(9999, "x")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));
        assert_eq!(repo.count(&COMMENTS).await, 0);
    }

    #[tokio::test]
    async fn projection_limits_fields_and_nests_parent_summary() {
        let repo = InMemoryRepository::new(CATALOG);
        repo.insert(&POSTS, &post("parent")).await.unwrap();
        repo.insert(&COMMENTS, &comment(1, "ann")).await.unwrap();

        let rows = repo
            .find(&COMMENTS, &QueryPlan::default(), &COMMENTS.default_projection())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 5);
        assert!(!rows[0].contains_key("postId"));
        assert_eq!(rows[0]["post"], serde_json::json!({ "id": 1, "title": "parent" }));
    }

    #[tokio::test]
    async fn deleting_a_parent_cascades_to_children() {
        let repo = InMemoryRepository::new(CATALOG);
        repo.insert(&POSTS, &post("a")).await.unwrap();
        repo.insert(&POSTS, &post("b")).await.unwrap();
        repo.insert(&COMMENTS, &comment(1, "x")).await.unwrap();
        repo.insert(&COMMENTS, &comment(2, "y")).await.unwrap();

        repo.delete_by_id(&POSTS, 1).await.unwrap();
        assert_eq!(repo.count(&COMMENTS).await, 1);
        let by_id = [Predicate::eq(COMMENTS.primary_key(), 2)];
        let left = repo
            .find_one(&COMMENTS, &by_id, &COMMENTS.key_projection())
            .await
            .unwrap();
        assert!(left.is_some());
    }

    #[tokio::test]
    async fn deleting_an_owner_clears_the_reference() {
        let repo = InMemoryRepository::new(CATALOG);
        let user = FieldValues::new()
            .with(USERS.field("username").unwrap(), "ann")
            .with(USERS.field("passwordHash").unwrap(), "x");
        repo.insert(&USERS, &user).await.unwrap();
        repo.insert(&POSTS, &post("a").with(POSTS.field("userId").unwrap(), 1)).await.unwrap();

        repo.delete_by_id(&USERS, 1).await.unwrap();
        let row = repo
            .find_one(&POSTS, &[], &POSTS.default_projection())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["user"], Value::Null);
        assert_eq!(repo.count(&POSTS).await, 1);
    }

    #[tokio::test]
    async fn unique_fields_reject_duplicates() {
        let repo = InMemoryRepository::new(CATALOG);
        let user = FieldValues::new()
            .with(USERS.field("username").unwrap(), "ann")
            .with(USERS.field("passwordHash").unwrap(), "x");
        repo.insert(&USERS, &user).await.unwrap();
        let err = repo.insert(&USERS, &user).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn find_applies_order_offset_and_limit() {
        let repo = InMemoryRepository::new(CATALOG);
        for title in ["c", "a", "b", "a"] {
            repo.insert(&POSTS, &post(title)).await.unwrap();
        }
        let plan = QueryPlan {
            predicates: vec![],
            order: vec![
                SortKey { field: POSTS.field("title").unwrap(), direction: SortDirection::Asc },
                SortKey { field: POSTS.primary_key(), direction: SortDirection::Desc },
            ],
            offset: 1,
            limit: Some(2),
        };
        let rows = repo.find(&POSTS, &plan, &POSTS.key_projection()).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        // full order: a(4), a(2), b(3), c(1)
        assert_eq!(ids, vec![2_i64, 3]);
    }
}

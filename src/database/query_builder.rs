use crate::database::models::{EntityDescriptor, FieldValues, Projection};
use crate::filter::{Predicate, QueryPlan, SortKey};
use crate::types::Scalar;

const BASE: &str = "t";
const JOINED: &str = "r";

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Scalar>,
}

/// Renders typed plans as parameterized PostgreSQL.
///
/// Every identifier comes from an entity descriptor and every value is a
/// bind parameter, so caller input never reaches the SQL text.
pub struct QueryBuilder {
    entity: &'static EntityDescriptor,
    params: Vec<Scalar>,
}

impl QueryBuilder {
    pub fn new(entity: &'static EntityDescriptor) -> Self {
        Self { entity, params: vec![] }
    }

    pub fn find(self, plan: &QueryPlan, projection: &Projection) -> SqlResult {
        self.select(&plan.predicates, &plan.order, plan.offset, plan.limit, projection)
    }

    pub fn find_one(self, predicates: &[Predicate], projection: &Projection) -> SqlResult {
        self.select(predicates, &[], 0, Some(1), projection)
    }

    fn select(
        mut self,
        predicates: &[Predicate],
        order: &[SortKey],
        offset: u64,
        limit: Option<u64>,
        projection: &Projection,
    ) -> SqlResult {
        let mut parts = vec![
            format!("SELECT {} AS \"row\"", Self::row_object(projection)),
            format!("FROM {} AS {}", quote(self.entity.table), quote(BASE)),
        ];

        if let Some(rel) = &projection.relation {
            parts.push(format!(
                "LEFT JOIN {} AS {} ON {} = {}",
                quote(rel.target.table),
                quote(JOINED),
                column(JOINED, rel.target.primary_key().column),
                column(BASE, rel.foreign_key.column),
            ));
        }

        if !predicates.is_empty() {
            let conditions: Vec<String> = predicates.iter().map(|p| self.condition(p)).collect();
            parts.push(format!("WHERE {}", conditions.join(" AND ")));
        }

        if !order.is_empty() {
            let keys: Vec<String> = order
                .iter()
                .map(|k| format!("{} {}", column(BASE, k.field.column), k.direction.to_sql()))
                .collect();
            parts.push(format!("ORDER BY {}", keys.join(", ")));
        }

        match (limit, offset) {
            (Some(l), 0) => parts.push(format!("LIMIT {}", l)),
            (Some(l), o) => parts.push(format!("LIMIT {} OFFSET {}", l, o)),
            (None, 0) => {}
            (None, o) => parts.push(format!("OFFSET {}", o)),
        }

        SqlResult { query: parts.join(" "), params: self.params }
    }

    pub fn insert(mut self, fields: &FieldValues) -> SqlResult {
        let table = quote(self.entity.table);
        let returning = format!("RETURNING {} AS \"row\"", Self::full_object(self.entity));
        if fields.is_empty() {
            let query = format!("INSERT INTO {} DEFAULT VALUES {}", table, returning);
            return SqlResult { query, params: vec![] };
        }

        let mut columns = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (field, value) in fields.iter() {
            columns.push(quote(field.column));
            values.push(self.param(value.clone()));
        }
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({}) {}",
            table,
            columns.join(", "),
            values.join(", "),
            returning
        );
        SqlResult { query, params: self.params }
    }

    pub fn update_by_id(mut self, id: i64, patch: &FieldValues) -> SqlResult {
        let assignments: Vec<String> = patch
            .iter()
            .map(|(field, value)| {
                format!("{} = {}", quote(field.column), self.param(value.clone()))
            })
            .collect();
        let id_param = self.param(Scalar::Int(id));
        let query = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            quote(self.entity.table),
            assignments.join(", "),
            quote(self.entity.primary_key().column),
            id_param
        );
        SqlResult { query, params: self.params }
    }

    pub fn delete_by_id(mut self, id: i64) -> SqlResult {
        let id_param = self.param(Scalar::Int(id));
        let query = format!(
            "DELETE FROM {} WHERE {} = {}",
            quote(self.entity.table),
            quote(self.entity.primary_key().column),
            id_param
        );
        SqlResult { query, params: self.params }
    }

    fn condition(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Eq { field, value } => {
                format!("{} = {}", column(BASE, field.column), self.param(value.clone()))
            }
            Predicate::In { field, values } => {
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", column(BASE, field.column), params.join(", "))
            }
        }
    }

    fn row_object(projection: &Projection) -> String {
        let mut pairs: Vec<String> = projection
            .own
            .iter()
            .map(|f| format!("{}, {}", literal(f.name), column(BASE, f.column)))
            .collect();

        if let Some(rel) = &projection.relation {
            let nested: Vec<String> = rel
                .fields
                .iter()
                .map(|f| format!("{}, {}", literal(f.name), column(JOINED, f.column)))
                .collect();
            pairs.push(format!(
                "{}, CASE WHEN {} IS NULL THEN NULL ELSE json_build_object({}) END",
                literal(rel.name),
                column(JOINED, rel.target.primary_key().column),
                nested.join(", ")
            ));
        }

        format!("json_build_object({})", pairs.join(", "))
    }

    fn full_object(entity: &'static EntityDescriptor) -> String {
        let pairs: Vec<String> = entity
            .fields
            .iter()
            .map(|f| format!("{}, {}", literal(f.name), quote(f.column)))
            .collect();
        format!("json_build_object({})", pairs.join(", "))
    }

    fn param(&mut self, value: Scalar) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}

/// Quote SQL identifier to prevent injection
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column(alias: &str, name: &str) -> String {
    format!("{}.{}", quote(alias), quote(name))
}

fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{COMMENTS, POSTS, USERS};
    use crate::filter::{SortDirection, SortKey};

    #[test]
    fn select_joins_parent_summary_and_binds_every_value() {
        let post_id = COMMENTS.field("postId").unwrap();
        let plan = QueryPlan {
            predicates: vec![
                Predicate::eq(post_id, 1),
                Predicate::In {
                    field: &COMMENTS.fields[0],
                    values: vec![Scalar::Int(2), Scalar::Int(5)],
                },
            ],
            order: vec![SortKey { field: COMMENTS.primary_key(), direction: SortDirection::Desc }],
            offset: 20,
            limit: Some(10),
        };
        let sql = QueryBuilder::new(&COMMENTS).find(&plan, &COMMENTS.default_projection());

        assert_eq!(
            sql.query,
            "SELECT json_build_object('id', \"t\".\"id\", 'name', \"t\".\"name\", \
             'email', \"t\".\"email\", 'body', \"t\".\"body\", 'post', CASE WHEN \
             \"r\".\"id\" IS NULL THEN NULL ELSE \
             json_build_object('id', \"r\".\"id\", 'title', \"r\".\"title\") END) AS \"row\" \
             FROM \"comments\" AS \"t\" LEFT JOIN \"posts\" AS \"r\" \
             ON \"r\".\"id\" = \"t\".\"post_id\" \
             WHERE \"t\".\"post_id\" = $1 AND \"t\".\"id\" IN ($2, $3) \
             ORDER BY \"t\".\"id\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(5)]);
    }

    #[test]
    fn empty_membership_matches_nothing() {
        let plan = QueryPlan {
            predicates: vec![Predicate::In { field: POSTS.primary_key(), values: vec![] }],
            ..Default::default()
        };
        let sql = QueryBuilder::new(&POSTS).find(&plan, &POSTS.key_projection());
        assert!(sql.query.ends_with("WHERE 1=0"));
        assert!(sql.params.is_empty());
    }

    #[test]
    fn unbounded_plan_has_no_limit_clause() {
        let sql = QueryBuilder::new(&POSTS).find(&QueryPlan::default(), &POSTS.key_projection());
        assert!(!sql.query.contains("LIMIT"));
        assert!(!sql.query.contains("OFFSET"));
        assert!(!sql.query.contains("JOIN"));
    }

    #[test]
    fn user_projection_never_selects_password_hash() {
        let sql =
            QueryBuilder::new(&USERS).find(&QueryPlan::default(), &USERS.default_projection());
        assert!(!sql.query.contains("password_hash"));
    }

    #[test]
    fn insert_returns_full_row() {
        let fields = FieldValues::new()
            .with(POSTS.field("title").unwrap(), "hello")
            .with(POSTS.field("body").unwrap(), "world");
        let sql = QueryBuilder::new(&POSTS).insert(&fields);
        assert_eq!(
            sql.query,
            "INSERT INTO \"posts\" (\"title\", \"body\") VALUES ($1, $2) \
             RETURNING json_build_object(\
             'id', \"id\", 'title', \"title\", 'body', \"body\", 'userId', \"user_id\") AS \"row\""
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn update_and_delete_target_primary_key() {
        let patch = FieldValues::new().with(COMMENTS.field("body").unwrap(), "x");
        let sql = QueryBuilder::new(&COMMENTS).update_by_id(9, &patch);
        assert_eq!(sql.query, "UPDATE \"comments\" SET \"body\" = $1 WHERE \"id\" = $2");
        assert_eq!(sql.params, vec![Scalar::Text("x".into()), Scalar::Int(9)]);

        let sql = QueryBuilder::new(&COMMENTS).delete_by_id(9);
        assert_eq!(sql.query, "DELETE FROM \"comments\" WHERE \"id\" = $1");
    }

    #[test]
    fn identifiers_are_quoted_defensively() {
        assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(literal("it's"), "'it''s'");
    }
}

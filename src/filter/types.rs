use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::database::models::FieldDef;
use crate::types::Scalar;

/// A filter entry: one value means equality, a list means "any of".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Many(Vec<Scalar>),
    One(Scalar),
}

/// Caller-shaped filter input. `null` values deserialize to `None` and are dropped.
pub type FilterMap = BTreeMap<String, Option<FilterValue>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(alias = "maxRows")]
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub sort_by: String,
    #[serde(default)]
    pub order: Option<String>,
}

impl SortSpec {
    pub fn new(sort_by: impl Into<String>, order: impl Into<String>) -> Self {
        Self { sort_by: sort_by.into(), order: Some(order.into()) }
    }
}

/// Body of the list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: Option<FilterMap>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub sort: Option<Vec<SortSpec>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw {
            None => Some(SortDirection::Asc),
            Some(s) if s.eq_ignore_ascii_case("asc") => Some(SortDirection::Asc),
            Some(s) if s.eq_ignore_ascii_case("desc") => Some(SortDirection::Desc),
            Some(_) => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { field: &'static FieldDef, value: Scalar },
    In { field: &'static FieldDef, values: Vec<Scalar> },
}

impl Predicate {
    pub fn eq(field: &'static FieldDef, value: impl Into<Scalar>) -> Self {
        Predicate::Eq { field, value: value.into() }
    }

    pub fn field(&self) -> &'static FieldDef {
        match self {
            Predicate::Eq { field, .. } | Predicate::In { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: &'static FieldDef,
    pub direction: SortDirection,
}

/// Membership filters larger than this are rejected unless configured lower.
pub const DEFAULT_MAX_IN_VALUES: usize = 1000;

/// Hard ceiling on membership filter size. Each member becomes one bind
/// parameter and Postgres allows at most 65535 per statement.
pub const MAX_IN_VALUES_CEILING: usize = 10_000;

/// Upper and default bounds on page size and filter size, taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagingPolicy {
    /// Applied when the caller omits `pageSize`; `None` means unbounded.
    pub default_page_size: Option<u64>,
    /// Explicit page sizes above this are capped.
    pub max_page_size: Option<u64>,
    /// Largest accepted set in a single membership filter.
    pub max_in_values: usize,
    pub debug_logging: bool,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self {
            default_page_size: None,
            max_page_size: None,
            max_in_values: DEFAULT_MAX_IN_VALUES,
            debug_logging: false,
        }
    }
}

/// Canonical, storage-ready description of a list read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub order: Vec<SortKey>,
    pub offset: u64,
    pub limit: Option<u64>,
}

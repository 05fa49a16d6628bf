use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{
    FilterMap, ListQuery, Pagination, PagingPolicy, Predicate, QueryPlan, SortKey, SortSpec,
    MAX_IN_VALUES_CEILING,
};
use crate::database::models::{EntityDescriptor, FieldDef};
use crate::types::Scalar;

/// Builds a `QueryPlan` for one entity. Performs no I/O.
pub struct Filter {
    entity: &'static EntityDescriptor,
    policy: PagingPolicy,
    predicates: Vec<Predicate>,
    scope: Option<Predicate>,
    order: Vec<SortKey>,
    offset: u64,
    limit: Option<u64>,
}

impl Filter {
    pub fn new(entity: &'static EntityDescriptor, policy: PagingPolicy) -> Self {
        Self {
            entity,
            policy,
            predicates: vec![],
            scope: None,
            order: vec![],
            offset: 0,
            limit: policy.default_page_size,
        }
    }

    pub fn assign(&mut self, query: &ListQuery) -> Result<&mut Self, FilterError> {
        if let Some(filter) = &query.filter {
            self.where_clause(filter)?;
        }
        if let Some(sort) = &query.sort {
            self.order(sort)?;
        }
        if let Some(pagination) = query.pagination {
            self.paginate(pagination)?;
        }
        Ok(self)
    }

    pub fn where_clause(&mut self, filter: &FilterMap) -> Result<&mut Self, FilterError> {
        let max_values = self.policy.max_in_values.min(MAX_IN_VALUES_CEILING);
        self.predicates = FilterWhere::compile(self.entity, filter, max_values)?;
        Ok(self)
    }

    /// Pins `field` to `value`, replacing any caller predicate on the same field.
    pub fn scope(&mut self, field: &'static FieldDef, value: impl Into<Scalar>) -> &mut Self {
        self.scope = Some(Predicate::Eq { field, value: value.into() });
        self
    }

    pub fn order(&mut self, sort: &[SortSpec]) -> Result<&mut Self, FilterError> {
        self.order = FilterOrder::compile(self.entity, sort)?;
        Ok(self)
    }

    pub fn paginate(&mut self, pagination: Pagination) -> Result<&mut Self, FilterError> {
        let page = match pagination.page {
            None | Some(0) => 1,
            Some(p) if p > 0 => p as u64,
            Some(p) => return Err(FilterError::InvalidPage(format!("{} (pages start at 1)", p))),
        };

        let size = match pagination.page_size {
            None => self.policy.default_page_size,
            Some(s) if s > 0 => Some(self.cap(s as u64)),
            Some(s) => {
                let reason = format!("{} (must be greater than 0)", s);
                return Err(FilterError::InvalidPageSize(reason));
            }
        };

        // Without a page size there is a single page; the offset stays at zero.
        let offset = match size {
            Some(size) => (page - 1)
                .checked_mul(size)
                .filter(|o| *o <= i64::MAX as u64)
                .ok_or_else(|| FilterError::InvalidPage(format!("{} is out of range", page)))?,
            None => 0,
        };

        self.offset = offset;
        self.limit = size;
        Ok(self)
    }

    pub fn build(&self) -> QueryPlan {
        let mut predicates = self.predicates.clone();
        if let Some(scope) = &self.scope {
            let pinned = scope.field().name;
            predicates.retain(|p| p.field().name != pinned);
            predicates.insert(0, scope.clone());
        }
        QueryPlan {
            predicates,
            order: FilterOrder::with_tiebreak(self.entity, self.order.clone()),
            offset: self.offset,
            limit: self.limit,
        }
    }

    fn cap(&self, size: u64) -> u64 {
        match self.policy.max_page_size {
            Some(max) if size > max => {
                if self.policy.debug_logging {
                    tracing::warn!("Page size {} exceeds max {}, capping to max", size, max);
                }
                max
            }
            _ => size,
        }
    }
}

/// Normalizes raw list input for `entity` into a canonical plan.
pub fn normalize(
    entity: &'static EntityDescriptor,
    filter: &FilterMap,
    pagination: Pagination,
    sort: &[SortSpec],
    policy: PagingPolicy,
) -> Result<QueryPlan, FilterError> {
    let plan = Filter::new(entity, policy)
        .where_clause(filter)?
        .order(sort)?
        .paginate(pagination)?
        .build();
    Ok(plan)
}

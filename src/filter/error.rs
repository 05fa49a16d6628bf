use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: &'static str, field: String },

    #[error("Field '{0}' cannot be used in a filter")]
    NotFilterable(String),

    #[error("Field '{0}' cannot be used for sorting")]
    NotSortable(String),

    #[error("Field '{0}' appears more than once in sort")]
    DuplicateSort(String),

    #[error("Invalid sort direction '{0}'; expected 'asc' or 'desc'")]
    InvalidDirection(String),

    #[error("Filter value for '{field}' must be {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("Filter on '{field}' lists {count} values; at most {max} are allowed")]
    TooManyValues { field: String, count: usize, max: usize },

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Projection field '{field}' does not belong to {entity}")]
    InvalidProjection { entity: &'static str, field: String },
}

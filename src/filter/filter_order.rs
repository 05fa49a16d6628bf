use super::error::FilterError;
use super::types::{SortDirection, SortKey, SortSpec};
use crate::database::models::EntityDescriptor;

pub struct FilterOrder;

impl FilterOrder {
    /// Validates sort specs against the entity's sortable fields, keeping
    /// caller order so later keys break ties among earlier ones.
    pub fn compile(
        entity: &'static EntityDescriptor,
        sort: &[SortSpec],
    ) -> Result<Vec<SortKey>, FilterError> {
        let mut keys: Vec<SortKey> = Vec::with_capacity(sort.len() + 1);
        for spec in sort {
            let field = entity.field(&spec.sort_by).ok_or_else(|| FilterError::UnknownField {
                entity: entity.name,
                field: spec.sort_by.clone(),
            })?;
            if !field.sortable {
                return Err(FilterError::NotSortable(spec.sort_by.clone()));
            }
            if keys.iter().any(|k| k.field.name == field.name) {
                return Err(FilterError::DuplicateSort(spec.sort_by.clone()));
            }
            let direction = SortDirection::parse(spec.order.as_deref()).ok_or_else(|| {
                FilterError::InvalidDirection(spec.order.clone().unwrap_or_default())
            })?;
            keys.push(SortKey { field, direction });
        }
        Ok(keys)
    }

    /// Appends `id ASC` unless the primary key is already a sort key, so that
    /// pages never overlap or skip rows.
    pub fn with_tiebreak(
        entity: &'static EntityDescriptor,
        mut keys: Vec<SortKey>,
    ) -> Vec<SortKey> {
        let pk = entity.primary_key();
        if !keys.iter().any(|k| k.field.name == pk.name) {
            keys.push(SortKey { field: pk, direction: SortDirection::Asc });
        }
        keys
    }
}

use super::error::FilterError;
use super::types::{FilterMap, FilterValue, Predicate};
use crate::database::models::{EntityDescriptor, FieldDef};
use crate::types::Scalar;

pub struct FilterWhere;

impl FilterWhere {
    /// Compiles caller filters into typed predicates, in key order.
    ///
    /// Absent and `null` entries are skipped entirely; they never become an
    /// "is null" test.
    pub fn compile(
        entity: &'static EntityDescriptor,
        filter: &FilterMap,
        max_values: usize,
    ) -> Result<Vec<Predicate>, FilterError> {
        let mut predicates = Vec::with_capacity(filter.len());
        for (key, value) in filter {
            let Some(value) = value else { continue };
            let field = entity.field(key).ok_or_else(|| FilterError::UnknownField {
                entity: entity.name,
                field: key.clone(),
            })?;
            if !field.filterable {
                return Err(FilterError::NotFilterable(key.clone()));
            }
            predicates.push(Self::compile_field(field, value, max_values)?);
        }
        Ok(predicates)
    }

    fn compile_field(
        field: &'static FieldDef,
        value: &FilterValue,
        max_values: usize,
    ) -> Result<Predicate, FilterError> {
        match value {
            FilterValue::One(v) => {
                Self::check_kind(field, v)?;
                Ok(Predicate::Eq { field, value: v.clone() })
            }
            FilterValue::Many(vs) => {
                if vs.len() > max_values {
                    return Err(FilterError::TooManyValues {
                        field: field.name.to_string(),
                        count: vs.len(),
                        max: max_values,
                    });
                }
                let mut values: Vec<Scalar> = Vec::with_capacity(vs.len());
                for v in vs {
                    Self::check_kind(field, v)?;
                    if !values.contains(v) {
                        values.push(v.clone());
                    }
                }
                Ok(Predicate::In { field, values })
            }
        }
    }

    fn check_kind(field: &FieldDef, value: &Scalar) -> Result<(), FilterError> {
        if field.kind.accepts(value) {
            Ok(())
        } else {
            Err(FilterError::TypeMismatch {
                field: field.name.to_string(),
                expected: field.kind.name(),
            })
        }
    }
}

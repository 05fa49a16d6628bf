use std::collections::BTreeMap;

use super::entity::{FieldDef, FieldValues};
use crate::types::Scalar;

/// Per-field validation messages keyed by wire field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Text,
    Email,
    Url,
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("must not be empty".to_string());
        }
        match self {
            Rule::Text => Ok(()),
            Rule::Email => {
                let mut parts = value.split('@');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(local), Some(domain), None)
                        if !local.is_empty() && !domain.is_empty() =>
                    {
                        Ok(())
                    }
                    _ => Err(format!("'{}' is not a valid email address", value)),
                }
            }
            Rule::Url => url::Url::parse(value)
                .map(|_| ())
                .map_err(|e| format!("'{}' is not an absolute URL: {}", value, e)),
        }
    }
}

/// Collects validated values and every failing field in one pass.
#[derive(Debug, Default)]
pub struct Validator {
    fields: FieldValues,
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &'static FieldDef, rule: Rule, value: String) -> &mut Self {
        match rule.check(&value) {
            Ok(()) => self.fields.set(field, Scalar::Text(value)),
            Err(msg) => {
                self.errors.insert(field.name.to_string(), msg);
            }
        }
        self
    }

    pub fn optional(
        &mut self,
        field: &'static FieldDef,
        rule: Rule,
        value: Option<String>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.required(field, rule, value);
        }
        self
    }

    pub fn finish(&mut self) -> Result<FieldValues, FieldErrors> {
        if self.errors.is_empty() {
            Ok(std::mem::take(&mut self.fields))
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

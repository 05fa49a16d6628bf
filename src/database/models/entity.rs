use serde_json::Value;

use crate::types::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
}

impl FieldKind {
    pub fn accepts(&self, value: &Scalar) -> bool {
        matches!(
            (self, value),
            (FieldKind::Int, Scalar::Int(_)) | (FieldKind::Text, Scalar::Text(_))
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Int => "integer",
            FieldKind::Text => "string",
        }
    }
}

/// One column of an entity: the name callers use and the column storage uses.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub filterable: bool,
    pub sortable: bool,
    pub unique: bool,
}

impl FieldDef {
    pub const fn int(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Int,
            filterable: true,
            sortable: true,
            unique: false,
        }
    }

    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Text,
            filterable: true,
            sortable: true,
            unique: false,
        }
    }

    pub const fn unique(self) -> Self {
        Self { unique: true, ..self }
    }

    /// Stored but never filterable, sortable or projected by default.
    pub const fn hidden(self) -> Self {
        Self { filterable: false, sortable: false, ..self }
    }
}

/// Primary key shared by every entity.
pub const ID: FieldDef = FieldDef::int("id", "id");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The related row scopes the URL path (`/posts/:postId/comments`).
    Parent,
    /// The related row records who created this one.
    Owner,
}

#[derive(Debug)]
pub struct RelationDef {
    pub name: &'static str,
    pub kind: RelationKind,
    pub target: &'static EntityDescriptor,
    pub foreign_key: &'static FieldDef,
    /// Target fields exposed in the nested relation object.
    pub summary: &'static [&'static str],
}

#[derive(Debug)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    /// Own fields returned by list and detail.
    pub view: &'static [&'static str],
    pub relation: Option<RelationDef>,
}

impl EntityDescriptor {
    pub fn field(&'static self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&'static self) -> &'static FieldDef {
        self.field(ID.name).unwrap_or(&ID)
    }

    pub fn parent(&self) -> Option<&RelationDef> {
        self.relation.as_ref().filter(|r| r.kind == RelationKind::Parent)
    }

    pub fn owner(&self) -> Option<&RelationDef> {
        self.relation.as_ref().filter(|r| r.kind == RelationKind::Owner)
    }

    /// True when `field` is managed by storage or by the service, never by callers.
    pub fn is_reserved(&self, field: &FieldDef) -> bool {
        field.name == ID.name
            || self.relation.as_ref().map_or(false, |r| r.foreign_key.name == field.name)
    }

    /// The list/detail projection: `view` fields plus the relation summary.
    pub fn default_projection(&'static self) -> Projection {
        let own = self
            .fields
            .iter()
            .filter(|f| self.view.contains(&f.name))
            .collect();
        let relation = self.relation.as_ref().map(|r| RelationProjection {
            name: r.name,
            target: r.target,
            foreign_key: r.foreign_key,
            fields: r
                .target
                .fields
                .iter()
                .filter(|f| r.summary.contains(&f.name))
                .collect(),
        });
        Projection { entity: self, own, relation }
    }

    /// Projection carrying only the primary key; used for existence checks.
    pub fn key_projection(&'static self) -> Projection {
        Projection { entity: self, own: vec![self.primary_key()], relation: None }
    }
}

/// Exactly which fields a read returns.
#[derive(Debug, Clone)]
pub struct Projection {
    pub entity: &'static EntityDescriptor,
    pub own: Vec<&'static FieldDef>,
    pub relation: Option<RelationProjection>,
}

#[derive(Debug, Clone)]
pub struct RelationProjection {
    pub name: &'static str,
    pub target: &'static EntityDescriptor,
    pub foreign_key: &'static FieldDef,
    pub fields: Vec<&'static FieldDef>,
}

impl Projection {
    pub fn includes(&self, name: &str) -> bool {
        self.own.iter().any(|f| f.name == name)
    }

    /// Adds an own field if it is not already projected.
    pub fn with_field(mut self, field: &'static FieldDef) -> Self {
        if !self.includes(field.name) {
            self.own.push(field);
        }
        self
    }

    /// Same entity, same relation, only the named own fields.
    pub fn only(&self, names: &[&str]) -> Self {
        Self {
            entity: self.entity,
            own: self.own.iter().copied().filter(|f| names.contains(&f.name)).collect(),
            relation: self.relation.clone(),
        }
    }
}

/// A validated write set: every key is a field of the target entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues(Vec<(&'static FieldDef, Scalar)>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static FieldDef, value: Scalar) {
        match self.0.iter_mut().find(|(f, _)| f.name == field.name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((field, value)),
        }
    }

    pub fn with(mut self, field: &'static FieldDef, value: impl Into<Scalar>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.iter().find(|(f, _)| f.name == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldDef, &Scalar)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }
}

/// Reads an integer foreign key out of a projected record.
pub fn record_i64(record: &crate::types::Record, name: &str) -> Option<i64> {
    record.get(name).and_then(Value::as_i64)
}

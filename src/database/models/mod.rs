pub mod album;
pub mod comment;
pub mod entity;
pub mod photo;
pub mod post;
pub mod user;
pub mod validate;

pub use album::ALBUMS;
pub use comment::COMMENTS;
pub use entity::{
    record_i64, EntityDescriptor, FieldDef, FieldKind, FieldValues, Projection, RelationDef,
    RelationKind, RelationProjection, ID,
};
pub use photo::PHOTOS;
pub use post::POSTS;
pub use user::USERS;
pub use validate::{FieldErrors, Rule, Validator};

/// Every entity the storage layer knows about, parents before children.
pub static CATALOG: &[&EntityDescriptor] = &[&USERS, &POSTS, &COMMENTS, &ALBUMS, &PHOTOS];

/// A typed request body that can be turned into a validated write set.
pub trait Payload {
    fn into_fields(self) -> Result<FieldValues, FieldErrors>;
}

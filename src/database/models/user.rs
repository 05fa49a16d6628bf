use super::entity::{EntityDescriptor, FieldDef, ID};

pub const USERNAME: FieldDef = FieldDef::text("username", "username").unique();
pub const PASSWORD_HASH: FieldDef = FieldDef::text("passwordHash", "password_hash").hidden();

/// Accounts that can log in and own posts and albums.
pub static USERS: EntityDescriptor = EntityDescriptor {
    name: "user",
    label: "User",
    table: "users",
    fields: &[ID, USERNAME, PASSWORD_HASH],
    view: &["id", "username"],
    relation: None,
};

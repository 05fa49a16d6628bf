use serde::Deserialize;

use super::entity::{EntityDescriptor, FieldDef, FieldValues, RelationDef, RelationKind, ID};
use super::user::USERS;
use super::validate::{FieldErrors, Rule, Validator};
use super::Payload;

pub const TITLE: FieldDef = FieldDef::text("title", "title");
pub const USER_ID: FieldDef = FieldDef::int("userId", "user_id");

pub static ALBUMS: EntityDescriptor = EntityDescriptor {
    name: "album",
    label: "Album",
    table: "albums",
    fields: &[ID, TITLE, USER_ID],
    view: &["id", "title"],
    relation: Some(RelationDef {
        name: "user",
        kind: RelationKind::Owner,
        target: &USERS,
        foreign_key: &USER_ID,
        summary: &["id", "username"],
    }),
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAlbum {
    pub title: String,
}

impl Payload for CreateAlbum {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new().required(&TITLE, Rule::Text, self.title).finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAlbum {
    pub title: Option<String>,
}

impl Payload for UpdateAlbum {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new().optional(&TITLE, Rule::Text, self.title).finish()
    }
}

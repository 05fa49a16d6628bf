use serde::Deserialize;

use super::entity::{EntityDescriptor, FieldDef, FieldValues, RelationDef, RelationKind, ID};
use super::user::USERS;
use super::validate::{FieldErrors, Rule, Validator};
use super::Payload;

pub const TITLE: FieldDef = FieldDef::text("title", "title");
pub const BODY: FieldDef = FieldDef::text("body", "body");
pub const USER_ID: FieldDef = FieldDef::int("userId", "user_id");

pub static POSTS: EntityDescriptor = EntityDescriptor {
    name: "post",
    label: "Post",
    table: "posts",
    fields: &[ID, TITLE, BODY, USER_ID],
    view: &["id", "title", "body"],
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
pub struct CreatePost {
    pub title: String,
    pub body: String,
}

impl Payload for CreatePost {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new()
            .required(&TITLE, Rule::Text, self.title)
            .required(&BODY, Rule::Text, self.body)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Payload for UpdatePost {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new()
            .optional(&TITLE, Rule::Text, self.title)
            .optional(&BODY, Rule::Text, self.body)
            .finish()
    }
}

use serde::Deserialize;

use super::entity::{EntityDescriptor, FieldDef, FieldValues, RelationDef, RelationKind, ID};
use super::post::POSTS;
use super::validate::{FieldErrors, Rule, Validator};
use super::Payload;

pub const NAME: FieldDef = FieldDef::text("name", "name");
pub const EMAIL: FieldDef = FieldDef::text("email", "email");
pub const BODY: FieldDef = FieldDef::text("body", "body");
pub const POST_ID: FieldDef = FieldDef::int("postId", "post_id");

pub static COMMENTS: EntityDescriptor = EntityDescriptor {
    name: "comment",
    label: "Comment",
    table: "comments",
    fields: &[ID, NAME, EMAIL, BODY, POST_ID],
    view: &["id", "name", "email", "body"],
    relation: Some(RelationDef {
        name: "post",
        kind: RelationKind::Parent,
        target: &POSTS,
        foreign_key: &POST_ID,
        summary: &["id", "title"],
    }),
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateComment {
    pub name: String,
    pub email: String,
    pub body: String,
}

impl Payload for CreateComment {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new()
            .required(&NAME, Rule::Text, self.name)
            .required(&EMAIL, Rule::Email, self.email)
            .required(&BODY, Rule::Text, self.body)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateComment {
    pub name: Option<String>,
    pub email: Option<String>,
    pub body: Option<String>,
}

impl Payload for UpdateComment {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new()
            .optional(&NAME, Rule::Text, self.name)
            .optional(&EMAIL, Rule::Email, self.email)
            .optional(&BODY, Rule::Text, self.body)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parent_reference_cannot_come_from_the_body() {
        let err = serde_json::from_value::<UpdateComment>(json!({ "body": "x", "postId": 2 }));
        assert!(err.is_err());
    }

    #[test]
    fn partial_patch_only_carries_present_fields() {
        let patch: UpdateComment = serde_json::from_value(json!({ "body": "x" })).unwrap();
        let fields = patch.into_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains("body"));
        assert!(!fields.contains("name"));
    }
}

use serde::Deserialize;

use super::album::ALBUMS;
use super::entity::{EntityDescriptor, FieldDef, FieldValues, RelationDef, RelationKind, ID};
use super::validate::{FieldErrors, Rule, Validator};
use super::Payload;

pub const TITLE: FieldDef = FieldDef::text("title", "title");
pub const URL: FieldDef = FieldDef::text("url", "url");
pub const THUMBNAIL_URL: FieldDef = FieldDef::text("thumbnailUrl", "thumbnail_url");
pub const ALBUM_ID: FieldDef = FieldDef::int("albumId", "album_id");

pub static PHOTOS: EntityDescriptor = EntityDescriptor {
    name: "photo",
    label: "Photo",
    table: "photos",
    fields: &[ID, TITLE, URL, THUMBNAIL_URL, ALBUM_ID],
    view: &["id", "title", "url", "thumbnailUrl"],
    relation: Some(RelationDef {
        name: "album",
        kind: RelationKind::Parent,
        target: &ALBUMS,
        foreign_key: &ALBUM_ID,
        summary: &["id", "title"],
    }),
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreatePhoto {
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
}

impl Payload for CreatePhoto {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new()
            .required(&TITLE, Rule::Text, self.title)
            .required(&URL, Rule::Url, self.url)
            .required(&THUMBNAIL_URL, Rule::Url, self.thumbnail_url)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdatePhoto {
    pub title: Option<String>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Payload for UpdatePhoto {
    fn into_fields(self) -> Result<FieldValues, FieldErrors> {
        Validator::new()
            .optional(&TITLE, Rule::Text, self.title)
            .optional(&URL, Rule::Url, self.url)
            .optional(&THUMBNAIL_URL, Rule::Url, self.thumbnail_url)
            .finish()
    }
}

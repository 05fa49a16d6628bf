// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Top-level resources are served by `collection`, resources reached through
// a parent path by `nested`. Both are generic over the entity's payload types.
pub mod collection;
pub mod nested;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::models::{FieldValues, Payload};
use crate::error::ApiError;
use crate::filter::ListQuery;

/// Decodes and validates a create/patch body.
fn payload<T: DeserializeOwned + Payload>(body: Value) -> Result<FieldValues, ApiError> {
    let typed: T = serde_json::from_value(body)
        .map_err(|e| ApiError::validation_error(e.to_string(), None))?;
    typed
        .into_fields()
        .map_err(|errors| ApiError::validation_error("Invalid payload", Some(errors)))
}

fn list_query(body: Value) -> Result<ListQuery, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::InvalidQuery(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::comment::CreateComment;
    use serde_json::json;

    #[test]
    fn unknown_keys_are_validation_errors() {
        let body = json!({ "name": "a", "email": "a@b", "body": "c", "postId": 3 });
        let err = payload::<CreateComment>(body).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn field_rules_are_reported_per_field() {
        let body = json!({ "name": "", "email": "nope", "body": "c" });
        let err = payload::<CreateComment>(body).unwrap_err();
        let body = err.to_json();
        assert!(body["field_errors"]["name"].is_string());
        assert!(body["field_errors"]["email"].is_string());
    }

    #[test]
    fn malformed_list_body_is_an_invalid_query() {
        let err = list_query(json!({ "sort": "id" })).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY");
    }
}

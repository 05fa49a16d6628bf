use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, PasswordCost, TokenIssuer};
use crate::database::manager::DatabaseError;
use crate::database::models::{record_i64, FieldErrors, Rule, Validator, USERS};
use crate::database::models::user::{PASSWORD_HASH, USERNAME};
use crate::database::repository::StorageRepository;
use crate::filter::Predicate;
use crate::types::Record;

use super::error::{ServiceError, ServiceResult};

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Credential checks and account creation over the `users` table.
pub struct AuthService {
    repo: Arc<dyn StorageRepository>,
    issuer: Arc<TokenIssuer>,
    cost: PasswordCost,
}

impl AuthService {
    pub fn new(
        repo: Arc<dyn StorageRepository>,
        issuer: Arc<TokenIssuer>,
        cost: PasswordCost,
    ) -> Self {
        Self { repo, issuer, cost }
    }

    /// Unknown users and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginResponse> {
        let projection = USERS.default_projection().with_field(&PASSWORD_HASH);
        let user = self
            .repo
            .find_one(&USERS, &[Predicate::eq(&USERNAME, username)], &projection)
            .await?;

        let Some(user) = user else {
            warn!(username, "login for unknown user");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        let stored = user
            .get(PASSWORD_HASH.name)
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if !verify_password(password, stored) {
            warn!(username, "login with wrong password");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let id = record_i64(&user, "id")
            .ok_or_else(|| DatabaseError::QueryError("user row without id".to_string()))?;
        let access_token = self.issuer.issue(id, username)?;

        info!(user_id = id, "login succeeded");
        Ok(LoginResponse { access_token })
    }

    pub async fn create_user(&self, username: &str, password: &str) -> ServiceResult<Record> {
        let mut fields = Validator::new()
            .required(&USERNAME, Rule::Text, username.to_string())
            .finish()
            .map_err(|errors| ServiceError::validation("Invalid user", errors))?;
        if password.trim().is_empty() {
            let errors =
                FieldErrors::from([("password".to_string(), "must not be empty".to_string())]);
            return Err(ServiceError::validation("Invalid user", errors));
        }
        fields.set(&PASSWORD_HASH, hash_password(password, &self.cost)?.into());

        let row = self.repo.insert(&USERS, &fields).await.map_err(|err| match err {
            DatabaseError::UniqueViolation(_) => {
                let errors =
                    FieldErrors::from([("username".to_string(), "is already taken".to_string())]);
                ServiceError::validation("Invalid user", errors)
            }
            other => ServiceError::StorageFailure(other),
        })?;

        let id = record_i64(&row, "id").unwrap_or_default();
        info!(user_id = id, "user created");
        Ok(row.into_iter().filter(|(k, _)| k != PASSWORD_HASH.name).collect())
    }
}

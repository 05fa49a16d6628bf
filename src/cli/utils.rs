use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::memory::InMemoryRepository;
use crate::database::models::CATALOG;
use crate::database::postgres::PgRepository;
use crate::database::repository::StorageRepository;
use crate::database::DatabaseManager;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Connects to PostgreSQL, or builds an empty in-memory store.
pub async fn repository(
    config: &AppConfig,
    memory: bool,
) -> anyhow::Result<Arc<dyn StorageRepository>> {
    if memory {
        tracing::warn!("Using in-memory storage; data is lost on exit");
        return Ok(Arc::new(InMemoryRepository::new(CATALOG)));
    }
    Ok(Arc::new(postgres(config).await?))
}

pub async fn postgres(config: &AppConfig) -> anyhow::Result<PgRepository> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(PgRepository::new(pool, config.database.enable_query_logging))
}

/// Splits `user:password`; the password may itself contain colons.
pub fn split_credentials(raw: &str) -> anyhow::Result<(&str, &str)> {
    raw.split_once(':')
        .filter(|(user, _)| !user.is_empty())
        .ok_or_else(|| anyhow::anyhow!("expected USER:PASSWORD, got '{}'", raw))
}

use crate::cli::utils::{output_success, postgres};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::schema;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let repo = postgres(config).await?;
    repo.migrate().await?;
    output_success(
        output_format,
        "Schema applied",
        Some(serde_json::json!({ "statements": schema::STATEMENTS.len() })),
    )
}

use std::sync::Arc;

use clap::Subcommand;
use serde_json::Value;

use crate::auth::TokenIssuer;
use crate::cli::utils::{output_success, postgres};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::services::AuthService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user that can log in")]
    Add {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password")]
        password: String,
    },
}

pub async fn handle(
    config: &AppConfig,
    cmd: UserCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { username, password } => {
            let repo = Arc::new(postgres(config).await?);
            let issuer = Arc::new(TokenIssuer::from_config(&config.security)?);
            let user = AuthService::new(repo, issuer, config.security.password_cost)
                .create_user(&username, &password)
                .await?;
            output_success(
                output_format,
                &format!("User '{}' created", username),
                Some(serde_json::json!({ "user": Value::Object(user) })),
            )
        }
    }
}

use serde_json::json;

use crate::auth::TokenIssuer;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// Signs a token offline with the configured secret; the user is not looked up.
pub fn handle(
    config: &AppConfig,
    user_id: i64,
    username: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let issuer = TokenIssuer::from_config(&config.security)?;
    let token = issuer.issue(user_id, username)?;
    match output_format {
        OutputFormat::Json => {
            let data = json!({ "access_token": token });
            output_success(output_format, "Token issued", Some(data))
        }
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}

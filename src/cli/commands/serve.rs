use anyhow::Context;
use tracing::info;

use crate::app::{app, AppState};
use crate::cli::utils::{repository, split_credentials};
use crate::config::AppConfig;

pub async fn handle(
    config: &AppConfig,
    port: Option<u16>,
    memory: bool,
    seed_user: Option<String>,
) -> anyhow::Result<()> {
    info!("Starting Content API in {:?} mode", config.environment);

    let repo = repository(config, memory).await?;
    let state = AppState::new(repo, config).context("cannot sign tokens; set JWT_SECRET")?;

    if let Some(raw) = seed_user.as_deref() {
        let (username, password) = split_credentials(raw)?;
        let user = state.auth.create_user(username, password).await?;
        info!(user_id = ?user.get("id"), username, "seeded user");
    }

    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Content API listening on http://{}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use sa_app::backend::{self, state::AppState};
use sa_app::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    tracing::debug!(?config, "Loaded configuration");

    let state = AppState::from_config(&config).await?;
    backend::run(config.port, Arc::new(state)).await
}

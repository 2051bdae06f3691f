use anyhow::Result;
use energy_audit_assistant::config::{self, AppConfig, DEFAULT_LOG_FILTER};
use energy_audit_assistant::server::{self, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = std::env::current_dir().ok().and_then(|dir| config::load_dotenv(&dir));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = AppConfig::from_env()?;
    for name in config.missing_settings() {
        warn!("{} is not set; the features that need it will fail or return placeholders", name);
    }

    let app = server::router(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        model = %config.llm_model,
        link_mode = ?config.search.link_mode,
        "Energy audit assistant running on http://{}",
        config.bind_addr
    );

    axum::serve(listener, app).await?;
    Ok(())
}

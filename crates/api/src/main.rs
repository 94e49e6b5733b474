use anyhow::{Context, Result};
use api::config::{AppConfig, ConfigSource, LogFormat};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = PathBuf::from(
        std::env::var("TRAIT_NER_CONFIG").unwrap_or_else(|_| "config.toml".to_string()),
    );
    let (config, source) = AppConfig::load(&config_path)?;

    init_tracing(config.log_format);

    if source == ConfigSource::Defaults {
        tracing::info!(config = %config_path.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        config = %config_path.display(),
        %source,
        vocabulary = %config.vocabulary.path.display(),
        tagger = config.tagger.enabled,
        "Starting trait NER service"
    );

    let state = Arc::new(api::AppState::from_config(&config)?);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!("Server listening on http://{}", config.server.bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,api=info,extract=info,ingest=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

use anyhow::Context;
use claim_verifier::api::{build_router, VerifyState};
use claim_verifier::config::{Config, LoggingConfig};
use claim_verifier::VerificationEngine;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_VAR: &str = "VERIFIER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.logging);

    let engine = VerificationEngine::from_config(&config)
        .context("Failed to build verification engine")?;
    let state = VerifyState {
        engine: Arc::new(engine),
    };
    let app = build_router(state, config.server.max_body_bytes);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Claim verifier listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// `$VERIFIER_CONFIG`, else `config.toml` when present, else environment only
fn load_config() -> anyhow::Result<Config> {
    let config = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => Config::from_file(&path).with_context(|| format!("Failed to load {}", path))?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::from_file(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_PATH))?,
        Err(_) => Config::from_env().context("Failed to load configuration")?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

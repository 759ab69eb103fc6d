//! The Overseer gateway binary: HTTP+WS surface over the pipeline state
//! machine, policy layer, Eye validators, event bus, and audit journal.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use clap::Parser;
use overseer_config::OverseerConfig;
use overseer_gateway::router;
use overseer_gateway::state::AppState;
use tracing_subscriber::EnvFilter;

/// The Overseer gateway.
#[derive(Parser)]
#[command(name = "overseer-gateway", author, version, about)]
struct Cli {
    /// Path to an optional `config.toml` overlay (§10.3).
    #[arg(long, env = "OVERSEER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = OverseerConfig::load(cli.config.as_deref())?;
    let bind_addr = config.bind_addr.clone();

    let state = AppState::new(config);
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "overseer gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

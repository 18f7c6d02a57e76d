//! pinpoint-server binary.
//!
//! Reads `pinpoint.toml` (or the path specified with `--config`) plus
//! `PINPOINT_*` environment variables, opens the configured report store, and
//! serves the tracking page and JSON API over HTTP.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use pinpoint_core::{memory::MemoryStore, store::ReportStore};
use pinpoint_server::{AppState, ServerConfig, StoreBackend};
use pinpoint_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pinpoint location tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pinpoint.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  match server_cfg.store.backend {
    StoreBackend::Memory => {
      tracing::warn!("using the in-memory store; reports are lost on exit");
      serve(Arc::new(MemoryStore::new()), server_cfg).await
    }
    StoreBackend::Sqlite => {
      let store_path = server_cfg.store.resolved_path();
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      tracing::info!(path = ?store_path, "opened SQLite store");
      serve(Arc::new(store), server_cfg).await
    }
  }
}

async fn serve<S>(store: Arc<S>, server_cfg: ServerConfig) -> anyhow::Result<()>
where
  S: ReportStore + 'static,
{
  let address = server_cfg.bind_address();
  let public_url = server_cfg.public_url();

  let app = pinpoint_server::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  tracing::info!("Tracking links will point at {public_url}/track/<token>");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .with_graceful_shutdown(shutdown_signal())
  .await
  .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

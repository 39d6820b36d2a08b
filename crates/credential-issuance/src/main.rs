//! Issuance server binary.
//!
//! Reads `issuance.toml` (or the path given with `--config`) plus
//! `CREDENTIALS_*` environment overrides, opens the SQLite store and serves
//! the issuance API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use credential_core::worker::WorkerId;
use credential_issuance::{AppState, SERVICE_NAME, config::IssuanceConfig};
use credential_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Credential issuance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "issuance.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = IssuanceConfig::load(&cli.config)
    .context("failed to load issuance configuration")?;

  if let Some(dir) = cfg
    .store_path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
  {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create data directory {dir:?}"))?;
  }

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let worker = WorkerId::resolve(cfg.worker_id.as_deref(), SERVICE_NAME);
  let cors = cfg
    .cors_layer()
    .with_context(|| format!("invalid allowed_origin {:?}", cfg.allowed_origin))?;

  let app = credential_issuance::router(AppState::new(store, worker.clone()))
    .layer(cors)
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!(%worker, "Issuance service listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

//! Verification server binary.
//!
//! Reads `verification.toml` (or the path given with `--config`) plus
//! `CREDENTIALS_*` environment overrides and serves the verification API,
//! answering from the configured issuance service.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use credential_core::worker::WorkerId;
use credential_verification::{
  AppState, SERVICE_NAME, client::IssuanceClient, config::VerificationConfig,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Credential verification server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "verification.toml")]
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

  let cfg = VerificationConfig::load(&cli.config)
    .context("failed to load verification configuration")?;

  let client = IssuanceClient::new(&cfg.issuance_api_url, cfg.lookup_timeout())
    .context("failed to build issuance client")?;

  let worker = WorkerId::resolve(cfg.worker_id.as_deref(), SERVICE_NAME);
  let cors = cfg
    .cors_layer()
    .with_context(|| format!("invalid allowed_origin {:?}", cfg.allowed_origin))?;

  let app = credential_verification::router(AppState::new(client, worker.clone()))
    .layer(cors)
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!(
    %worker,
    issuance = %cfg.issuance_api_url,
    "Verification service listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

//! `text-vault` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from the environment (and an optional `.env`).
//! 2. Initialise structured logging and, if configured, OTLP span export.
//! 3. Connect the document store (MongoDB or in-memory).
//! 4. Build the key deriver, cipher codec and document service.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod crypto;
mod server;
mod service;
mod store;
mod telemetry;

use anyhow::Result;
use tracing::info;

use config::Config;
use crypto::{CipherCodec, KeyDeriver};
use server::state::AppState;
use service::DocumentService;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        store_backend = ?cfg.store_backend,
        "text-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Document store
    // -----------------------------------------------------------------------
    let store = store::connect(&cfg).await?;

    // -----------------------------------------------------------------------
    // 4. Crypto core
    // -----------------------------------------------------------------------
    let codec = CipherCodec::new(KeyDeriver::new(cfg.secret_key.clone()));
    let documents = DocumentService::new(codec, store);

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(documents, cfg.allowed_origin()?);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

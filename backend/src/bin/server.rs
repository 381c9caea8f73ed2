//! Painel SAAR HTTP server.
//!
//! Binds immediately and loads the dataset snapshot in the background; data
//! endpoints answer `503 LOADING` until the first load completes.
//!
//! # Usage
//!
//! ```bash
//! # Serve CSV files from ./data (default)
//! cargo run --bin painel-server
//!
//! # Serve CSV files published on a static HTTP host
//! REPOSITORY_TYPE=http DATA_BASE_URL=https://dados.example.org/painel \
//!   cargo run --bin painel-server --features http-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`, `DATA_DIR`, `DATA_BASE_URL`, `STATE_NAME`: override `painel.toml`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use painel_saar::datasource::{PainelConfig, RepositoryFactory};
use painel_saar::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Painel SAAR HTTP Server");

    let config = PainelConfig::load().context("failed to load configuration")?;
    let repository = RepositoryFactory::create(&config).context("failed to create dataset source")?;
    info!("Dataset source: {}", repository.describe());

    let state = AppState::new(repository, config);

    let loader = state.clone();
    tokio::spawn(async move {
        match loader.reload().await {
            Ok(snapshot) => info!(
                "Snapshot ready: {} schools, loaded at {}",
                snapshot.data.directory.len(),
                snapshot.loaded_at
            ),
            Err(e) => error!("Initial snapshot load failed: {}", e),
        }
    });

    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", host, port))?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

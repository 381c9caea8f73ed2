//! Rebuild `indicadores.csv` from the raw datasets.
//!
//! Loads the configured dataset source, computes one indicator row per
//! school plus the municipality, regional and state rows, and writes the
//! table back to the source (or to `--out <path>`).
//!
//! ```bash
//! cargo run --bin build-indicators
//! cargo run --bin build-indicators -- --out /tmp/indicadores.csv
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};

use painel_saar::datasource::{load_snapshot, Dataset, PainelConfig, RepositoryFactory};
use painel_saar::services::{build_indicator_table, indicator_table_to_csv};

fn parse_args() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    let mut out = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" | "-o" => {
                let path = args.next().context("--out requires a path")?;
                out = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                println!("usage: build-indicators [--out <path>]");
                std::process::exit(0);
            }
            other => bail!("unexpected argument: {}", other),
        }
    }
    Ok(out)
}

#[cfg(feature = "http-server")]
fn init_logging() {
    use tracing::Level;
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();
}

#[cfg(not(feature = "http-server"))]
fn init_logging() {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let out = parse_args()?;

    let config = PainelConfig::load().context("failed to load configuration")?;
    let repository = RepositoryFactory::create(&config).context("failed to create dataset source")?;
    let snapshot = load_snapshot(repository.as_ref(), &config)
        .await
        .context("failed to load datasets")?;

    if snapshot.data.directory.is_empty() {
        bail!("{} has no schools; nothing to build", repository.describe());
    }

    let table = build_indicator_table(&snapshot.data);
    let csv = indicator_table_to_csv(&table);

    match out {
        Some(path) => {
            tokio::fs::write(&path, &csv)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Wrote {} indicator rows to {}", table.len(), path.display());
        }
        None => {
            repository
                .store_csv(Dataset::Indicators, &csv)
                .await
                .context("failed to store indicadores.csv")?;
            log::info!(
                "Wrote {} indicator rows to {} ({})",
                table.len(),
                Dataset::Indicators,
                repository.describe()
            );
        }
    }

    Ok(())
}

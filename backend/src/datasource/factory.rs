//! Repository factory.
//!
//! Creates the dataset source selected by configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::PainelConfig;
#[cfg(feature = "http-repo")]
use super::repositories::HttpRepository;
use super::repositories::{LocalRepository, MemoryRepository};
use super::repository::{DatasetRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Directory of CSV files
    Local,
    /// In-memory datasets
    Memory,
    /// Static HTTP server
    Http,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "dir" => Ok(Self::Local),
            "memory" | "mem" => Ok(Self::Memory),
            "http" | "https" => Ok(Self::Http),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Reads `REPOSITORY_TYPE`; defaults to HTTP when only `DATA_BASE_URL` is
    /// set, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATA_BASE_URL").is_ok() {
            Self::Http
        } else {
            Self::Local
        }
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create the repository described by `config`.
    pub fn create(config: &PainelConfig) -> RepositoryResult<Arc<dyn DatasetRepository>> {
        match config.repository_type()? {
            RepositoryType::Local => Ok(Self::create_local(&config.local.data_dir)),
            RepositoryType::Memory => Ok(Self::create_memory()),
            RepositoryType::Http => {
                #[cfg(feature = "http-repo")]
                {
                    let repo = HttpRepository::new(&config.http.base_url, config.http.timeout())?;
                    Ok(Arc::new(repo) as Arc<dyn DatasetRepository>)
                }
                #[cfg(not(feature = "http-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "HTTP repository feature not enabled",
                    ))
                }
            }
        }
    }

    pub fn create_local(root: impl AsRef<Path>) -> Arc<dyn DatasetRepository> {
        Arc::new(LocalRepository::new(root.as_ref()))
    }

    pub fn create_memory() -> Arc<dyn DatasetRepository> {
        Arc::new(MemoryRepository::new())
    }

    /// Load `painel.toml` (or defaults) with environment overrides and create
    /// the configured repository.
    pub fn from_env() -> RepositoryResult<(PainelConfig, Arc<dyn DatasetRepository>)> {
        let config = PainelConfig::load()?;
        let repo = Self::create(&config)?;
        log::info!("Dataset source: {}", repo.describe());
        Ok((config, repo))
    }

    pub fn from_config_file<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn DatasetRepository>> {
        let config = PainelConfig::from_file(path)?;
        Self::create(&config)
    }
}

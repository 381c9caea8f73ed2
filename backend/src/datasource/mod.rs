//! Dataset source layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / build-indicators binary                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  services.rs - snapshot loading                         │
//! │  - concurrent fetch of the six datasets                 │
//! │  - checksums and load report                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  DatasetRepository trait (repository/mod.rs)            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼────────────────┐
//!     │ local (disk)  │ memory (tests) │ http (http-repo)
//!     └───────────────┴────────────────┘
//! ```
//!
//! Use [`factory::RepositoryFactory`] to create the configured source and
//! [`services::load_snapshot`] to turn it into a [`DashboardSnapshot`].

#[cfg(not(any(feature = "local-repo", feature = "http-repo")))]
compile_error!("Enable at least one dataset source feature.");

pub mod checksum;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(test)]
mod services_tests;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::PainelConfig;
pub use repositories::{LocalRepository, MemoryRepository};
#[cfg(feature = "http-repo")]
pub use repositories::HttpRepository;
pub use repository::{
    Dataset, DatasetRepository, ErrorContext, RepositoryError, RepositoryResult,
};
pub use services::{load_dataset, load_snapshot, DashboardSnapshot, DatasetInfo};

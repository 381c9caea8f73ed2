//! Application state for the HTTP server.

use std::sync::Arc;

use parking_lot::RwLock;

use super::error::AppError;
use crate::datasource::{load_snapshot, DashboardSnapshot, DatasetRepository, PainelConfig, RepositoryResult};

/// Shared application state passed to all handlers.
///
/// Requests read an immutable snapshot; a reload builds a new one off to the
/// side and swaps the pointer, so in-flight requests keep the old data.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn DatasetRepository>,
    pub config: Arc<PainelConfig>,
    snapshot: Arc<RwLock<Option<Arc<DashboardSnapshot>>>>,
}

impl AppState {
    /// State with no snapshot yet; data endpoints answer `503 LOADING`.
    pub fn new(repository: Arc<dyn DatasetRepository>, config: PainelConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_snapshot(self, snapshot: DashboardSnapshot) -> Self {
        self.install(snapshot);
        self
    }

    pub fn install(&self, snapshot: DashboardSnapshot) -> Arc<DashboardSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.snapshot.write() = Some(snapshot.clone());
        snapshot
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Current snapshot, or [`AppError::Loading`].
    pub fn snapshot(&self) -> Result<Arc<DashboardSnapshot>, AppError> {
        self.snapshot.read().clone().ok_or(AppError::Loading)
    }

    /// Load a fresh snapshot from the repository and install it.
    pub async fn reload(&self) -> RepositoryResult<Arc<DashboardSnapshot>> {
        let snapshot = load_snapshot(self.repository.as_ref(), &self.config).await?;
        Ok(self.install(snapshot))
    }
}

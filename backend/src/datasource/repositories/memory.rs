//! In-memory dataset repository.
//!
//! Suitable for unit tests and fixtures: datasets are plain strings behind a
//! shared lock, so clones observe each other's writes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::datasource::repository::{
    Dataset, DatasetRepository, ErrorContext, RepositoryError, RepositoryResult,
};

#[derive(Debug, Clone)]
pub struct MemoryRepository {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Debug)]
struct MemoryData {
    datasets: HashMap<Dataset, String>,
    is_healthy: bool,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(MemoryData {
                datasets: HashMap::new(),
                is_healthy: true,
            })),
        }
    }

    /// Builder-style insert.
    pub fn with_dataset(self, dataset: Dataset, content: impl Into<String>) -> Self {
        self.insert(dataset, content);
        self
    }

    pub fn insert(&self, dataset: Dataset, content: impl Into<String>) {
        self.data.write().datasets.insert(dataset, content.into());
    }

    pub fn remove(&self, dataset: Dataset) -> Option<String> {
        self.data.write().datasets.remove(&dataset)
    }

    /// Simulate an unreachable source.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }
}

#[async_trait]
impl DatasetRepository for MemoryRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_csv(&self, dataset: Dataset) -> RepositoryResult<String> {
        let data = self.data.read();
        if !data.is_healthy {
            return Err(RepositoryError::connection_with_context(
                "memory repository marked unhealthy",
                ErrorContext::new("fetch_csv").with_dataset(dataset),
            ));
        }
        data.datasets.get(&dataset).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("{} not loaded", dataset),
                ErrorContext::new("fetch_csv").with_dataset(dataset),
            )
        })
    }

    async fn store_csv(&self, dataset: Dataset, content: &str) -> RepositoryResult<()> {
        self.insert(dataset, content);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} datasets)", self.data.read().datasets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_inserted_dataset() {
        let repo = MemoryRepository::new().with_dataset(Dataset::Schools, "id,nome\n");
        assert_eq!(repo.fetch_csv(Dataset::Schools).await.unwrap(), "id,nome\n");
        assert!(matches!(
            repo.fetch_csv(Dataset::Indicators).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unhealthy_fetch_is_retryable() {
        let repo = MemoryRepository::new().with_dataset(Dataset::Schools, "id\n");
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.fetch_csv(Dataset::Schools).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = MemoryRepository::new();
        let clone = repo.clone();
        clone.store_csv(Dataset::Indicators, "escola_id\n").await.unwrap();
        assert_eq!(repo.fetch_csv(Dataset::Indicators).await.unwrap(), "escola_id\n");
    }
}

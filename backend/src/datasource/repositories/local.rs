//! Directory-backed dataset repository.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::datasource::repository::{
    Dataset, DatasetRepository, ErrorContext, RepositoryError, RepositoryResult,
};

/// Reads each dataset from `<root>/<file_name>`.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.file_name())
    }
}

fn io_error(err: std::io::Error, operation: &str, dataset: Dataset, path: &Path) -> RepositoryError {
    let context = ErrorContext::new(operation)
        .with_dataset(dataset)
        .with_details(path.display().to_string());
    match err.kind() {
        ErrorKind::NotFound => RepositoryError::not_found_with_context(err.to_string(), context),
        _ => RepositoryError::internal_with_context(err.to_string(), context),
    }
}

#[async_trait]
impl DatasetRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(RepositoryError::internal(err.to_string()).with_operation("health_check")),
        }
    }

    async fn fetch_csv(&self, dataset: Dataset) -> RepositoryResult<String> {
        let path = self.path_of(dataset);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| io_error(err, "fetch_csv", dataset, &path))
    }

    async fn store_csv(&self, dataset: Dataset, content: &str) -> RepositoryResult<()> {
        let path = self.path_of(dataset);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| io_error(err, "store_csv", dataset, &self.root))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|err| io_error(err, "store_csv", dataset, &path))
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_and_writes_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        assert!(repo.health_check().await.unwrap());

        repo.store_csv(Dataset::Schools, "id,nome\n1,Alpha\n").await.unwrap();
        let text = repo.fetch_csv(Dataset::Schools).await.unwrap();
        assert_eq!(text, "id,nome\n1,Alpha\n");
        assert!(dir.path().join("escolas.csv").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let err = repo.fetch_csv(Dataset::Attendance).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(err.context().dataset.as_deref(), Some("frequencia.csv"));
    }

    #[tokio::test]
    async fn test_missing_root_is_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path().join("nope"));
        assert!(!repo.health_check().await.unwrap());
    }
}

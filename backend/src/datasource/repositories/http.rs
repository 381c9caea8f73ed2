//! Static-HTTP dataset repository.
//!
//! Fetches `<base_url>/<file_name>` with `reqwest`. Read-only.

use std::time::Duration;

use async_trait::async_trait;

use crate::datasource::repository::{
    Dataset, DatasetRepository, ErrorContext, RepositoryError, RepositoryResult,
};

#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RepositoryResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RepositoryError::configuration(
                "HTTP repository requires a base_url",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    pub fn url_of(&self, dataset: Dataset) -> String {
        format!("{}/{}", self.base_url, dataset.file_name())
    }
}

fn request_error(err: reqwest::Error, dataset: Dataset) -> RepositoryError {
    let context = ErrorContext::new("fetch_csv").with_dataset(dataset);
    if err.is_timeout() {
        RepositoryError::TimeoutError {
            message: err.to_string(),
            context: context.retryable(),
        }
    } else {
        RepositoryError::connection_with_context(err.to_string(), context)
    }
}

#[async_trait]
impl DatasetRepository for HttpRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let url = self.url_of(Dataset::Schools);
        match self.client.head(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(err) if err.is_connect() || err.is_timeout() => Ok(false),
            Err(err) => Err(RepositoryError::connection(err.to_string()).with_operation("health_check")),
        }
    }

    async fn fetch_csv(&self, dataset: Dataset) -> RepositoryResult<String> {
        let url = self.url_of(dataset);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(e, dataset))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RepositoryError::not_found_with_context(
                format!("{} returned 404", url),
                ErrorContext::new("fetch_csv").with_dataset(dataset),
            ));
        }
        if !status.is_success() {
            return Err(RepositoryError::connection_with_context(
                format!("{} returned {}", url, status),
                ErrorContext::new("fetch_csv").with_dataset(dataset),
            ));
        }
        response.text().await.map_err(|e| request_error(e, dataset))
    }

    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }
}

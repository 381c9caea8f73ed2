//! Snapshot loading.
//!
//! A [`DashboardSnapshot`] is the immutable unit every request reads from:
//! the decoded datasets, the calendar, and a per-dataset load report. A
//! dataset that cannot be fetched degrades to an empty record set, so a
//! partially available source still yields a (zero-valued) dashboard.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::checksum::calculate_checksum;
use super::repo_config::PainelConfig;
use super::repository::{Dataset, DatasetRepository, RepositoryResult};
use crate::models::SchoolCalendar;
use crate::parsing::{load_records, RecordSet};
use crate::services::{DashboardData, RecordSets};

/// Load report of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub dataset: Dataset,
    pub file_name: String,
    /// SHA-256 of the fetched text; absent when the fetch failed
    pub checksum: Option<String>,
    pub rows: usize,
    pub dropped_lines: Vec<usize>,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetch and parse one dataset. Fetch failures are logged and produce an
/// empty record set.
pub async fn load_dataset(
    repo: &dyn DatasetRepository,
    dataset: Dataset,
) -> (RecordSet, DatasetInfo) {
    match repo.fetch_csv(dataset).await {
        Ok(text) => {
            let records = load_records(&text);
            log::debug!(
                "Loaded {}: {} rows, {} dropped",
                dataset,
                records.len(),
                records.dropped_lines.len()
            );
            let info = DatasetInfo {
                dataset,
                file_name: dataset.file_name().to_string(),
                checksum: Some(calculate_checksum(&text)),
                rows: records.len(),
                dropped_lines: records.dropped_lines.clone(),
                loaded: true,
                error: None,
            };
            (records, info)
        }
        Err(err) => {
            log::warn!("Failed to fetch {}: {}", dataset, err);
            let info = DatasetInfo {
                dataset,
                file_name: dataset.file_name().to_string(),
                checksum: None,
                rows: 0,
                dropped_lines: Vec::new(),
                loaded: false,
                error: Some(err.to_string()),
            };
            (RecordSet::empty(), info)
        }
    }
}

/// Immutable, fully decoded state of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub data: DashboardData,
    pub calendar: SchoolCalendar,
    pub datasets: Vec<DatasetInfo>,
    pub loaded_at: DateTime<Utc>,
    pub source: String,
}

impl DashboardSnapshot {
    pub fn dataset(&self, dataset: Dataset) -> Option<&DatasetInfo> {
        self.datasets.iter().find(|info| info.dataset == dataset)
    }

    /// Whether every dataset was fetched.
    pub fn is_complete(&self) -> bool {
        self.datasets.iter().all(|info| info.loaded)
    }
}

/// Fetch the six datasets concurrently and decode them.
///
/// Only configuration problems (an invalid holiday list) fail the load;
/// unreachable datasets are reported in [`DashboardSnapshot::datasets`].
pub async fn load_snapshot(
    repo: &dyn DatasetRepository,
    config: &PainelConfig,
) -> RepositoryResult<DashboardSnapshot> {
    let calendar = config
        .calendar()
        .map_err(|e| e.with_operation("load_snapshot"))?;

    let loaded = join_all(Dataset::ALL.into_iter().map(|d| load_dataset(repo, d))).await;

    let mut sets = RecordSets::default();
    let mut datasets = Vec::with_capacity(loaded.len());
    for (records, info) in loaded {
        match info.dataset {
            Dataset::Schools => sets.schools = records,
            Dataset::ClassesTaught => sets.classes_taught = records,
            Dataset::Attendance => sets.attendance = records,
            Dataset::ManagementCycle => sets.management_cycle = records,
            Dataset::TechnicalVisits => sets.technical_visits = records,
            Dataset::Indicators => sets.indicators = records,
        }
        datasets.push(info);
    }

    let data = DashboardData::decode(&sets, &config.dashboard.state_name);
    let missing = datasets.iter().filter(|info| !info.loaded).count();
    log::info!(
        "Snapshot loaded from {}: {} schools, {}/{} datasets available",
        repo.describe(),
        data.directory.len(),
        datasets.len() - missing,
        datasets.len()
    );

    Ok(DashboardSnapshot {
        data,
        calendar,
        datasets,
        loaded_at: Utc::now(),
        source: repo.describe(),
    })
}

/// Whether the dataset source is reachable.
pub async fn health_check(repo: &dyn DatasetRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

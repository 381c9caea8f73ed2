//! Dataset repository trait.
//!
//! A repository serves the raw CSV text of each dataset. Decoding and
//! aggregation happen above this layer, so every backend only has to
//! move bytes.

pub mod error;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// The CSV files the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Schools,
    ClassesTaught,
    Attendance,
    ManagementCycle,
    TechnicalVisits,
    Indicators,
}

impl Dataset {
    pub const ALL: [Dataset; 6] = [
        Dataset::Schools,
        Dataset::ClassesTaught,
        Dataset::Attendance,
        Dataset::ManagementCycle,
        Dataset::TechnicalVisits,
        Dataset::Indicators,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Schools => "escolas.csv",
            Dataset::ClassesTaught => "aulas_dadas.csv",
            Dataset::Attendance => "frequencia.csv",
            Dataset::ManagementCycle => "ciclo_gestao.csv",
            Dataset::TechnicalVisits => "visitas_tecnicas.csv",
            Dataset::Indicators => "indicadores.csv",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    /// Accepts the file name with or without the `.csv` extension.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let stem = name.strip_suffix(".csv").unwrap_or(&name);
        Dataset::ALL
            .into_iter()
            .find(|d| d.file_name().trim_end_matches(".csv") == stem)
            .ok_or_else(|| format!("Unknown dataset: {}", s))
    }
}

/// Source of raw dataset CSV text.
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Whether the source is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Raw CSV text of one dataset.
    async fn fetch_csv(&self, dataset: Dataset) -> RepositoryResult<String>;

    /// Replace the content of one dataset. Read-only sources refuse.
    async fn store_csv(&self, dataset: Dataset, _content: &str) -> RepositoryResult<()> {
        Err(RepositoryError::configuration(format!(
            "{} is read-only, cannot store {}",
            self.describe(),
            dataset
        )))
    }

    /// Human-readable description for logs and the datasets endpoint.
    fn describe(&self) -> String;
}

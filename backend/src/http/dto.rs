//! Request and response bodies of the HTTP API.
//!
//! Aggregates are serialized straight from the service types; the DTOs here
//! only add request parsing and envelope fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::datasource::DatasetInfo;
use crate::models::{FilterContext, ReportingPeriod, SchoolId};
use crate::parsing::parse_date_strict;
use crate::services::directory::{MunicipalityConflict, MunicipalityEntry};
use crate::services::DashboardView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Dataset source reachability
    pub source: String,
    pub snapshot_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Reporting period as sent by clients: `dd/mm/yyyy` or `yyyy-mm-dd`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodDto {
    #[serde(default)]
    pub inicio: Option<String>,
    #[serde(default)]
    pub fim: Option<String>,
}

impl PeriodDto {
    pub fn to_period(&self) -> Result<ReportingPeriod, AppError> {
        let parse = |value: &Option<String>| -> Result<_, AppError> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => Ok(Some(parse_date_strict(text)?)),
            }
        };
        let period = ReportingPeriod {
            start: parse(&self.inicio)?,
            end: parse(&self.fim)?,
        };
        if let (Some(start), Some(end)) = (period.start, period.end) {
            if start > end {
                return Err(AppError::BadRequest(format!(
                    "period start {} is after end {}",
                    start, end
                )));
            }
        }
        Ok(period)
    }
}

/// Filter Context plus an optional reporting period.
///
/// The filter fields sit at the top level of the body, so a bare Filter
/// Context JSON is a valid request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    #[serde(flatten)]
    pub filter: FilterContext,
    #[serde(default)]
    pub periodo: Option<PeriodDto>,
}

impl DashboardRequest {
    pub fn period(&self) -> Result<ReportingPeriod, AppError> {
        self.periodo
            .as_ref()
            .map_or(Ok(ReportingPeriod::default()), PeriodDto::to_period)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    pub periodo: ReportingPeriod,
    /// School days in a bounded period under the configured calendar
    pub dias_letivos_previstos: Option<u32>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsResponse {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub complete: bool,
    pub datasets: Vec<DatasetInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptionsQuery {
    #[serde(default)]
    pub regional: Option<String>,
    #[serde(default)]
    pub municipio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolOption {
    pub id: SchoolId,
    pub nome: String,
    pub municipio: String,
    pub regional: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptionsResponse {
    pub estado: String,
    pub regionais: Vec<String>,
    pub municipios: Vec<MunicipalityEntry>,
    pub escolas: Vec<SchoolOption>,
    /// Municipalities the source lists under more than one regional
    pub inconsistencias: Vec<MunicipalityConflict>,
}

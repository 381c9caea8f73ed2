//! HTTP handlers for the REST API.
//!
//! Handlers grab the current snapshot once and run the aggregation on it;
//! nothing here mutates shared state except `reload`.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use super::dto::{
    DashboardRequest, DashboardResponse, DatasetsResponse, FilterOptionsQuery,
    FilterOptionsResponse, HealthResponse, SchoolOption,
};
use super::error::AppError;
use super::state::AppState;
use crate::datasource::services as source_services;
use crate::models::{FilterContext, NormalizedFilter, ReportingPeriod};
use crate::services::{
    AttendanceSummary, ClassesTaughtSummary, DashboardData, DomainView, ProductsSummary,
    ResolvedIndicator, TasksSummary, TechnicalVisitsSummary,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let source = match source_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "reachable".to_string(),
        Ok(false) => "unreachable".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let loaded_at = state.snapshot().ok().map(|s| s.loaded_at);

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source,
        snapshot_loaded: loaded_at.is_some(),
        loaded_at,
    }))
}

// =============================================================================
// Snapshot
// =============================================================================

/// GET /v1/datasets
pub async fn list_datasets(State(state): State<AppState>) -> HandlerResult<DatasetsResponse> {
    let snapshot = state.snapshot()?;
    Ok(Json(DatasetsResponse {
        source: snapshot.source.clone(),
        loaded_at: snapshot.loaded_at,
        complete: snapshot.is_complete(),
        datasets: snapshot.datasets.clone(),
    }))
}

/// POST /v1/reload
pub async fn reload(State(state): State<AppState>) -> HandlerResult<DatasetsResponse> {
    let snapshot = state.reload().await?;
    Ok(Json(DatasetsResponse {
        source: snapshot.source.clone(),
        loaded_at: snapshot.loaded_at,
        complete: snapshot.is_complete(),
        datasets: snapshot.datasets.clone(),
    }))
}

/// GET /v1/filters/options
///
/// `regional` and `municipio` narrow the municipality and school lists.
pub async fn filter_options(
    State(state): State<AppState>,
    Query(query): Query<FilterOptionsQuery>,
) -> HandlerResult<FilterOptionsResponse> {
    let snapshot = state.snapshot()?;
    let directory = &snapshot.data.directory;

    let mut context = FilterContext::state();
    if let Some(regional) = query.regional.as_deref() {
        context = context.with_regional(regional);
    }
    if let Some(municipio) = query.municipio.as_deref() {
        context = context.with_municipio(municipio);
    }
    let filter = context.normalize();

    let escolas = directory
        .schools_in(&filter)
        .into_iter()
        .map(|school| SchoolOption {
            id: school.id,
            nome: school.name.clone(),
            municipio: school.municipio.clone(),
            regional: school.regional.clone(),
        })
        .collect();

    Ok(Json(FilterOptionsResponse {
        estado: directory.state_name().to_string(),
        regionais: directory.regionals(),
        municipios: directory.municipalities(query.regional.as_deref()),
        escolas,
        inconsistencias: directory.inconsistencies().to_vec(),
    }))
}

// =============================================================================
// Aggregates
// =============================================================================

fn parse_request(request: &DashboardRequest) -> Result<(NormalizedFilter, ReportingPeriod), AppError> {
    Ok((request.filter.normalize(), request.period()?))
}

/// POST /v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<DashboardResponse> {
    let snapshot = state.snapshot()?;
    let (filter, period) = parse_request(&request)?;

    let view = snapshot.data.view(&filter, period);
    if !view.conflicts.is_empty() {
        log::debug!("Filter has {} conflicting selections", view.conflicts.len());
    }

    Ok(Json(DashboardResponse {
        view,
        periodo: period,
        dias_letivos_previstos: period.school_days(&snapshot.calendar),
        loaded_at: snapshot.loaded_at,
    }))
}

fn domain<S, F>(state: &AppState, request: &DashboardRequest, compute: F) -> HandlerResult<DomainView<S>>
where
    S: Serialize,
    F: FnOnce(&DashboardData, &NormalizedFilter, ReportingPeriod) -> DomainView<S>,
{
    let snapshot = state.snapshot()?;
    let (filter, period) = parse_request(request)?;
    Ok(Json(compute(&snapshot.data, &filter, period)))
}

/// POST /v1/aulas-dadas
pub async fn classes_taught(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<DomainView<ClassesTaughtSummary>> {
    domain(&state, &request, |data, filter, period| data.classes_taught(filter, period))
}

/// POST /v1/frequencia
pub async fn attendance(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<DomainView<AttendanceSummary>> {
    domain(&state, &request, |data, filter, period| data.attendance(filter, period))
}

/// POST /v1/tarefas
pub async fn tasks(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<DomainView<TasksSummary>> {
    domain(&state, &request, |data, filter, _| data.tasks(filter))
}

/// POST /v1/produtos
pub async fn products(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<DomainView<ProductsSummary>> {
    domain(&state, &request, |data, filter, _| data.products(filter))
}

/// POST /v1/visitas-tecnicas
pub async fn technical_visits(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<DomainView<TechnicalVisitsSummary>> {
    domain(&state, &request, |data, filter, _| data.technical_visits(filter))
}

/// POST /v1/indicadores
///
/// 404 when no precomputed indicator table was loaded.
pub async fn indicators(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> HandlerResult<ResolvedIndicator> {
    let snapshot = state.snapshot()?;
    let filter = request.filter.normalize();
    snapshot
        .data
        .resolve_indicators(&filter)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no precomputed indicator table loaded".to_string()))
}

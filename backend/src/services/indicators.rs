//! Indicator normalizer.
//!
//! Two paths produce the five headline percentages of an entity: composing
//! the domain aggregates on the fly, or looking up the precomputed indicator
//! table. [`build_indicator_table`] derives that table from raw rows so the
//! two paths can be cross-checked.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::attendance::{Attendance, AttendanceSummary, AttendanceTotals};
use super::classes_taught::{ClassesTaught, ClassesTaughtSummary, ClassesTaughtTotals};
use super::dashboard::DashboardData;
use super::directory::SchoolDirectory;
use super::hierarchy::{merge_all, totals_by_school, DomainAggregator, Folded};
use super::percent::round2;
use super::products::{ProductTotals, Products, ProductsSummary};
use super::tasks::{TaskTotals, Tasks, TasksSummary};
use super::technical_visits::{TechnicalVisitTotals, TechnicalVisits, TechnicalVisitsSummary};
use crate::models::{
    normalize_key, HierarchyKeys, HierarchyLevel, IndicatorRow, IndicatorValues,
    NormalizedFilter, ReportingPeriod, SchoolId,
};
use crate::parsing::format_line;
use crate::parsing::rows::columns;

/// Headline percentages of the five domain summaries.
pub fn compose(
    aulas_dadas: &ClassesTaughtSummary,
    frequencia: &AttendanceSummary,
    tarefas: &TasksSummary,
    produtos: &ProductsSummary,
    visitas_tecnicas: &TechnicalVisitsSummary,
) -> IndicatorValues {
    IndicatorValues {
        aulas_dadas: aulas_dadas.percentual,
        frequencia: frequencia.percentual,
        tarefas: tarefas.percentual_progresso,
        produtos: produtos.percentual_medio,
        visitas_tecnicas: visitas_tecnicas.rates.percentual_atas_assinadas,
    }
}

/// Which entity an indicator-table row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorRowKind {
    School(SchoolId),
    Municipality,
    Regional,
    State,
}

pub fn row_kind(row: &IndicatorRow) -> IndicatorRowKind {
    if let Some(id) = row.escola_id {
        IndicatorRowKind::School(id)
    } else if !row.municipio.trim().is_empty() {
        IndicatorRowKind::Municipality
    } else if !row.regional.trim().is_empty() {
        IndicatorRowKind::Regional
    } else {
        IndicatorRowKind::State
    }
}

/// Precomputed indicators resolved for a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIndicator {
    pub level: HierarchyLevel,
    pub label: String,
    /// Table rows averaged into `values`
    pub matched_rows: usize,
    pub values: IndicatorValues,
}

fn resolved(level: HierarchyLevel, matches: &[(&IndicatorRow, String)]) -> Option<ResolvedIndicator> {
    if matches.is_empty() {
        return None;
    }
    let values: Vec<IndicatorValues> = matches.iter().map(|(row, _)| row.values).collect();
    let labels: BTreeSet<&str> = matches.iter().map(|(_, label)| label.as_str()).collect();
    Some(ResolvedIndicator {
        level,
        label: labels.into_iter().collect::<Vec<_>>().join(", "),
        matched_rows: matches.len(),
        values: IndicatorValues::mean(&values),
    })
}

/// Resolve the precomputed record most specific to `filter`.
///
/// Precedence is school, municipality (consistent with any selected
/// regional), regional, then the state row. Several selected entities at the
/// same level are averaged. When the selected entities exist but the table
/// has no row for them, the next level up answers. A selection that matches
/// no listed school resolves to a zero record at the selected level, as the
/// composed aggregates do. `None` when the table is empty.
pub fn resolve(
    rows: &[IndicatorRow],
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
) -> Option<ResolvedIndicator> {
    if rows.is_empty() {
        return None;
    }
    let ids = directory.ids_matching(filter);
    if !directory.is_empty() && ids.is_empty() {
        let entity = directory.label_for(filter);
        return Some(ResolvedIndicator {
            level: entity.level,
            label: entity.label,
            matched_rows: 0,
            values: IndicatorValues::default(),
        });
    }

    if !filter.escolas.is_empty() {
        let matches: Vec<(&IndicatorRow, String)> = rows
            .iter()
            .filter(|row| match row_kind(row) {
                IndicatorRowKind::School(id) if directory.school(id).is_some() => ids.contains(&id),
                IndicatorRowKind::School(_) => filter.matches(&HierarchyKeys {
                    name: normalize_key(&row.escola_nome),
                    municipio: normalize_key(&row.municipio),
                    regional: normalize_key(&row.regional),
                }),
                _ => false,
            })
            .map(|row| (row, row.escola_nome.clone()))
            .collect();
        if let Some(found) = resolved(HierarchyLevel::Escola, &matches) {
            return Some(found);
        }
    }

    if !filter.municipios.is_empty() {
        let matches: Vec<(&IndicatorRow, String)> = rows
            .iter()
            .filter(|row| row_kind(row) == IndicatorRowKind::Municipality)
            .filter(|row| {
                filter.municipios.contains(&normalize_key(&row.municipio))
                    && (filter.regionals.is_empty()
                        || filter.regionals.contains(&normalize_key(&row.regional)))
            })
            .map(|row| (row, row.municipio.clone()))
            .collect();
        if let Some(found) = resolved(HierarchyLevel::Municipio, &matches) {
            return Some(found);
        }
    }

    if !filter.regionals.is_empty() {
        let matches: Vec<(&IndicatorRow, String)> = rows
            .iter()
            .filter(|row| row_kind(row) == IndicatorRowKind::Regional)
            .filter(|row| filter.regionals.contains(&normalize_key(&row.regional)))
            .map(|row| (row, row.regional.clone()))
            .collect();
        if let Some(found) = resolved(HierarchyLevel::Regional, &matches) {
            return Some(found);
        }
    }

    // Prefer the sentinel carrying the configured state name
    let state_key = normalize_key(directory.state_name());
    let states: Vec<&IndicatorRow> = rows
        .iter()
        .filter(|row| row_kind(row) == IndicatorRowKind::State)
        .collect();
    let state = states
        .iter()
        .find(|row| normalize_key(&row.escola_nome) == state_key)
        .or_else(|| states.first())
        .copied();
    state.and_then(|row| resolved(HierarchyLevel::Estado, &[(row, row.escola_nome.clone())]))
}

// =========================================================
// Indicator table builder
// =========================================================

fn derive_for<A: DomainAggregator>(
    aggregator: &A,
    per_school: &BTreeMap<SchoolId, Folded<A::Totals>>,
    ids: &[SchoolId],
) -> A::Summary {
    let merged = merge_all(aggregator, ids.iter().filter_map(|id| per_school.get(id)));
    aggregator.derive(&merged.totals)
}

/// Per-school totals of every domain, merged per entity on demand.
struct SchoolTotals {
    classes_aggregator: ClassesTaught,
    classes: BTreeMap<SchoolId, Folded<ClassesTaughtTotals>>,
    attendance: BTreeMap<SchoolId, Folded<AttendanceTotals>>,
    tasks: BTreeMap<SchoolId, Folded<TaskTotals>>,
    products: BTreeMap<SchoolId, Folded<ProductTotals>>,
    visits: BTreeMap<SchoolId, Folded<TechnicalVisitTotals>>,
}

impl SchoolTotals {
    fn new(data: &DashboardData) -> Self {
        let all = NormalizedFilter::default();
        let dir = &data.directory;
        let period = ReportingPeriod::default();
        let classes_aggregator = data.classes_taught_aggregator(period);
        Self {
            classes: totals_by_school(&classes_aggregator, &data.classes_taught, dir, &all),
            classes_aggregator,
            attendance: totals_by_school(&Attendance::new(period), &data.attendance, dir, &all),
            tasks: totals_by_school(&Tasks, &data.management_cycle, dir, &all),
            products: totals_by_school(&Products, &data.management_cycle, dir, &all),
            visits: totals_by_school(&TechnicalVisits, &data.technical_visits, dir, &all),
        }
    }

    fn values(&self, ids: &[SchoolId]) -> IndicatorValues {
        let values = compose(
            &derive_for(&self.classes_aggregator, &self.classes, ids),
            &derive_for(&Attendance::default(), &self.attendance, ids),
            &derive_for(&Tasks, &self.tasks, ids),
            &derive_for(&Products, &self.products, ids),
            &derive_for(&TechnicalVisits, &self.visits, ids),
        );
        IndicatorValues {
            aulas_dadas: round2(values.aulas_dadas),
            frequencia: round2(values.frequencia),
            tarefas: round2(values.tarefas),
            produtos: round2(values.produtos),
            visitas_tecnicas: round2(values.visitas_tecnicas),
        }
    }
}

/// Build the precomputed indicator table from raw rows: one row per school,
/// then one sentinel row per municipality, per regional, and for the state.
/// Values are rounded to two decimals.
pub fn build_indicator_table(data: &DashboardData) -> Vec<IndicatorRow> {
    let totals = SchoolTotals::new(data);
    let directory = &data.directory;

    let mut municipalities: BTreeMap<(String, String), (String, String, Vec<SchoolId>)> =
        BTreeMap::new();
    let mut regionals: BTreeMap<String, (String, Vec<SchoolId>)> = BTreeMap::new();
    let mut table = Vec::new();

    for school in directory.schools() {
        table.push(IndicatorRow {
            escola_id: Some(school.id),
            escola_nome: school.name.clone(),
            regional: school.regional.clone(),
            municipio: school.municipio.clone(),
            values: totals.values(&[school.id]),
        });
        municipalities
            .entry((school.keys.regional.clone(), school.keys.municipio.clone()))
            .or_insert_with(|| (school.regional.clone(), school.municipio.clone(), Vec::new()))
            .2
            .push(school.id);
        regionals
            .entry(school.keys.regional.clone())
            .or_insert_with(|| (school.regional.clone(), Vec::new()))
            .1
            .push(school.id);
    }

    for (regional, municipio, ids) in municipalities.into_values() {
        table.push(IndicatorRow {
            escola_id: None,
            escola_nome: municipio.clone(),
            regional,
            municipio,
            values: totals.values(&ids),
        });
    }

    for (regional, ids) in regionals.into_values() {
        table.push(IndicatorRow {
            escola_id: None,
            escola_nome: regional.clone(),
            regional,
            municipio: String::new(),
            values: totals.values(&ids),
        });
    }

    let all: Vec<SchoolId> = directory.schools().map(|s| s.id).collect();
    table.push(IndicatorRow {
        escola_id: None,
        escola_nome: directory.state_name().to_string(),
        regional: String::new(),
        municipio: String::new(),
        values: totals.values(&all),
    });

    log::info!("Built indicator table with {} rows", table.len());
    table
}

/// Serialize the indicator table with the published column layout.
pub fn indicator_table_to_csv(rows: &[IndicatorRow]) -> String {
    let mut out = format_line(columns::indicators::ALL);
    out.push('\n');
    for row in rows {
        let v = &row.values;
        let line = format_line(&[
            row.escola_id.map(|id| id.to_string()).unwrap_or_default(),
            row.escola_nome.clone(),
            row.regional.clone(),
            row.municipio.clone(),
            v.aulas_dadas.to_string(),
            v.frequencia.to_string(),
            v.tarefas.to_string(),
            v.produtos.to_string(),
            v.visitas_tecnicas.to_string(),
        ]);
        out.push_str(&line);
        out.push('\n');
    }
    out
}

//! Decoded datasets and the per-filter dashboard computation.
//!
//! [`DashboardData`] is an immutable snapshot of every dataset; a filter
//! change runs a fresh pass over it instead of mutating previous results.

use serde::{Deserialize, Serialize};

use super::attendance::{Attendance, AttendanceSummary};
use super::classes_taught::{ClassesTaught, ClassesTaughtSummary};
use super::directory::{FilterConflict, SchoolDirectory};
use super::hierarchy::{aggregate, aggregate_by_children, DomainAggregator};
use super::indicators::{compose, resolve, ResolvedIndicator};
use super::products::{Products, ProductsSummary};
use super::tasks::{Tasks, TasksSummary};
use super::technical_visits::{
    ManagementVisits, ManagementVisitsSummary, TechnicalVisits, TechnicalVisitsSummary,
};
use crate::models::{
    AggregateRecord, AttendanceRow, ClassesTaughtRow, EntityLabel, HierarchyLevel,
    IndicatorRow, IndicatorValues, ManagementCycleRow, NormalizedFilter, ReportingPeriod,
    TechnicalVisitRow,
};
use crate::parsing::{self, RecordSet};

/// Raw record sets of the six datasets.
#[derive(Debug, Clone, Default)]
pub struct RecordSets {
    pub schools: RecordSet,
    pub classes_taught: RecordSet,
    pub attendance: RecordSet,
    pub management_cycle: RecordSet,
    pub technical_visits: RecordSet,
    pub indicators: RecordSet,
}

/// Typed, immutable inputs of every aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub directory: SchoolDirectory,
    /// Subjects named by the classes-taught header
    pub subjects: Vec<String>,
    pub classes_taught: Vec<ClassesTaughtRow>,
    pub attendance: Vec<AttendanceRow>,
    pub management_cycle: Vec<ManagementCycleRow>,
    pub technical_visits: Vec<TechnicalVisitRow>,
    pub indicators: Vec<IndicatorRow>,
}

impl DashboardData {
    pub fn decode(sets: &RecordSets, state_name: &str) -> Self {
        let data = Self {
            directory: SchoolDirectory::new(parsing::schools_from_records(&sets.schools), state_name),
            subjects: parsing::subjects_in(&sets.classes_taught),
            classes_taught: parsing::classes_taught_from_records(&sets.classes_taught),
            attendance: parsing::attendance_from_records(&sets.attendance),
            management_cycle: parsing::management_cycle_from_records(&sets.management_cycle),
            technical_visits: parsing::technical_visits_from_records(&sets.technical_visits),
            indicators: parsing::indicators_from_records(&sets.indicators),
        };
        log::debug!(
            "Decoded datasets: {} schools, {} classes-taught, {} attendance, {} management-cycle, {} technical-visit, {} indicator rows",
            data.directory.len(),
            data.classes_taught.len(),
            data.attendance.len(),
            data.management_cycle.len(),
            data.technical_visits.len(),
            data.indicators.len()
        );
        data
    }

    pub fn classes_taught_aggregator(&self, period: ReportingPeriod) -> ClassesTaught {
        ClassesTaught::new(self.subjects.clone(), period)
    }

    pub fn classes_taught(
        &self,
        filter: &NormalizedFilter,
        period: ReportingPeriod,
    ) -> DomainView<ClassesTaughtSummary> {
        let aggregator = self.classes_taught_aggregator(period);
        domain_view(&aggregator, &self.classes_taught, &self.directory, filter)
    }

    pub fn attendance(
        &self,
        filter: &NormalizedFilter,
        period: ReportingPeriod,
    ) -> DomainView<AttendanceSummary> {
        domain_view(&Attendance::new(period), &self.attendance, &self.directory, filter)
    }

    pub fn tasks(&self, filter: &NormalizedFilter) -> DomainView<TasksSummary> {
        domain_view(&Tasks, &self.management_cycle, &self.directory, filter)
    }

    pub fn products(&self, filter: &NormalizedFilter) -> DomainView<ProductsSummary> {
        domain_view(&Products, &self.management_cycle, &self.directory, filter)
    }

    pub fn technical_visits(&self, filter: &NormalizedFilter) -> DomainView<TechnicalVisitsSummary> {
        domain_view(&TechnicalVisits, &self.technical_visits, &self.directory, filter)
    }

    pub fn management_visits(
        &self,
        filter: &NormalizedFilter,
    ) -> AggregateRecord<ManagementVisitsSummary> {
        aggregate(&ManagementVisits, &self.management_cycle, &self.directory, filter)
    }

    /// Precomputed indicator record most specific to the filter.
    pub fn resolve_indicators(&self, filter: &NormalizedFilter) -> Option<ResolvedIndicator> {
        resolve(&self.indicators, &self.directory, filter)
    }

    /// Every domain for one filter.
    pub fn view(&self, filter: &NormalizedFilter, period: ReportingPeriod) -> DashboardView {
        let aulas_dadas = self.classes_taught(filter, period);
        let frequencia = self.attendance(filter, period);
        let tarefas = self.tasks(filter);
        let produtos = self.products(filter);
        let visitas_tecnicas = self.technical_visits(filter);

        let indicators = compose(
            &aulas_dadas.aggregate.summary,
            &frequencia.aggregate.summary,
            &tarefas.aggregate.summary,
            &produtos.aggregate.summary,
            &visitas_tecnicas.aggregate.summary,
        );

        DashboardView {
            level: self.directory.level_of(filter),
            entity: self.directory.label_for(filter),
            matched_schools: aulas_dadas.aggregate.matched_schools,
            conflicts: self.directory.conflicts(filter),
            indicators,
            precomputed_indicators: self.resolve_indicators(filter),
            management_visits: self.management_visits(filter),
            aulas_dadas,
            frequencia,
            tarefas,
            produtos,
            visitas_tecnicas,
        }
    }
}

/// Aggregate at the filter level plus one aggregate per child entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainView<S> {
    pub aggregate: AggregateRecord<S>,
    pub children: Vec<AggregateRecord<S>>,
}

pub fn domain_view<A: DomainAggregator>(
    aggregator: &A,
    rows: &[A::Row],
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
) -> DomainView<A::Summary> {
    DomainView {
        aggregate: aggregate(aggregator, rows, directory, filter),
        children: aggregate_by_children(aggregator, rows, directory, filter),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub level: HierarchyLevel,
    pub entity: EntityLabel,
    pub matched_schools: usize,
    /// Contradictory selections; the filter still applies as a conjunction
    pub conflicts: Vec<FilterConflict>,
    pub aulas_dadas: DomainView<ClassesTaughtSummary>,
    pub frequencia: DomainView<AttendanceSummary>,
    pub tarefas: DomainView<TasksSummary>,
    pub produtos: DomainView<ProductsSummary>,
    pub visitas_tecnicas: DomainView<TechnicalVisitsSummary>,
    pub management_visits: AggregateRecord<ManagementVisitsSummary>,
    /// Headline percentages composed from the aggregates above
    pub indicators: IndicatorValues,
    pub precomputed_indicators: Option<ResolvedIndicator>,
}

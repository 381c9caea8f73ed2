//! Technical-visit indicator: signed visit minutes over expected visits.
//!
//! Each detail row is one expected visit. The `saar` cycle selector narrows
//! the rows to one cycle; the breakdown groups by cycle, then by stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::directory::SchoolDirectory;
use super::hierarchy::DomainAggregator;
use super::percent::percentage;
use crate::models::{
    ManagementCycleRow, NormalizedFilter, SchoolId, TechnicalVisitRow, VisitSummary,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitCounts {
    pub esperadas: u64,
    pub realizadas: u64,
    pub atas_assinadas: u64,
}

impl VisitCounts {
    fn add_row(&mut self, row: &TechnicalVisitRow) {
        self.esperadas += 1;
        if row.realizada {
            self.realizadas += 1;
        }
        if row.ata_assinada {
            self.atas_assinadas += 1;
        }
    }

    fn add(&mut self, other: &VisitCounts) {
        self.esperadas += other.esperadas;
        self.realizadas += other.realizadas;
        self.atas_assinadas += other.atas_assinadas;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleTotals {
    pub counts: VisitCounts,
    pub stages: BTreeMap<String, VisitCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnicalVisitTotals {
    pub counts: VisitCounts,
    pub cycles: BTreeMap<u8, CycleTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRates {
    pub visitas_esperadas: u64,
    pub visitas_realizadas: u64,
    pub atas_assinadas: u64,
    pub percentual_atas_assinadas: f64,
    pub percentual_pendentes: f64,
    pub percentual_realizadas: f64,
}

impl From<&VisitCounts> for VisitRates {
    fn from(counts: &VisitCounts) -> Self {
        let percentual_atas_assinadas = percentage(counts.atas_assinadas, counts.esperadas);
        VisitRates {
            visitas_esperadas: counts.esperadas,
            visitas_realizadas: counts.realizadas,
            atas_assinadas: counts.atas_assinadas,
            percentual_atas_assinadas,
            percentual_pendentes: if counts.esperadas == 0 {
                0.0
            } else {
                100.0 - percentual_atas_assinadas
            },
            percentual_realizadas: percentage(counts.realizadas, counts.esperadas),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub etapa: String,
    #[serde(flatten)]
    pub rates: VisitRates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub ciclo: u8,
    #[serde(flatten)]
    pub rates: VisitRates,
    pub por_etapa: Vec<StageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalVisitsSummary {
    #[serde(flatten)]
    pub rates: VisitRates,
    pub por_ciclo: Vec<CycleSummary>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalVisits;

impl DomainAggregator for TechnicalVisits {
    type Row = TechnicalVisitRow;
    type Totals = TechnicalVisitTotals;
    type Summary = TechnicalVisitsSummary;

    fn school_of(&self, row: &TechnicalVisitRow, directory: &SchoolDirectory) -> Option<SchoolId> {
        row.escola_id.filter(|id| directory.school(*id).is_some())
    }

    fn accepts(&self, row: &TechnicalVisitRow, filter: &NormalizedFilter) -> bool {
        filter.saar.map_or(true, |cycle| row.ciclo == cycle)
    }

    fn fold(&self, totals: &mut TechnicalVisitTotals, row: &TechnicalVisitRow, _school: SchoolId) {
        totals.counts.add_row(row);
        let cycle = totals.cycles.entry(row.ciclo).or_default();
        cycle.counts.add_row(row);
        cycle
            .stages
            .entry(row.etapa.clone())
            .or_default()
            .add_row(row);
    }

    fn merge(&self, totals: &mut TechnicalVisitTotals, other: &TechnicalVisitTotals) {
        totals.counts.add(&other.counts);
        for (ciclo, other_cycle) in &other.cycles {
            let cycle = totals.cycles.entry(*ciclo).or_default();
            cycle.counts.add(&other_cycle.counts);
            for (etapa, counts) in &other_cycle.stages {
                cycle.stages.entry(etapa.clone()).or_default().add(counts);
            }
        }
    }

    fn derive(&self, totals: &TechnicalVisitTotals) -> TechnicalVisitsSummary {
        TechnicalVisitsSummary {
            rates: VisitRates::from(&totals.counts),
            por_ciclo: totals
                .cycles
                .iter()
                .map(|(ciclo, cycle)| CycleSummary {
                    ciclo: *ciclo,
                    rates: VisitRates::from(&cycle.counts),
                    por_etapa: cycle
                        .stages
                        .iter()
                        .map(|(etapa, counts)| StageSummary {
                            etapa: etapa.clone(),
                            rates: VisitRates::from(counts),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// =========================================================
// Visit summary columns of the management-cycle dataset
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementVisitsSummary {
    pub total: u64,
    pub ciclo1: u64,
    pub ciclo2: u64,
    pub ciclo3: u64,
    pub esperadas: u64,
    pub atas_assinadas: u64,
    pub percentual_atas_assinadas: f64,
}

/// Secondary technical-visit view from the per-action-map summary columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagementVisits;

impl DomainAggregator for ManagementVisits {
    type Row = ManagementCycleRow;
    type Totals = VisitSummary;
    type Summary = ManagementVisitsSummary;

    fn school_of(&self, row: &ManagementCycleRow, directory: &SchoolDirectory) -> Option<SchoolId> {
        row.escola_id.filter(|id| directory.school(*id).is_some())
    }

    fn fold(&self, totals: &mut VisitSummary, row: &ManagementCycleRow, _school: SchoolId) {
        *totals += &row.visits;
    }

    fn merge(&self, totals: &mut VisitSummary, other: &VisitSummary) {
        *totals += other;
    }

    fn derive(&self, totals: &VisitSummary) -> ManagementVisitsSummary {
        ManagementVisitsSummary {
            total: totals.total,
            ciclo1: totals.ciclo1,
            ciclo2: totals.ciclo2,
            ciclo3: totals.ciclo3,
            esperadas: totals.esperadas,
            atas_assinadas: totals.atas_assinadas,
            percentual_atas_assinadas: percentage(totals.atas_assinadas, totals.esperadas),
        }
    }
}

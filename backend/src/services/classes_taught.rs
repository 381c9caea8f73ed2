//! Classes-taught indicator: classes given over classes expected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::directory::SchoolDirectory;
use super::hierarchy::DomainAggregator;
use super::percent::percentage;
use crate::models::{ClassesTaughtRow, NormalizedFilter, ReportingPeriod, SchoolId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectTotals {
    pub previstas: u64,
    pub dadas: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassesTaughtTotals {
    pub subjects: BTreeMap<String, SubjectTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub disciplina: String,
    pub aulas_previstas: u64,
    pub aulas_dadas: u64,
    pub percentual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassesTaughtSummary {
    pub aulas_previstas: u64,
    pub aulas_dadas: u64,
    /// Headline indicator (`indicador_aulas_dadas`)
    pub percentual: f64,
    pub por_disciplina: Vec<SubjectSummary>,
}

/// Aggregator over the classes-taught dataset.
#[derive(Debug, Clone, Default)]
pub struct ClassesTaught {
    /// Subjects listed in the dataset header, reported even with no rows
    pub subjects: Vec<String>,
    pub period: ReportingPeriod,
}

impl ClassesTaught {
    pub fn new(subjects: Vec<String>, period: ReportingPeriod) -> Self {
        Self { subjects, period }
    }
}

impl DomainAggregator for ClassesTaught {
    type Row = ClassesTaughtRow;
    type Totals = ClassesTaughtTotals;
    type Summary = ClassesTaughtSummary;

    fn school_of(&self, row: &ClassesTaughtRow, directory: &SchoolDirectory) -> Option<SchoolId> {
        row.escola_id
            .filter(|id| directory.school(*id).is_some())
    }

    fn accepts(&self, row: &ClassesTaughtRow, _filter: &NormalizedFilter) -> bool {
        self.period.contains(row.data)
    }

    fn fold(&self, totals: &mut ClassesTaughtTotals, row: &ClassesTaughtRow, _school: SchoolId) {
        for subject in &row.subjects {
            let entry = totals.subjects.entry(subject.subject.clone()).or_default();
            entry.previstas += u64::from(subject.previstas);
            entry.dadas += u64::from(subject.dadas);
        }
    }

    fn merge(&self, totals: &mut ClassesTaughtTotals, other: &ClassesTaughtTotals) {
        for (subject, counts) in &other.subjects {
            let entry = totals.subjects.entry(subject.clone()).or_default();
            entry.previstas += counts.previstas;
            entry.dadas += counts.dadas;
        }
    }

    fn derive(&self, totals: &ClassesTaughtTotals) -> ClassesTaughtSummary {
        // Header order first, then any subject only seen in rows
        let mut order: Vec<&str> = self.subjects.iter().map(String::as_str).collect();
        for subject in totals.subjects.keys() {
            if !order.contains(&subject.as_str()) {
                order.push(subject);
            }
        }

        let por_disciplina: Vec<SubjectSummary> = order
            .into_iter()
            .map(|subject| {
                let counts = totals.subjects.get(subject).copied().unwrap_or_default();
                SubjectSummary {
                    disciplina: subject.to_string(),
                    aulas_previstas: counts.previstas,
                    aulas_dadas: counts.dadas,
                    percentual: percentage(counts.dadas, counts.previstas),
                }
            })
            .collect();

        let aulas_previstas = por_disciplina.iter().map(|s| s.aulas_previstas).sum();
        let aulas_dadas = por_disciplina.iter().map(|s| s.aulas_dadas).sum();
        ClassesTaughtSummary {
            aulas_previstas,
            aulas_dadas,
            percentual: percentage(aulas_dadas, aulas_previstas),
            por_disciplina,
        }
    }
}

impl ClassesTaughtSummary {
    pub fn subject(&self, name: &str) -> Option<&SubjectSummary> {
        self.por_disciplina.iter().find(|s| s.disciplina == name)
    }
}

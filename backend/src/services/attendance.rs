//! Attendance indicator: present marks over all marks.
//!
//! The attendance file carries no school id, so rows join the directory on
//! the school-name key. Students are counted by (school, class, name).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::directory::SchoolDirectory;
use super::hierarchy::DomainAggregator;
use super::percent::percentage;
use crate::models::{
    normalize_key, AttendanceRow, AttendanceStatus, NormalizedFilter, ReportingPeriod, SchoolId,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTotals {
    /// Earliest calendar date seen for the school day
    pub data: Option<NaiveDate>,
    pub presencas: u64,
    pub registros: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceTotals {
    pub registros: u64,
    pub presencas: u64,
    pub faltas: u64,
    pub students: BTreeSet<(SchoolId, String, String)>,
    pub daily: BTreeMap<u32, DayTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAttendance {
    pub dia_letivo: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NaiveDate>,
    pub presencas: u64,
    pub registros: u64,
    pub percentual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub registros: u64,
    pub presencas: u64,
    pub faltas: u64,
    /// Headline indicator (`indicador_frequencia`)
    pub percentual: f64,
    pub alunos_unicos: usize,
    pub serie_diaria: Vec<DailyAttendance>,
}

#[derive(Debug, Clone, Default)]
pub struct Attendance {
    pub period: ReportingPeriod,
}

impl Attendance {
    pub fn new(period: ReportingPeriod) -> Self {
        Self { period }
    }
}

fn earliest(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

impl DomainAggregator for Attendance {
    type Row = AttendanceRow;
    type Totals = AttendanceTotals;
    type Summary = AttendanceSummary;

    fn school_of(&self, row: &AttendanceRow, directory: &SchoolDirectory) -> Option<SchoolId> {
        directory.id_for_name(&row.escola)
    }

    fn accepts(&self, row: &AttendanceRow, _filter: &NormalizedFilter) -> bool {
        self.period.contains(row.data)
    }

    fn fold(&self, totals: &mut AttendanceTotals, row: &AttendanceRow, school: SchoolId) {
        let present = row.status == AttendanceStatus::Present;
        totals.registros += 1;
        match row.status {
            AttendanceStatus::Present => totals.presencas += 1,
            AttendanceStatus::Absent => totals.faltas += 1,
            AttendanceStatus::Unknown => {}
        }
        totals
            .students
            .insert((school, normalize_key(&row.turma), normalize_key(&row.aluno)));

        let day = totals.daily.entry(row.dia_letivo).or_default();
        day.data = earliest(day.data, row.data);
        day.registros += 1;
        if present {
            day.presencas += 1;
        }
    }

    fn merge(&self, totals: &mut AttendanceTotals, other: &AttendanceTotals) {
        totals.registros += other.registros;
        totals.presencas += other.presencas;
        totals.faltas += other.faltas;
        totals.students.extend(other.students.iter().cloned());
        for (dia, other_day) in &other.daily {
            let day = totals.daily.entry(*dia).or_default();
            day.data = earliest(day.data, other_day.data);
            day.presencas += other_day.presencas;
            day.registros += other_day.registros;
        }
    }

    fn derive(&self, totals: &AttendanceTotals) -> AttendanceSummary {
        AttendanceSummary {
            registros: totals.registros,
            presencas: totals.presencas,
            faltas: totals.faltas,
            percentual: percentage(totals.presencas, totals.registros),
            alunos_unicos: totals.students.len(),
            serie_diaria: totals
                .daily
                .iter()
                .map(|(dia, day)| DailyAttendance {
                    dia_letivo: *dia,
                    data: day.data,
                    presencas: day.presencas,
                    registros: day.registros,
                    percentual: percentage(day.presencas, day.registros),
                })
                .collect(),
        }
    }
}

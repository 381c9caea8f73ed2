//! Task-progress indicator over the management-cycle dataset.

use serde::{Deserialize, Serialize};

use super::directory::SchoolDirectory;
use super::hierarchy::DomainAggregator;
use super::percent::percentage;
use crate::models::{ManagementCycleRow, SchoolId, TaskCounts};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksSummary {
    pub mapas_acao: u64,
    pub total: u64,
    pub previstas: u64,
    pub nao_iniciadas: u64,
    pub em_andamento: u64,
    pub atrasadas: u64,
    pub concluidas: u64,
    pub concluidas_atraso: u64,
    /// (concluídas + concluídas com atraso) / total
    pub percentual_progresso: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTotals {
    pub action_maps: u64,
    pub counts: TaskCounts,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tasks;

impl DomainAggregator for Tasks {
    type Row = ManagementCycleRow;
    type Totals = TaskTotals;
    type Summary = TasksSummary;

    fn school_of(&self, row: &ManagementCycleRow, directory: &SchoolDirectory) -> Option<SchoolId> {
        row.escola_id.filter(|id| directory.school(*id).is_some())
    }

    fn fold(&self, totals: &mut TaskTotals, row: &ManagementCycleRow, _school: SchoolId) {
        totals.action_maps += 1;
        totals.counts += &row.tasks;
    }

    fn merge(&self, totals: &mut TaskTotals, other: &TaskTotals) {
        totals.action_maps += other.action_maps;
        totals.counts += &other.counts;
    }

    fn derive(&self, totals: &TaskTotals) -> TasksSummary {
        let c = &totals.counts;
        TasksSummary {
            mapas_acao: totals.action_maps,
            total: c.total,
            previstas: c.previstas,
            nao_iniciadas: c.nao_iniciadas,
            em_andamento: c.em_andamento,
            atrasadas: c.atrasadas,
            concluidas: c.concluidas,
            concluidas_atraso: c.concluidas_atraso,
            percentual_progresso: percentage(c.concluidas + c.concluidas_atraso, c.total),
        }
    }
}

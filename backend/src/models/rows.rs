//! Typed domain rows, one variant per indicator dataset.
//!
//! Rows are produced by `crate::parsing::rows` from header-keyed records.
//! Counters are non-negative; blank or malformed cells decode to zero.

use std::ops::AddAssign;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::school::SchoolId;

// =========================================================
// Classes taught
// =========================================================

/// Expected vs. given classes of one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectClasses {
    pub subject: String,
    pub previstas: u32,
    pub dadas: u32,
}

/// One class/day line of the classes-taught dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassesTaughtRow {
    pub escola_id: Option<SchoolId>,
    pub escola_nome: String,
    pub regional: String,
    pub municipio: String,
    pub turma: String,
    pub data: Option<NaiveDate>,
    pub dia_letivo: u32,
    pub subjects: Vec<SubjectClasses>,
}

// =========================================================
// Attendance
// =========================================================

/// Value of the `Presença/Falta` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    /// Anything else; counted in the denominator only.
    Unknown,
}

impl AttendanceStatus {
    pub fn parse(cell: &str) -> Self {
        match cell.trim().to_lowercase().as_str() {
            "p" | "present" | "presente" | "presença" | "presenca" => AttendanceStatus::Present,
            "f" | "a" | "absent" | "falta" | "ausente" => AttendanceStatus::Absent,
            _ => AttendanceStatus::Unknown,
        }
    }
}

/// One student/day line of the attendance dataset.
///
/// The attendance file has no school id: the school is identified by name
/// and resolved through the directory's name index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub regional: String,
    pub municipio: String,
    pub escola: String,
    pub serie: String,
    pub turma: String,
    pub aluno: String,
    pub dias_do_mes: String,
    pub status: AttendanceStatus,
    pub data: Option<NaiveDate>,
    pub dia_letivo: u32,
}

// =========================================================
// Management cycle (tasks, products, visit summary)
// =========================================================

/// Task counters of one action map. Buckets are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: u64,
    pub previstas: u64,
    pub nao_iniciadas: u64,
    pub em_andamento: u64,
    pub atrasadas: u64,
    pub concluidas: u64,
    pub concluidas_atraso: u64,
}

impl AddAssign<&TaskCounts> for TaskCounts {
    fn add_assign(&mut self, other: &TaskCounts) {
        self.total += other.total;
        self.previstas += other.previstas;
        self.nao_iniciadas += other.nao_iniciadas;
        self.em_andamento += other.em_andamento;
        self.atrasadas += other.atrasadas;
        self.concluidas += other.concluidas;
        self.concluidas_atraso += other.concluidas_atraso;
    }
}

/// Technical-visit summary columns carried by the management-cycle file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSummary {
    pub total: u64,
    pub ciclo1: u64,
    pub ciclo2: u64,
    pub ciclo3: u64,
    pub esperadas: u64,
    pub atas_assinadas: u64,
}

impl AddAssign<&VisitSummary> for VisitSummary {
    fn add_assign(&mut self, other: &VisitSummary) {
        self.total += other.total;
        self.ciclo1 += other.ciclo1;
        self.ciclo2 += other.ciclo2;
        self.ciclo3 += other.ciclo3;
        self.esperadas += other.esperadas;
        self.atas_assinadas += other.atas_assinadas;
    }
}

/// Completion band of a product. Each band stands for a fixed midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductBand {
    #[serde(rename = "0-25")]
    UpTo25,
    #[serde(rename = "26-50")]
    From26To50,
    #[serde(rename = "51-75")]
    From51To75,
    #[serde(rename = "76-100")]
    From76To100,
}

impl ProductBand {
    pub const ALL: [ProductBand; 4] = [
        ProductBand::UpTo25,
        ProductBand::From26To50,
        ProductBand::From51To75,
        ProductBand::From76To100,
    ];

    /// Parse a band label. En/em dashes are accepted in place of the hyphen,
    /// and a trailing `%` or inner spaces are ignored.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .map(|c| match c {
                '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
                other => other,
            })
            .filter(|c| !c.is_whitespace() && *c != '%')
            .collect();

        match normalized.as_str() {
            "0-25" => Some(ProductBand::UpTo25),
            "26-50" => Some(ProductBand::From26To50),
            "51-75" => Some(ProductBand::From51To75),
            "76-100" => Some(ProductBand::From76To100),
            _ => None,
        }
    }

    pub fn midpoint(&self) -> f64 {
        match self {
            ProductBand::UpTo25 => 12.5,
            ProductBand::From26To50 => 38.0,
            ProductBand::From51To75 => 63.0,
            ProductBand::From76To100 => 88.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductBand::UpTo25 => "0-25",
            ProductBand::From26To50 => "26-50",
            ProductBand::From51To75 => "51-75",
            ProductBand::From76To100 => "76-100",
        }
    }
}

/// One action map of a school's management cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementCycleRow {
    pub escola_id: Option<SchoolId>,
    pub plano_acao_id: String,
    pub mapa_acao_id: String,
    pub tipo_mapa: String,
    pub problema: String,
    pub desafio: String,
    pub validado_tcgp: bool,
    /// Raw `produto_status` label
    pub produto_status: String,
    pub tasks: TaskCounts,
    pub visits: VisitSummary,
}

impl ManagementCycleRow {
    pub fn product_band(&self) -> Option<ProductBand> {
        ProductBand::parse(&self.produto_status)
    }
}

// =========================================================
// Technical visits
// =========================================================

/// One expected technical visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalVisitRow {
    pub escola_id: Option<SchoolId>,
    pub ciclo: u8,
    pub etapa: String,
    pub numero_visita: u32,
    pub tematica: String,
    pub realizada: bool,
    pub ata_assinada: bool,
    pub data_visita: Option<NaiveDate>,
    pub data_ata: Option<NaiveDate>,
}

// =========================================================
// Precomputed indicators
// =========================================================

/// The five headline percentages of one reporting entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValues {
    pub aulas_dadas: f64,
    pub frequencia: f64,
    pub tarefas: f64,
    pub produtos: f64,
    pub visitas_tecnicas: f64,
}

impl IndicatorValues {
    /// Arithmetic mean of each indicator across `values`. Zero for an empty slice.
    pub fn mean(values: &[IndicatorValues]) -> IndicatorValues {
        if values.is_empty() {
            return IndicatorValues::default();
        }
        let n = values.len() as f64;
        let sum = values.iter().fold(IndicatorValues::default(), |acc, v| IndicatorValues {
            aulas_dadas: acc.aulas_dadas + v.aulas_dadas,
            frequencia: acc.frequencia + v.frequencia,
            tarefas: acc.tarefas + v.tarefas,
            produtos: acc.produtos + v.produtos,
            visitas_tecnicas: acc.visitas_tecnicas + v.visitas_tecnicas,
        });
        IndicatorValues {
            aulas_dadas: sum.aulas_dadas / n,
            frequencia: sum.frequencia / n,
            tarefas: sum.tarefas / n,
            produtos: sum.produtos / n,
            visitas_tecnicas: sum.visitas_tecnicas / n,
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.aulas_dadas,
            self.frequencia,
            self.tarefas,
            self.produtos,
            self.visitas_tecnicas,
        ]
    }
}

/// One line of the precomputed indicator table.
///
/// School rows carry an id; municipality sentinels have no id; regional
/// sentinels have no municipality either; the state sentinel has every
/// hierarchy field empty and the state name in `escola_nome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub escola_id: Option<SchoolId>,
    pub escola_nome: String,
    pub regional: String,
    pub municipio: String,
    pub values: IndicatorValues,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_band_accepts_dash_variants() {
        assert_eq!(ProductBand::parse("0-25"), Some(ProductBand::UpTo25));
        assert_eq!(ProductBand::parse("26–50"), Some(ProductBand::From26To50));
        assert_eq!(ProductBand::parse("51 — 75 %"), Some(ProductBand::From51To75));
        assert_eq!(ProductBand::parse("76-100%"), Some(ProductBand::From76To100));
        assert_eq!(ProductBand::parse("concluído"), None);
        assert_eq!(ProductBand::parse(""), None);
    }

    #[test]
    fn test_product_band_midpoints() {
        let sum: f64 = ProductBand::ALL.iter().map(ProductBand::midpoint).sum();
        assert_eq!(sum, 201.5);
    }

    #[test]
    fn test_attendance_status_parse() {
        assert_eq!(AttendanceStatus::parse("P"), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::parse(" presença "), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::parse("F"), AttendanceStatus::Absent);
        assert_eq!(AttendanceStatus::parse("?"), AttendanceStatus::Unknown);
    }

    #[test]
    fn test_indicator_mean() {
        let a = IndicatorValues {
            aulas_dadas: 90.0,
            frequencia: 80.0,
            tarefas: 50.0,
            produtos: 38.0,
            visitas_tecnicas: 100.0,
        };
        let b = IndicatorValues {
            aulas_dadas: 70.0,
            frequencia: 60.0,
            tarefas: 0.0,
            produtos: 88.0,
            visitas_tecnicas: 0.0,
        };
        let mean = IndicatorValues::mean(&[a, b]);
        assert_eq!(mean.as_array(), [80.0, 70.0, 25.0, 63.0, 50.0]);
        assert_eq!(IndicatorValues::mean(&[]), IndicatorValues::default());
    }
}

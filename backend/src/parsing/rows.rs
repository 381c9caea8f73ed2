//! Typed decoding of record sets into domain rows.
//!
//! Every dataset keeps its own header convention: snake_case everywhere
//! except the attendance export, whose headers are accented Portuguese
//! labels (see [`columns::attendance`]).

use std::collections::BTreeMap;

use super::records::{Record, RecordSet};
use crate::models::calendar::parse_date;
use crate::models::{
    AttendanceRow, AttendanceStatus, ClassesTaughtRow, Coordinator, EducationLevels,
    IdebesTargets, IndicatorRow, IndicatorValues, ManagementCycleRow, School, SchoolCounts,
    SchoolId, SubjectClasses, TaskCounts, TechnicalVisitRow, VisitSummary,
};

/// Column names per dataset.
pub mod columns {
    pub mod schools {
        pub const ID: &str = "id";
        pub const NOME: &str = "nome";
        pub const MUNICIPIO: &str = "municipio";
        pub const REGIONAL: &str = "regional";
        pub const ENSINO_FUNDAMENTAL: &str = "ensino_fundamental";
        pub const ENSINO_MEDIO: &str = "ensino_medio";
        pub const TOTAL_ALUNOS: &str = "total_alunos";
        pub const TOTAL_PROFESSORES: &str = "total_professores";
        pub const TOTAL_PEDAGOGOS: &str = "total_pedagogos";
        pub const TOTAL_TURMAS: &str = "total_turmas";
        pub const TCGPS: &str = "tcgps";
        pub const NOME_TCGP: &str = "nome_tcgp";
        pub const EMAIL_TCGP: &str = "email_tcgp";
        pub const META_IDEBES_ALFA_2024: &str = "meta_idebes_alfa_2024";
        pub const IDEBES_ALFA_2024: &str = "idebes_alfa_2024";
        pub const META_IDEBES_ALFA_2025: &str = "meta_idebes_alfa_2025";
        pub const REQUIRED: &[&str] = &[ID, NOME, MUNICIPIO, REGIONAL];
    }

    pub mod classes_taught {
        pub const ESCOLA_ID: &str = "escola_id";
        pub const ESCOLA_NOME: &str = "escola_nome";
        pub const REGIONAL: &str = "regional";
        pub const MUNICIPIO: &str = "municipio";
        pub const TURMA: &str = "turma";
        pub const DATA: &str = "data";
        pub const DIA_LETIVO: &str = "dia_letivo";
        pub const PREVISTAS_PREFIX: &str = "aulas_previstas_";
        pub const DADAS_PREFIX: &str = "aulas_dadas_";
        pub const REQUIRED: &[&str] = &[ESCOLA_ID];
    }

    pub mod attendance {
        pub const REGIONAL: &str = "Regional";
        pub const MUNICIPIO: &str = "Município";
        pub const ESCOLA: &str = "Escola";
        pub const SERIE: &str = "Série";
        pub const TURMA: &str = "Turma";
        pub const ALUNO: &str = "Aluno";
        pub const DIAS_DO_MES: &str = "Dias do mês";
        pub const PRESENCA_FALTA: &str = "Presença/Falta";
        pub const DATA: &str = "Data";
        pub const DIA_LETIVO: &str = "Dia Letivo";
        pub const REQUIRED: &[&str] = &[ESCOLA, ALUNO, PRESENCA_FALTA];
    }

    pub mod management_cycle {
        pub const ESCOLA_ID: &str = "escola_id";
        pub const PLANO_ACAO_ID: &str = "plano_acao_id";
        pub const MAPA_ACAO_ID: &str = "mapa_acao_id";
        pub const TIPO_MAPA: &str = "tipo_mapa";
        pub const PROBLEMA: &str = "problema";
        pub const DESAFIO: &str = "desafio";
        pub const VALIDADO_TCGP: &str = "validado_tcgp";
        pub const PRODUTO_STATUS: &str = "produto_status";
        pub const TAREFAS_TOTAL: &str = "tarefas_total";
        pub const TAREFAS_PREVISTAS: &str = "tarefas_previstas";
        pub const TAREFAS_NAO_INICIADAS: &str = "tarefas_nao_iniciadas";
        pub const TAREFAS_EM_ANDAMENTO: &str = "tarefas_em_andamento";
        pub const TAREFAS_ATRASADAS: &str = "tarefas_atrasadas";
        pub const TAREFAS_CONCLUIDAS: &str = "tarefas_concluidas";
        pub const TAREFAS_CONCLUIDAS_ATRASO: &str = "tarefas_concluidas_atraso";
        pub const VISITAS_TOTAL: &str = "visitas_tecnicas_total";
        pub const VISITAS_CICLO1: &str = "visitas_tecnicas_ciclo1";
        pub const VISITAS_CICLO2: &str = "visitas_tecnicas_ciclo2";
        pub const VISITAS_CICLO3: &str = "visitas_tecnicas_ciclo3";
        pub const VISITAS_ESPERADAS: &str = "visitas_tecnicas_esperadas";
        pub const VISITAS_ATAS_ASSINADAS: &str = "visitas_tecnicas_atas_assinadas";
        pub const REQUIRED: &[&str] = &[ESCOLA_ID, TAREFAS_TOTAL];
    }

    pub mod technical_visits {
        pub const ESCOLA_ID: &str = "escola_id";
        pub const CICLO: &str = "ciclo";
        pub const ETAPA: &str = "etapa";
        pub const NUMERO_VISITA: &str = "numero_visita";
        pub const TEMATICA: &str = "tematica";
        pub const REALIZADA: &str = "realizada";
        pub const ATA_ASSINADA: &str = "ata_assinada";
        pub const DATA_VISITA: &str = "data_visita";
        pub const DATA_ATA: &str = "data_ata";
        pub const REQUIRED: &[&str] = &[ESCOLA_ID, CICLO, ATA_ASSINADA];
    }

    pub mod indicators {
        pub const ESCOLA_ID: &str = "escola_id";
        pub const ESCOLA_NOME: &str = "escola_nome";
        pub const REGIONAL: &str = "regional";
        pub const MUNICIPIO: &str = "municipio";
        pub const AULAS_DADAS: &str = "indicador_aulas_dadas";
        pub const FREQUENCIA: &str = "indicador_frequencia";
        pub const TAREFAS: &str = "indicador_tarefas";
        pub const PRODUTOS: &str = "indicador_produtos";
        pub const VISITAS_TECNICAS: &str = "indicador_visitas_tecnicas";
        pub const ALL: &[&str] = &[
            ESCOLA_ID,
            ESCOLA_NOME,
            REGIONAL,
            MUNICIPIO,
            AULAS_DADAS,
            FREQUENCIA,
            TAREFAS,
            PRODUTOS,
            VISITAS_TECNICAS,
        ];
    }
}

fn warn_missing(set: &RecordSet, dataset: &str, required: &[&str]) {
    if set.is_empty() {
        return;
    }
    let missing = set.missing_columns(required);
    if !missing.is_empty() {
        log::warn!("{} dataset is missing column(s) {:?}", dataset, missing);
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn small_count(record: &Record, column: &str) -> u32 {
    u32::try_from(record.count(column)).unwrap_or(u32::MAX)
}

// =========================================================
// Schools
// =========================================================

fn school_from_record(record: &Record) -> Option<School> {
    use columns::schools::*;

    let id = SchoolId::parse_cell(record.get(ID))?;

    let coordinator_name = record.get(NOME_TCGP).trim();
    let coordinator = if coordinator_name.is_empty() {
        None
    } else {
        Some(Coordinator {
            name: collapse_whitespace(coordinator_name),
            email: record.get(EMAIL_TCGP).trim().to_lowercase(),
        })
    };

    let grades: BTreeMap<String, u32> = record
        .columns()
        .filter(|c| c.starts_with("alunos_") || c.starts_with("turmas_"))
        .map(|c| (c.to_string(), small_count(record, c)))
        .collect();

    Some(
        School {
            id,
            name: collapse_whitespace(record.get(NOME)),
            municipio: collapse_whitespace(record.get(MUNICIPIO)),
            regional: collapse_whitespace(record.get(REGIONAL)),
            levels: EducationLevels {
                ensino_fundamental: record.flag(ENSINO_FUNDAMENTAL),
                ensino_medio: record.flag(ENSINO_MEDIO),
            },
            counts: SchoolCounts {
                total_alunos: small_count(record, TOTAL_ALUNOS),
                total_professores: small_count(record, TOTAL_PROFESSORES),
                total_pedagogos: small_count(record, TOTAL_PEDAGOGOS),
                total_turmas: small_count(record, TOTAL_TURMAS),
            },
            tcgps: small_count(record, TCGPS),
            coordinator,
            idebes: IdebesTargets {
                meta_alfa_2024: record.number(META_IDEBES_ALFA_2024),
                alfa_2024: record.number(IDEBES_ALFA_2024),
                meta_alfa_2025: record.number(META_IDEBES_ALFA_2025),
            },
            grades,
            keys: Default::default(),
        }
        .with_keys(),
    )
}

/// Decode the school directory. Rows without a numeric id are skipped.
pub fn schools_from_records(set: &RecordSet) -> Vec<School> {
    warn_missing(set, "schools", columns::schools::REQUIRED);
    let schools: Vec<School> = set.iter().filter_map(school_from_record).collect();
    if schools.len() < set.len() {
        log::warn!(
            "Skipped {} school row(s) without a numeric id",
            set.len() - schools.len()
        );
    }
    schools
}

// =========================================================
// Classes taught
// =========================================================

/// Subjects named by `aulas_previstas_<Subject>` headers, in header order.
pub fn subjects_in(set: &RecordSet) -> Vec<String> {
    use columns::classes_taught::PREVISTAS_PREFIX;
    set.headers
        .iter()
        .filter_map(|h| h.strip_prefix(PREVISTAS_PREFIX))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn classes_taught_from_records(set: &RecordSet) -> Vec<ClassesTaughtRow> {
    use columns::classes_taught::*;
    warn_missing(set, "classes-taught", REQUIRED);

    let subjects = subjects_in(set);
    let column_pairs: Vec<(String, String, String)> = subjects
        .iter()
        .map(|s| {
            (
                s.clone(),
                format!("{}{}", PREVISTAS_PREFIX, s),
                format!("{}{}", DADAS_PREFIX, s),
            )
        })
        .collect();

    set.iter()
        .map(|record| ClassesTaughtRow {
            escola_id: SchoolId::parse_cell(record.get(ESCOLA_ID)),
            escola_nome: collapse_whitespace(record.get(ESCOLA_NOME)),
            regional: collapse_whitespace(record.get(REGIONAL)),
            municipio: collapse_whitespace(record.get(MUNICIPIO)),
            turma: record.text(TURMA),
            data: parse_date(record.get(DATA)),
            dia_letivo: small_count(record, DIA_LETIVO),
            subjects: column_pairs
                .iter()
                .map(|(subject, previstas, dadas)| SubjectClasses {
                    subject: subject.clone(),
                    previstas: small_count(record, previstas),
                    dadas: small_count(record, dadas),
                })
                .collect(),
        })
        .collect()
}

// =========================================================
// Attendance
// =========================================================

pub fn attendance_from_records(set: &RecordSet) -> Vec<AttendanceRow> {
    use columns::attendance::*;
    warn_missing(set, "attendance", REQUIRED);

    set.iter()
        .map(|record| AttendanceRow {
            regional: collapse_whitespace(record.get(REGIONAL)),
            municipio: collapse_whitespace(record.get(MUNICIPIO)),
            escola: collapse_whitespace(record.get(ESCOLA)),
            serie: record.text(SERIE),
            turma: record.text(TURMA),
            aluno: collapse_whitespace(record.get(ALUNO)),
            dias_do_mes: record.text(DIAS_DO_MES),
            status: AttendanceStatus::parse(record.get(PRESENCA_FALTA)),
            data: parse_date(record.get(DATA)),
            dia_letivo: small_count(record, DIA_LETIVO),
        })
        .collect()
}

// =========================================================
// Management cycle
// =========================================================

pub fn management_cycle_from_records(set: &RecordSet) -> Vec<ManagementCycleRow> {
    use columns::management_cycle::*;
    warn_missing(set, "management-cycle", REQUIRED);

    set.iter()
        .map(|record| ManagementCycleRow {
            escola_id: SchoolId::parse_cell(record.get(ESCOLA_ID)),
            plano_acao_id: record.text(PLANO_ACAO_ID),
            mapa_acao_id: record.text(MAPA_ACAO_ID),
            tipo_mapa: record.text(TIPO_MAPA),
            problema: record.text(PROBLEMA),
            desafio: record.text(DESAFIO),
            validado_tcgp: record.flag(VALIDADO_TCGP),
            produto_status: record.text(PRODUTO_STATUS),
            tasks: TaskCounts {
                total: record.count(TAREFAS_TOTAL),
                previstas: record.count(TAREFAS_PREVISTAS),
                nao_iniciadas: record.count(TAREFAS_NAO_INICIADAS),
                em_andamento: record.count(TAREFAS_EM_ANDAMENTO),
                atrasadas: record.count(TAREFAS_ATRASADAS),
                concluidas: record.count(TAREFAS_CONCLUIDAS),
                concluidas_atraso: record.count(TAREFAS_CONCLUIDAS_ATRASO),
            },
            visits: VisitSummary {
                total: record.count(VISITAS_TOTAL),
                ciclo1: record.count(VISITAS_CICLO1),
                ciclo2: record.count(VISITAS_CICLO2),
                ciclo3: record.count(VISITAS_CICLO3),
                esperadas: record.count(VISITAS_ESPERADAS),
                atas_assinadas: record.count(VISITAS_ATAS_ASSINADAS),
            },
        })
        .collect()
}

// =========================================================
// Technical visits
// =========================================================

pub fn technical_visits_from_records(set: &RecordSet) -> Vec<TechnicalVisitRow> {
    use columns::technical_visits::*;
    warn_missing(set, "technical-visits", REQUIRED);

    set.iter()
        .map(|record| TechnicalVisitRow {
            escola_id: SchoolId::parse_cell(record.get(ESCOLA_ID)),
            ciclo: u8::try_from(record.count(CICLO)).unwrap_or(0),
            etapa: collapse_whitespace(record.get(ETAPA)),
            numero_visita: small_count(record, NUMERO_VISITA),
            tematica: record.text(TEMATICA),
            realizada: record.flag(REALIZADA),
            ata_assinada: record.flag(ATA_ASSINADA),
            data_visita: parse_date(record.get(DATA_VISITA)),
            data_ata: parse_date(record.get(DATA_ATA)),
        })
        .collect()
}

// =========================================================
// Precomputed indicators
// =========================================================

pub fn indicators_from_records(set: &RecordSet) -> Vec<IndicatorRow> {
    use columns::indicators::*;
    warn_missing(set, "indicators", ALL);

    let percent = |record: &Record, column: &str| record.number(column).unwrap_or(0.0);

    set.iter()
        .map(|record| IndicatorRow {
            escola_id: SchoolId::parse_cell(record.get(ESCOLA_ID)),
            escola_nome: collapse_whitespace(record.get(ESCOLA_NOME)),
            regional: collapse_whitespace(record.get(REGIONAL)),
            municipio: collapse_whitespace(record.get(MUNICIPIO)),
            values: IndicatorValues {
                aulas_dadas: percent(record, AULAS_DADAS),
                frequencia: percent(record, FREQUENCIA),
                tarefas: percent(record, TAREFAS),
                produtos: percent(record, PRODUTOS),
                visitas_tecnicas: percent(record, VISITAS_TECNICAS),
            },
        })
        .collect()
}

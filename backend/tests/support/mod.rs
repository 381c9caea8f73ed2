//! Shared fixtures for integration tests.
//!
//! Four schools in two regionals. Expected values quoted in the tests are
//! computed by hand from the CSV text below.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use painel_saar::datasource::{Dataset, MemoryRepository};
use painel_saar::parsing::load_records;
use painel_saar::services::{DashboardData, RecordSets};

pub const STATE: &str = "Espírito Santo";

pub const SCHOOLS: &str = "\
id,nome,municipio,regional,nome_tcgp,email_tcgp
1,EEEFM Alpha,Serra,Carapina,Rita,rita@sedu.es.gov.br
2,EEEFM Beta,Serra,Carapina,Rita,rita@sedu.es.gov.br
3,EEEF Gama,Vitória,Carapina,,
4,EEEM Delta,Colatina,Colatina,Otávio,otavio@sedu.es.gov.br
";

pub const CLASSES_TAUGHT: &str = "\
escola_id,turma,data,dia_letivo,aulas_previstas_LP,aulas_dadas_LP,aulas_previstas_MAT,aulas_dadas_MAT
1,1A,03/03/2025,1,2,2,2,1
1,1A,04/03/2025,2,2,1,2,2
2,1A,03/03/2025,1,4,4,0,0
3,1A,03/03/2025,1,5,1,5,5
4,1A,10/03/2025,6,8,6,2,2
";

pub const ATTENDANCE: &str = "\
Regional,Município,Escola,Série,Turma,Aluno,Dias do mês,Presença/Falta,Data,Dia Letivo
Carapina,Serra,EEEFM Alpha,1º,1A,Ana,03,P,03/03/2025,1
Carapina,Serra,EEEFM Alpha,1º,1A,Ana,04,F,04/03/2025,2
Carapina,Serra,EEEFM Alpha,1º,1A,Bia,03,P,03/03/2025,1
Carapina,Serra,EEEFM Alpha,1º,1A,Bia,04,P,04/03/2025,2
Carapina,Serra,EEEFM Beta,1º,1A,Bruno,03,P,03/03/2025,1
Carapina,Serra,Escola Fantasma,1º,1A,Zé,03,F,03/03/2025,1
Colatina,Colatina,EEEM Delta,1º,1A,Caio,10,F,10/03/2025,6
";

pub const MANAGEMENT_CYCLE: &str = "\
escola_id,produto_status,tarefas_total,tarefas_concluidas,tarefas_concluidas_atraso,visitas_tecnicas_esperadas,visitas_tecnicas_atas_assinadas
1,0-25,10,3,1,4,2
2,76-100,4,4,0,4,4
3,26-50,0,0,0,4,0
4,51-75,6,2,1,4,3
";

pub const TECHNICAL_VISITS: &str = "\
escola_id,ciclo,etapa,numero_visita,tematica,realizada,ata_assinada,data_visita,data_ata
1,1,Diagnóstico,1,,true,true,,
1,1,Diagnóstico,2,,true,false,,
2,1,Diagnóstico,1,,true,true,,
3,2,Monitoramento,1,,false,false,,
4,1,Diagnóstico,1,,true,true,,
";

/// Raw datasets keyed by dataset, indicators excluded.
pub fn raw_datasets() -> Vec<(Dataset, &'static str)> {
    vec![
        (Dataset::Schools, SCHOOLS),
        (Dataset::ClassesTaught, CLASSES_TAUGHT),
        (Dataset::Attendance, ATTENDANCE),
        (Dataset::ManagementCycle, MANAGEMENT_CYCLE),
        (Dataset::TechnicalVisits, TECHNICAL_VISITS),
    ]
}

pub fn record_sets() -> RecordSets {
    RecordSets {
        schools: load_records(SCHOOLS),
        classes_taught: load_records(CLASSES_TAUGHT),
        attendance: load_records(ATTENDANCE),
        management_cycle: load_records(MANAGEMENT_CYCLE),
        technical_visits: load_records(TECHNICAL_VISITS),
        indicators: Default::default(),
    }
}

pub fn dashboard_data() -> DashboardData {
    DashboardData::decode(&record_sets(), STATE)
}

pub fn memory_repository() -> MemoryRepository {
    raw_datasets()
        .into_iter()
        .fold(MemoryRepository::new(), |repo, (dataset, text)| repo.with_dataset(dataset, text))
}

pub fn write_fixture_dir(dir: &Path) {
    for (dataset, text) in raw_datasets() {
        std::fs::write(dir.join(dataset.file_name()), text).expect("write fixture");
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

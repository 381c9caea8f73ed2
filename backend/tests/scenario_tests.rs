//! End-to-end aggregation scenarios over the shared fixtures.

mod support;

use chrono::NaiveDate;

use painel_saar::models::{FilterContext, HierarchyLevel, ReportingPeriod, SchoolId};
use painel_saar::services::DashboardView;
use support::{assert_close, dashboard_data};

fn view(context: FilterContext) -> DashboardView {
    dashboard_data().view(&context.normalize(), ReportingPeriod::default())
}

#[test]
fn test_state_view() {
    let view = view(FilterContext::state());
    assert_eq!(view.level, HierarchyLevel::Estado);
    assert_eq!(view.entity.label, "Espírito Santo");
    assert_eq!(view.matched_schools, 4);
    assert!(view.conflicts.is_empty());

    let aulas = &view.aulas_dadas.aggregate.summary;
    assert_eq!((aulas.aulas_previstas, aulas.aulas_dadas), (32, 24));
    assert_close(aulas.percentual, 75.0);
    assert_close(aulas.subject("LP").unwrap().percentual, 14.0 / 21.0 * 100.0);
    assert_close(aulas.subject("MAT").unwrap().percentual, 10.0 / 11.0 * 100.0);

    let frequencia = &view.frequencia.aggregate.summary;
    // The unknown school's row is excluded everywhere
    assert_eq!((frequencia.registros, frequencia.presencas, frequencia.faltas), (6, 4, 2));
    assert_eq!(frequencia.alunos_unicos, 4);
    assert_close(frequencia.percentual, 4.0 / 6.0 * 100.0);

    assert_eq!(view.tarefas.aggregate.summary.total, 20);
    assert_close(view.tarefas.aggregate.summary.percentual_progresso, 55.0);

    assert_eq!(view.produtos.aggregate.summary.produtos, 4);
    assert_close(view.produtos.aggregate.summary.percentual_medio, 50.0);

    let visitas = &view.visitas_tecnicas.aggregate.summary.rates;
    assert_eq!((visitas.visitas_esperadas, visitas.atas_assinadas), (5, 3));
    assert_close(visitas.percentual_atas_assinadas, 60.0);
    assert_close(visitas.percentual_pendentes, 40.0);
    assert_close(visitas.percentual_realizadas, 80.0);

    assert_eq!(view.management_visits.summary.esperadas, 16);
    assert_close(view.management_visits.summary.percentual_atas_assinadas, 56.25);

    assert_close(view.indicators.aulas_dadas, 75.0);
    assert_close(view.indicators.tarefas, 55.0);
    assert_close(view.indicators.produtos, 50.0);
    assert_close(view.indicators.visitas_tecnicas, 60.0);
}

#[test]
fn test_municipality_view_and_children() {
    let view = view(FilterContext::state().with_municipio("  serra "));
    assert_eq!(view.level, HierarchyLevel::Municipio);
    assert_eq!(view.entity.label, "Serra");
    assert_eq!(view.matched_schools, 2);

    assert_close(view.aulas_dadas.aggregate.summary.percentual, 10.0 / 12.0 * 100.0);
    assert_close(view.frequencia.aggregate.summary.percentual, 80.0);
    assert_close(view.tarefas.aggregate.summary.percentual_progresso, 8.0 / 14.0 * 100.0);
    assert_close(view.produtos.aggregate.summary.percentual_medio, 50.0);
    assert_close(
        view.visitas_tecnicas.aggregate.summary.rates.percentual_atas_assinadas,
        2.0 / 3.0 * 100.0,
    );

    let children = &view.aulas_dadas.children;
    assert_eq!(children.len(), 2);
    let beta = children
        .iter()
        .find(|c| c.entity.escola_id == Some(SchoolId(2)))
        .unwrap();
    assert_eq!(beta.entity.level, HierarchyLevel::Escola);
    assert_close(beta.summary.percentual, 100.0);
}

#[test]
fn test_state_children_are_municipalities() {
    let view = view(FilterContext::state());
    let mut labels: Vec<&str> = view
        .tarefas
        .children
        .iter()
        .map(|c| c.entity.label.as_str())
        .collect();
    labels.sort();
    assert_eq!(labels, vec!["Colatina", "Serra", "Vitória"]);

    let vitoria = view
        .tarefas
        .children
        .iter()
        .find(|c| c.entity.label == "Vitória")
        .unwrap();
    // tarefas_total = 0
    assert_eq!(vitoria.summary.percentual_progresso, 0.0);
}

#[test]
fn test_saar_cycle_restricts_visits_only() {
    let view = view(FilterContext::state().with_saar(1));
    assert_close(
        view.visitas_tecnicas.aggregate.summary.rates.percentual_atas_assinadas,
        75.0,
    );
    assert_close(view.tarefas.aggregate.summary.percentual_progresso, 55.0);

    let view = view_with_cycle(2);
    assert_eq!(view.visitas_tecnicas.aggregate.summary.rates.visitas_esperadas, 1);
    assert_eq!(view.visitas_tecnicas.aggregate.summary.rates.percentual_atas_assinadas, 0.0);
}

fn view_with_cycle(cycle: u8) -> DashboardView {
    view(FilterContext::state().with_saar(cycle))
}

#[test]
fn test_reporting_period() {
    let period = ReportingPeriod::between(
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
    );
    let view = dashboard_data().view(&FilterContext::state().normalize(), period);
    assert_eq!(view.aulas_dadas.aggregate.summary.aulas_previstas, 22);
    assert_close(view.aulas_dadas.aggregate.summary.percentual, 16.0 / 22.0 * 100.0);
    assert_close(view.frequencia.aggregate.summary.percentual, 80.0);
    // Undated domains ignore the period
    assert_eq!(view.tarefas.aggregate.summary.total, 20);
}

#[test]
fn test_daily_attendance_series() {
    let view = view(FilterContext::state());
    let series = &view.frequencia.aggregate.summary.serie_diaria;
    let days: Vec<(u32, u64, u64)> = series
        .iter()
        .map(|d| (d.dia_letivo, d.presencas, d.registros))
        .collect();
    assert_eq!(days, vec![(1, 3, 3), (2, 1, 2), (6, 0, 1)]);
}

#[test]
fn test_contradictory_filter_is_empty_with_conflicts() {
    let view = view(
        FilterContext::state()
            .with_regional("Colatina")
            .with_municipio("Serra"),
    );
    assert_eq!(view.matched_schools, 0);
    assert!(!view.conflicts.is_empty());
    assert_eq!(view.aulas_dadas.aggregate.summary.percentual, 0.0);
    assert_eq!(view.frequencia.aggregate.summary.registros, 0);
}

#[test]
fn test_unknown_school_selection_is_empty() {
    let view = view(FilterContext::state().with_escola("Escola Fantasma"));
    assert_eq!(view.matched_schools, 0);
    assert_eq!(view.frequencia.aggregate.row_count, 0);
    assert_eq!(view.indicators.frequencia, 0.0);
}

#[test]
fn test_directory_coordinators() {
    let data = dashboard_data();
    let coordinators = data.directory.coordinators();
    assert_eq!(coordinators.len(), 2);
    let rita = coordinators
        .iter()
        .find(|c| c.schools.contains(&SchoolId(1)))
        .unwrap();
    assert_eq!(rita.schools, vec![SchoolId(1), SchoolId(2)]);
}

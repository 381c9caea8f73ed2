#[cfg(test)]
mod tests {
    use crate::datasource::checksum::calculate_checksum;
    use crate::datasource::repo_config::PainelConfig;
    use crate::datasource::repositories::MemoryRepository;
    use crate::datasource::repository::Dataset;
    use crate::datasource::services::{health_check, load_dataset, load_snapshot};
    use crate::models::{FilterContext, ReportingPeriod};

    const SCHOOLS: &str = "id,nome,municipio,regional\n1,EEEFM Alpha,Serra,Carapina\n";
    const CLASSES: &str = "escola_id,turma,data,dia_letivo,aulas_previstas_LP,aulas_dadas_LP\n\
        1,1A,03/03/2025,1,4,3\n\
        1,1A,04/03/2025\n";

    fn repo() -> MemoryRepository {
        MemoryRepository::new()
            .with_dataset(Dataset::Schools, SCHOOLS)
            .with_dataset(Dataset::ClassesTaught, CLASSES)
    }

    #[tokio::test]
    async fn test_load_dataset_reports_checksum_and_dropped_lines() {
        let repo = repo();
        let (records, info) = load_dataset(&repo, Dataset::ClassesTaught).await;
        assert_eq!(records.len(), 1);
        assert!(info.loaded);
        assert_eq!(info.rows, 1);
        assert_eq!(info.dropped_lines, vec![3]);
        assert_eq!(info.checksum, Some(calculate_checksum(CLASSES)));
    }

    #[tokio::test]
    async fn test_missing_dataset_degrades_to_empty() {
        let repo = repo();
        let (records, info) = load_dataset(&repo, Dataset::Attendance).await;
        assert!(records.is_empty());
        assert!(!info.loaded);
        assert!(info.checksum.is_none());
        assert!(info.error.as_deref().unwrap_or_default().contains("frequencia.csv"));
    }

    #[tokio::test]
    async fn test_snapshot_with_partial_source() {
        let snapshot = load_snapshot(&repo(), &PainelConfig::default()).await.unwrap();
        assert_eq!(snapshot.datasets.len(), 6);
        assert!(!snapshot.is_complete());
        assert!(snapshot.dataset(Dataset::Schools).unwrap().loaded);
        assert!(!snapshot.dataset(Dataset::TechnicalVisits).unwrap().loaded);

        let filter = FilterContext::state().normalize();
        let view = snapshot.data.view(&filter, ReportingPeriod::default());
        assert_eq!(view.aulas_dadas.aggregate.summary.percentual, 75.0);
        // Absent datasets aggregate to zero rather than failing
        assert_eq!(view.frequencia.aggregate.summary.registros, 0);
        assert_eq!(view.visitas_tecnicas.aggregate.summary.rates.percentual_atas_assinadas, 0.0);
        assert!(view.precomputed_indicators.is_none());
    }

    #[tokio::test]
    async fn test_unhealthy_source_still_loads_empty_snapshot() {
        let repo = repo();
        repo.set_healthy(false);
        assert!(!health_check(&repo).await.unwrap());
        let snapshot = load_snapshot(&repo, &PainelConfig::default()).await.unwrap();
        assert!(snapshot.datasets.iter().all(|info| !info.loaded));
        assert!(snapshot.data.directory.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_holidays_fail_the_load() {
        let mut config = PainelConfig::default();
        config.dashboard.holidays = vec!["31/02/2025".to_string()];
        let err = load_snapshot(&repo(), &config).await.unwrap_err();
        assert_eq!(err.context().operation.as_deref(), Some("load_snapshot"));
    }

    #[tokio::test]
    async fn test_state_name_from_config() {
        let mut config = PainelConfig::default();
        config.dashboard.state_name = "ES".to_string();
        let snapshot = load_snapshot(&repo(), &config).await.unwrap();
        assert_eq!(snapshot.data.directory.state_name(), "ES");
    }
}

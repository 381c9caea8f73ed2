#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::datasource::{Dataset, DatasetRepository, MemoryRepository, PainelConfig};
    use crate::http::{create_router, AppState};

    const SCHOOLS: &str = "id,nome,municipio,regional\n\
        1,EEEFM Alpha,Serra,Carapina\n\
        2,EEEFM Beta,Serra,Carapina\n\
        4,EEEM Delta,Colatina,Colatina\n";

    const CLASSES: &str = "escola_id,turma,data,dia_letivo,aulas_previstas_LP,aulas_dadas_LP\n\
        1,1A,03/03/2025,1,2,2\n\
        1,1A,04/03/2025,2,2,1\n\
        2,1A,03/03/2025,1,4,4\n\
        4,1A,10/03/2025,6,8,6\n";

    fn state() -> AppState {
        let repo = MemoryRepository::new()
            .with_dataset(Dataset::Schools, SCHOOLS)
            .with_dataset(Dataset::ClassesTaught, CLASSES);
        AppState::new(Arc::new(repo) as Arc<dyn DatasetRepository>, PainelConfig::default())
    }

    async fn loaded() -> Router {
        let state = state();
        state.reload().await.unwrap();
        create_router(state)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_before_load() {
        let (status, body) = send(create_router(state()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["snapshot_loaded"], false);
        assert_eq!(body["source"], "reachable");
    }

    #[tokio::test]
    async fn test_data_endpoints_answer_loading_before_snapshot() {
        let app = create_router(state());
        let (status, body) = send(app.clone(), "POST", "/v1/dashboard", Some(json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "LOADING");

        let (status, _) = send(app, "GET", "/v1/datasets", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_dashboard_for_one_school() {
        let body = json!({
            "escola": {"label": "EEEFM Alpha", "value": 1},
            "periodo": {"inicio": "03/03/2025", "fim": "07/03/2025"}
        });
        let (status, body) = send(loaded().await, "POST", "/v1/dashboard", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], "escola");
        assert_eq!(body["matched_schools"], 1);
        assert_eq!(body["aulas_dadas"]["aggregate"]["summary"]["percentual"], 75.0);
        assert_eq!(body["indicators"]["aulas_dadas"], 75.0);
        assert_eq!(body["dias_letivos_previstos"], 5);
        assert!(body["precomputed_indicators"].is_null());
    }

    #[tokio::test]
    async fn test_period_excludes_rows_outside_it() {
        let body = json!({
            "regional": "Colatina",
            "periodo": {"inicio": "2025-03-01", "fim": "2025-03-07"}
        });
        let (status, body) = send(loaded().await, "POST", "/v1/aulas-dadas", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["aggregate"]["row_count"], 0);
        assert_eq!(body["aggregate"]["summary"]["percentual"], 0.0);
    }

    #[tokio::test]
    async fn test_domain_children_follow_filter_level() {
        let body = json!({"regional": [{"label": "Carapina"}]});
        let (status, body) = send(loaded().await, "POST", "/v1/aulas-dadas", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        let children = body["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0]["entity"]["label"], "Serra");
        // (2+1+4) / (2+2+4)
        assert_eq!(children[0]["summary"]["percentual"], 87.5);
    }

    #[tokio::test]
    async fn test_invalid_period_is_bad_request() {
        let body = json!({"periodo": {"inicio": "ontem"}});
        let (status, body) = send(loaded().await, "POST", "/v1/frequencia", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_filter_options() {
        let (status, body) =
            send(loaded().await, "GET", "/v1/filters/options?regional=Carapina", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["estado"], "Espírito Santo");
        assert_eq!(body["regionais"], json!(["Carapina", "Colatina"]));
        assert_eq!(body["municipios"], json!([{"municipio": "Serra", "regional": "Carapina"}]));
        assert_eq!(body["escolas"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_datasets_report_missing_files() {
        let (status, body) = send(loaded().await, "GET", "/v1/datasets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["complete"], false);
        let datasets = body["datasets"].as_array().unwrap();
        assert_eq!(datasets.len(), 6);
        assert_eq!(datasets[0]["file_name"], "escolas.csv");
        assert_eq!(datasets[0]["rows"], 3);
        assert_eq!(datasets[2]["loaded"], false);
    }

    #[tokio::test]
    async fn test_indicators_without_table_is_not_found() {
        let (status, body) = send(loaded().await, "POST", "/v1/indicadores", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reload_installs_snapshot() {
        let app = create_router(state());
        let (status, body) = send(app.clone(), "POST", "/v1/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["datasets"][0]["loaded"], true);

        let (status, _) = send(app, "POST", "/v1/tarefas", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
    }
}

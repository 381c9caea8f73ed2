//! Router configuration for the HTTP API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Dashboard is read-only and embedded cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/datasets", get(handlers::list_datasets))
        .route("/reload", post(handlers::reload))
        .route("/filters/options", get(handlers::filter_options))
        .route("/dashboard", post(handlers::dashboard))
        .route("/aulas-dadas", post(handlers::classes_taught))
        .route("/frequencia", post(handlers::attendance))
        .route("/tarefas", post(handlers::tasks))
        .route("/produtos", post(handlers::products))
        .route("/visitas-tecnicas", post(handlers::technical_visits))
        .route("/indicadores", post(handlers::indicators));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

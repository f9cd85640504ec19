//! API route definitions

use std::sync::Arc;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, state::AppState};
use crate::hazards::HazardKind;

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Use GET / or POST /predict.",
        })),
    )
}

/// Create the router for the loaded artifact. The route set depends on the
/// hazard kind: only the erosion service exposes `/predict_batch`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new().route("/", get(handlers::liveness));

    app = match state.kind() {
        HazardKind::Erosion => app
            .route("/predict", post(handlers::predict_erosion))
            .route("/predict_batch", post(handlers::predict_erosion_batch)),
        HazardKind::Cyclone => app.route("/predict", post(handlers::predict_cyclone)),
        HazardKind::Storm => app.route("/predict", post(handlers::predict_storm)),
        HazardKind::Pollution => app.route("/predict", post(handlers::predict_pollution)),
    };

    // Wide-open CORS, matching the original frontend-facing deployment
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.fallback(handle_404)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

//! HTTP request handlers
//!
//! One typed predict handler per hazard; the router only mounts the handler
//! matching the loaded artifact.

use std::sync::Arc;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::artifact::HazardArtifact;
use crate::hazards::{CycloneRecord, ErosionRecord, PollutionRecord, StormRecord};

/// Round to four decimal places for the wire format
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// GET / - liveness message
pub async fn liveness(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let endpoints = match state.kind() {
        crate::hazards::HazardKind::Erosion => "POST /predict or /predict_batch",
        _ => "POST /predict with input JSON",
    };
    Json(json!({
        "message": format!("{} is running. Use {}.", state.service_name(), endpoints),
    }))
}

// ============================================================================
// Erosion
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ErosionBatchRequest {
    pub records: Vec<ErosionRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErosionResponse {
    pub risk_assessment_prediction: String,
}

pub async fn predict_erosion(
    State(state): State<Arc<AppState>>,
    Json(record): Json<ErosionRecord>,
) -> Result<Json<ErosionResponse>> {
    let model = match state.artifact() {
        HazardArtifact::Erosion(model) => model,
        _ => return Err(ServerError::Internal("artifact kind mismatch".to_string())),
    };

    let prediction = model.predict(&record)?;
    Ok(Json(ErosionResponse {
        risk_assessment_prediction: prediction,
    }))
}

pub async fn predict_erosion_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ErosionBatchRequest>,
) -> Result<Json<serde_json::Value>> {
    let model = match state.artifact() {
        HazardArtifact::Erosion(model) => model,
        _ => return Err(ServerError::Internal("artifact kind mismatch".to_string())),
    };

    let mut predictions = Vec::with_capacity(request.records.len());
    for record in &request.records {
        let prediction = model.predict(record)?;
        predictions.push(ErosionResponse {
            risk_assessment_prediction: prediction,
        });
    }

    Ok(Json(json!({ "predictions": predictions })))
}

// ============================================================================
// Cyclone
// ============================================================================

pub async fn predict_cyclone(
    State(state): State<Arc<AppState>>,
    Json(record): Json<CycloneRecord>,
) -> Result<Json<serde_json::Value>> {
    let model = match state.artifact() {
        HazardArtifact::Cyclone(model) => model,
        _ => return Err(ServerError::Internal("artifact kind mismatch".to_string())),
    };

    let probability = model.predict(&record)?;
    Ok(Json(json!({
        "cyclone_formation_probability": round4(probability),
    })))
}

// ============================================================================
// Storm
// ============================================================================

pub async fn predict_storm(
    State(state): State<Arc<AppState>>,
    Json(record): Json<StormRecord>,
) -> Result<Json<serde_json::Value>> {
    let model = match state.artifact() {
        HazardArtifact::Storm(model) => model,
        _ => return Err(ServerError::Internal("artifact kind mismatch".to_string())),
    };

    let prediction = model.predict(&record)?;
    Ok(Json(json!({
        "predicted_risk_level": prediction.risk_level,
        "class_probabilities": prediction.class_probabilities,
    })))
}

// ============================================================================
// Pollution
// ============================================================================

pub async fn predict_pollution(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PollutionRecord>,
) -> Result<Json<serde_json::Value>> {
    let model = match state.artifact() {
        HazardArtifact::Pollution(model) => model,
        _ => return Err(ServerError::Internal("artifact kind mismatch".to_string())),
    };

    let prediction = model.predict(&record)?;
    Ok(Json(json!({
        "predicted_risk_level": prediction,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.1), 0.1);
        assert_eq!(round4(0.99995), 1.0);
    }
}

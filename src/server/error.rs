//! Error types for the prediction service

use crate::error::HazardError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Hazard(#[from] HazardError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ServerError::Hazard(err) => match err {
                HazardError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                HazardError::FeatureNotFound(name) => (
                    StatusCode::BAD_REQUEST,
                    format!("Feature not found: {}", name),
                ),
                other => {
                    tracing::error!(detail = %other, "Prediction failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Prediction failed. Check server logs for details.".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

//! Error types for the upload surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reportfmt_core::ValidationReport;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Strict mode refused a non-compliant document; the report travels
    /// to the client instead of the artifact.
    #[error("report failed validation with {} issue(s)", .report.issues.len())]
    Unprocessable { report: ValidationReport },

    #[error("processing failed: {0}")]
    Pipeline(#[from] reportfmt_core::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(message) => {
                error_response(StatusCode::BAD_REQUEST, &message)
            }
            ApiError::Unprocessable { report } => {
                let body = Json(json!({
                    "error": format!("report failed validation with {} issue(s)", report.issues.len()),
                    "status": StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                    "pass": report.pass,
                    "issues": report.records(),
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            ApiError::Pipeline(e) => {
                use reportfmt_core::Error as Core;
                match &e {
                    // Not a readable report at all
                    Core::Package(_) | Core::MissingPart(_) | Core::Markup(_) => {
                        error_response(StatusCode::BAD_REQUEST, &e.to_string())
                    }
                    // Structurally wrong for the fixed schema
                    Core::TableShape { .. } => {
                        error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
                    }
                    _ => {
                        tracing::error!("Pipeline error: {}", e);
                        error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Processing failed",
                        )
                    }
                }
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": message,
        "status": status.as_u16(),
    }));
    (status, body).into_response()
}

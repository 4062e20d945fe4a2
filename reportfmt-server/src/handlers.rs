//! HTTP handlers for the report formatting service.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use reportfmt_core::{ProcessedBytes, ReportProcessor};

use crate::error::ApiError;
use crate::state::AppState;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// POST /process-document — one multipart upload, formatted report back.
///
/// The upload is spooled to disk under a content-addressed name so a
/// failing input can be captured mid-flight, then removed once the
/// pipeline has run — success or failure.
pub async fn process_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        "Processing upload: {} ({} bytes)",
        upload.filename,
        upload.data.len()
    );

    let temp_path = state
        .upload_dir
        .join(format!("{}.docx", hex::encode(Sha256::digest(&upload.data))));
    tokio::fs::write(&temp_path, &upload.data)
        .await
        .map_err(anyhow::Error::from)?;

    // The pipeline is synchronous CPU work; keep it off the runtime.
    let processor = ReportProcessor::new(state.config.clone());
    let options = state.options();
    let data = upload.data;
    let joined =
        tokio::task::spawn_blocking(move || processor.process_bytes(&data, &options)).await;

    // The temp copy dies with the request, whatever the outcome was.
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        warn!("Failed to delete temp upload {}: {}", temp_path.display(), e);
    }

    let outcome = joined.map_err(|e| ApiError::Internal(anyhow::Error::new(e)))??;
    match outcome {
        ProcessedBytes::Clean(bytes) => Ok(docx_response(&upload.filename, bytes)),
        ProcessedBytes::WithIssues { bytes, report } => {
            warn!(
                "Returning non-compliant report with {} issue(s)",
                report.issues.len()
            );
            Ok(docx_response(&upload.filename, bytes))
        }
        ProcessedBytes::Rejected { report } => Err(ApiError::Unprocessable { report }),
    }
}

struct Upload {
    filename: String,
    data: Vec<u8>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("report.docx").to_string();
        if !filename.to_lowercase().ends_with(".docx") {
            return Err(ApiError::InvalidRequest(format!(
                "unsupported file type: {filename} (expected .docx)"
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("failed to read upload: {e}")))?;
        if data.is_empty() {
            return Err(ApiError::InvalidRequest("empty upload".to_string()));
        }

        return Ok(Upload {
            filename,
            data: data.to_vec(),
        });
    }
    Err(ApiError::InvalidRequest("missing 'file' field".to_string()))
}

fn docx_response(filename: &str, bytes: Vec<u8>) -> Response {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{stem}_processed.docx\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

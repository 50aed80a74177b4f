//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::classifier::RoleScore;
use crate::analysis::pipeline::{analyze_resume, AnalysisStage, DisplayFields};
use crate::analysis::roles::JobRole;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalysisFailure {
    pub stage: AnalysisStage,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: DisplayFields,
    pub role_scores: Vec<RoleScore>,
    pub error: Option<AnalysisFailure>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<&'static str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart upload with the resume in the `file` field. Pipeline failures come
/// back as 200 with `error` set and the message in the matching display field;
/// only malformed uploads and a full queue are transport errors.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let _permit = state
        .analysis_slots
        .clone()
        .try_acquire_owned()
        .map_err(|_| AppError::Busy)?;

    let upload = read_upload(&mut multipart).await?;

    let request_id = Uuid::new_v4();
    info!(
        "Analysis {request_id} started ({} bytes uploaded)",
        upload.as_ref().map(|b| b.len()).unwrap_or(0)
    );

    let analysis = analyze_resume(
        upload,
        state.classifier.as_ref(),
        state.generator.as_ref(),
        &state.config.limits,
    )
    .await;

    if analysis.is_success() {
        info!("Analysis {request_id} finished");
    } else if let Some(e) = &analysis.error {
        info!("Analysis {request_id} stopped at {:?} stage", e.stage());
    }

    Ok(Json(AnalyzeResponse {
        request_id,
        analyzed_at: Utc::now(),
        fields: analysis.display_fields(),
        role_scores: analysis
            .ranking
            .as_ref()
            .map(|r| r.scores().to_vec())
            .unwrap_or_default(),
        error: analysis.error.as_ref().map(|e| AnalysisFailure {
            stage: e.stage(),
            message: e.to_string(),
        }),
    }))
}

/// GET /api/v1/roles
pub async fn handle_roles() -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: JobRole::labels(),
    })
}

/// Pulls the resume out of the form. Returns `None` when no file was attached
/// (browsers submit an empty, nameless part for an untouched file input).
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Bytes>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        if data.is_empty() {
            return Ok(None);
        }
        if !is_pdf_upload(file_name.as_deref(), content_type.as_deref()) {
            return Err(AppError::Validation(format!(
                "Only PDF resumes are accepted (got {})",
                file_name.as_deref().unwrap_or("an unnamed file")
            )));
        }
        return Ok(Some(data));
    }
    Ok(None)
}

/// A part counts as a PDF if either its file name or its declared content type says so.
fn is_pdf_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_name = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    let by_type = content_type
        .map(|t| t.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    by_name || by_type
}

//! Contract analysis endpoints.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use tracing::info;

use super::super::{ApiError, AppState};
use super::types::{
    AnalyzeResponse, EmailResponse, TextSubmission, DEFAULT_UPLOAD_NAME,
    PASTED_TEXT_NAME,
};
use crate::analysis::{resolve_country, MIN_TEXT_CHARS};
use crate::extract::{is_allowed_upload, ALLOWED_EXTENSIONS};
use crate::models::{AnalysisListing, StoredAnalysis};

/// Upload a contract file and analyze it.
pub async fn analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut country = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_UPLOAD_NAME)
                    .to_string();
                if !is_allowed_upload(&filename) {
                    return Err(ApiError::BadRequest(format!(
                        "Unsupported file type. Allowed: {}",
                        ALLOWED_EXTENSIONS.join(", ")
                    )));
                }
                upload = Some((filename, field.bytes().await?.to_vec()));
            }
            Some("country") => country = Some(field.text().await?),
            _ => {}
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    let country = resolve_country(country);

    info!(filename = %filename, size = bytes.len(), country = %country, "Received contract upload");
    let outcome = state
        .analyzer
        .analyze_document(bytes, &filename, &country)
        .await?;
    let record = state.store.save(outcome).await?;

    Ok(Json(record.into()))
}

/// Analyze pasted contract text.
pub async fn analyze_text(
    State(state): State<AppState>,
    submission: TextSubmission,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if submission.text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Please provide more contract text (at least {} characters)",
            MIN_TEXT_CHARS
        )));
    }

    info!(chars = submission.text.len(), country = %submission.country, "Received pasted contract");
    let outcome = state
        .analyzer
        .analyze_text(&submission.text, PASTED_TEXT_NAME, &submission.country)
        .await?;
    let record = state.store.save(outcome).await?;

    Ok(Json(record.into()))
}

/// Fetch a stored analysis.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredAnalysis>, ApiError> {
    load(&state, &id).await.map(Json)
}

/// List stored analyses, most recent first.
pub async fn list_analyses(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnalysisListing>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// Draft a negotiation email for a stored analysis.
pub async fn generate_email(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmailResponse>, ApiError> {
    let record = load(&state, &id).await?;
    let email = state
        .analyzer
        .negotiation_email(&record.outcome)
        .await
        .map_err(ApiError::email)?;
    Ok(Json(EmailResponse { email }))
}

async fn load(state: &AppState, id: &str) -> Result<StoredAnalysis, ApiError> {
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(state.not_found_message().to_string()))
}

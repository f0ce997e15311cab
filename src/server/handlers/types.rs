//! Request and response bodies shared by the handlers.

use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use axum::Form;
use serde::{Deserialize, Serialize};

use super::super::ApiError;
use crate::analysis::resolve_country;
use crate::models::{AnalysisOutcome, StoredAnalysis};

/// Name given to uploads without a filename.
pub const DEFAULT_UPLOAD_NAME: &str = "contract.txt";
/// Name given to pasted text.
pub const PASTED_TEXT_NAME: &str = "pasted_contract.txt";

/// Response of both analyze endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub id: String,
    pub analysis: AnalysisOutcome,
}

impl From<StoredAnalysis> for AnalyzeResponse {
    fn from(record: StoredAnalysis) -> Self {
        Self {
            id: record.id,
            analysis: record.outcome,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailResponse {
    pub email: String,
}

/// Raw form fields of the analyze-text endpoint.
#[derive(Debug, Default, Deserialize)]
struct TextForm {
    text: Option<String>,
    country: Option<String>,
}

/// Pasted contract text, from a urlencoded or multipart form.
#[derive(Debug)]
pub struct TextSubmission {
    pub text: String,
    pub country: String,
}

impl From<TextForm> for TextSubmission {
    fn from(form: TextForm) -> Self {
        Self {
            text: form.text.unwrap_or_default(),
            country: resolve_country(form.country),
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for TextSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<TextForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(form.into());
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let mut form = TextForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("text") => form.text = Some(field.text().await?),
                Some("country") => form.country = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form.into())
    }
}

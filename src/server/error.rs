//! Unified API error handling.
//!
//! Every failing endpoint answers with the same JSON body:
//! `{"error": <kind>, "detail": <message>}`. Rate-limited requests also carry
//! `retry_after` (seconds) and a `Retry-After` header.

use axum::extract::multipart::MultipartError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::store::StoreError;

/// Standard error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error kind
    pub error: &'static str,
    /// Human-readable message
    pub detail: String,
    /// Seconds until the client may retry (429 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unusable input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unknown analysis id (404)
    #[error("{0}")]
    NotFound(String),

    /// Body above the upload cap (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Too many analyses from one client (429)
    #[error("Rate limit exceeded. Try again in {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Model call or reply parsing failed (500)
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Email drafting failed (500)
    #[error("Email generation failed: {0}")]
    EmailFailed(String),

    /// Storage or other server-side failure (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::AnalysisFailed(_) | Self::EmailFailed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::RateLimited { .. } => "rate_limited",
            Self::AnalysisFailed(_) => "analysis_failed",
            Self::EmailFailed(_) => "email_generation_failed",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Email drafting errors keep their own prefix.
    pub fn email(err: AnalysisError) -> Self {
        Self::EmailFailed(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::error!(error_type = kind, status = status.as_u16(), message = %self, "API error");
        } else {
            tracing::debug!(error_type = kind, status = status.as_u16(), message = %self, "API error");
        }

        let retry_after = match &self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };
        let body = ErrorResponse {
            error: kind,
            detail: self.to_string(),
            retry_after,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(_) | AnalysisError::Extraction(_) => {
                Self::BadRequest(err.to_string())
            }
            AnalysisError::Transport(_) | AnalysisError::Parse(_) => {
                Self::AnalysisFailed(err.to_string())
            }
            AnalysisError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(format!("Failed to read upload: {}", err.body_text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionError;
    use crate::llm::LlmError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_pipeline_errors_map_by_stage() {
        let err: ApiError = AnalysisError::Validation("too short".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = AnalysisError::Extraction(ExtractionError::Pdf("bad xref".into())).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Failed to extract text from PDF: bad xref");

        let err: ApiError = AnalysisError::Transport(LlmError::EmptyResponse).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Analysis failed: "));

        let err = ApiError::email(AnalysisError::Transport(LlmError::Api("503".into())));
        assert!(err.to_string().starts_with("Email generation failed: "));
    }

    #[tokio::test]
    async fn test_crashed_extraction_task_is_server_error() {
        let join_err = tokio::task::spawn_blocking(|| panic!("parser crashed"))
            .await
            .unwrap_err();
        let err = AnalysisError::from(join_err);
        assert!(matches!(err, AnalysisError::Internal(_)));

        let err: ApiError = err.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "internal_error");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::NotFound("Analysis not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["detail"], "Analysis not found");
        assert!(json.get("retry_after").is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_carries_retry_after() {
        let response = ApiError::RateLimited { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
        let json = body_json(response).await;
        assert_eq!(json["retry_after"], 42);
        assert_eq!(json["error"], "rate_limited");
    }
}

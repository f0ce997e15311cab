//! Parsing and classification of the model's analysis reply.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde_json::Value;

use super::prompts::{REJECTION_SUGGESTION, REJECTION_TEMPLATES, UNKNOWN_DOCUMENT_TYPE};
use super::AnalysisError;
use crate::models::{AnalysisOutcome, ContractAnalysis, Rejection};

/// Characters of source text kept in `contract_text_preview`.
pub const PREVIEW_CHARS: usize = 500;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*\s*").unwrap());
static CLOSING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```$").unwrap());

/// What the model said about the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// The document is not a contract.
    NotAContract { document_type: Option<String> },
    /// Structured analysis, not yet annotated.
    Analysis(ContractAnalysis),
}

/// Remove a markdown code fence around the reply, if present.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let start = OPENING_FENCE.find(trimmed).map_or(0, |m| m.end());
    let rest = &trimmed[start..];
    let end = CLOSING_FENCE.find(rest).map_or(rest.len(), |m| m.start());
    &rest[..end]
}

/// Parse stage: decode the cleaned reply and branch on `not_a_contract`.
pub fn parse_reply(reply: &str) -> Result<ModelReply, AnalysisError> {
    let cleaned = strip_code_fence(reply);
    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    let not_a_contract = value
        .get("not_a_contract")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if not_a_contract {
        let document_type = value
            .get("document_type")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        return Ok(ModelReply::NotAContract { document_type });
    }

    serde_json::from_value(value)
        .map(ModelReply::Analysis)
        .map_err(|e| AnalysisError::Parse(e.to_string()))
}

/// Classify stage: turn the parsed reply into the stored outcome.
pub fn classify<R: Rng + ?Sized>(
    reply: ModelReply,
    contract_text: &str,
    filename: &str,
    country: &str,
    rng: &mut R,
) -> AnalysisOutcome {
    match reply {
        ModelReply::NotAContract { document_type } => {
            let document_type =
                document_type.unwrap_or_else(|| UNKNOWN_DOCUMENT_TYPE.to_string());
            AnalysisOutcome::Rejected(rejection(document_type, filename, rng))
        }
        ModelReply::Analysis(mut analysis) => {
            if !analysis.summary.matches_clauses(&analysis.clauses) {
                tracing::warn!(
                    filename,
                    reported_total = analysis.summary.total_clauses,
                    actual_total = analysis.clauses.len(),
                    "Model summary counts disagree with clause list"
                );
            }
            analysis.filename = filename.to_string();
            analysis.country = country.to_string();
            analysis.contract_text_preview = preview(contract_text);
            AnalysisOutcome::Contract(analysis)
        }
    }
}

/// Build a rejection with a randomly chosen message.
pub fn rejection<R: Rng + ?Sized>(document_type: String, filename: &str, rng: &mut R) -> Rejection {
    let template = REJECTION_TEMPLATES
        .choose(rng)
        .copied()
        .unwrap_or(REJECTION_TEMPLATES[0]);
    Rejection {
        not_a_contract: true,
        prank_detected: true,
        message: template.replace("{doc_type}", &document_type),
        document_type,
        filename: filename.to_string(),
        suggestion: REJECTION_SUGGESTION.to_string(),
    }
}

/// First [`PREVIEW_CHARS`] characters, with "..." when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

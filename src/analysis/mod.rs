//! Contract analysis pipeline.
//!
//! One analysis runs as a fixed sequence of stages:
//!
//! 1. **Extract** - file bytes to text ([`crate::extract`])
//! 2. **Prompt** - validate the text and fill the analysis prompt
//! 3. **Invoke** - a single model call, no retry
//! 4. **Parse** - strip code fences, decode JSON, branch on `not_a_contract`
//! 5. **Classify** - build the [`AnalysisOutcome`]
//!
//! Each stage returns a `Result`; the error variant records which stage
//! failed, and nothing is persisted on failure.

mod email;
pub mod prompts;
pub mod response;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::extract::{ExtractionError, TextExtractor};
use crate::llm::{LlmError, TextGenerator};
use crate::models::AnalysisOutcome;

pub use response::{parse_reply, strip_code_fence, ModelReply};

/// Jurisdiction assumed when the caller does not name one.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Empty or missing country falls back to [`DEFAULT_COUNTRY`].
pub fn resolve_country(country: Option<String>) -> String {
    country
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
}

/// Minimum trimmed length of usable contract text.
pub const MIN_TEXT_CHARS: usize = 50;

/// Maximum characters of contract text sent to the model.
pub const MAX_PROMPT_CHARS: usize = 15_000;

/// Pipeline stage, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Prompt,
    Invoke,
    Parse,
    Classify,
}

/// Errors produced by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input is unusable; the user has to fix it.
    #[error("{0}")]
    Validation(String),

    /// The file could not be parsed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The model call itself failed.
    #[error(transparent)]
    Transport(#[from] LlmError),

    /// The model answered with something that is not the expected JSON.
    #[error("Failed to parse model response: {0}")]
    Parse(String),

    /// A background task died; not the caller's fault.
    #[error("Analysis task failed: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl AnalysisError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Extraction(_) => Stage::Extract,
            Self::Validation(_) => Stage::Prompt,
            Self::Transport(_) => Stage::Invoke,
            Self::Parse(_) => Stage::Parse,
            Self::Internal(_) => Stage::Extract,
        }
    }
}

/// Runs extraction, prompting and classification against a model.
#[derive(Clone)]
pub struct ContractAnalyzer {
    generator: Arc<dyn TextGenerator>,
    extractor: TextExtractor,
}

impl ContractAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            extractor: TextExtractor::new(),
        }
    }

    /// Analyze an uploaded file.
    pub async fn analyze_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        country: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let text = self.extract(bytes, filename).await?;
        self.analyze_text(&text, filename, country).await
    }

    /// Analyze already-extracted text.
    pub async fn analyze_text(
        &self,
        text: &str,
        filename: &str,
        country: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let prompt = build_prompt(text, country)?;

        info!(filename, country, "Analyzing contract");
        let reply = self.generator.generate(&prompt).await?;
        debug!(filename, reply_chars = reply.len(), "Model replied");

        let parsed = parse_reply(&reply)?;
        let outcome =
            response::classify(parsed, text, filename, country, &mut rand::thread_rng());

        match &outcome {
            AnalysisOutcome::Contract(a) => {
                info!(filename, clauses = a.clauses.len(), "Analysis complete")
            }
            AnalysisOutcome::Rejected(r) => {
                info!(filename, document_type = %r.document_type, "Document is not a contract")
            }
        }
        Ok(outcome)
    }

    /// Draft a negotiation email for a previous analysis.
    pub async fn negotiation_email(
        &self,
        outcome: &AnalysisOutcome,
    ) -> Result<String, AnalysisError> {
        email::negotiation_email(self.generator.as_ref(), outcome).await
    }

    /// Extract stage. Parsing runs on the blocking pool.
    async fn extract(&self, bytes: Vec<u8>, filename: &str) -> Result<String, AnalysisError> {
        let extractor = self.extractor;
        let name = filename.to_string();
        let text = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes, &name))
            .await??;
        Ok(text)
    }
}

/// Prompt stage: enforce the minimum length, truncate, fill the template.
pub fn build_prompt(text: &str, country: &str) -> Result<String, AnalysisError> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(AnalysisError::Validation(
            "Could not extract enough text from the contract. Please try a different file format."
                .to_string(),
        ));
    }
    let truncated = truncate_chars(text, MAX_PROMPT_CHARS);
    debug!(
        chars = truncated.chars().count(),
        truncated = truncated.len() < text.len(),
        "Built analysis prompt"
    );
    Ok(prompts::analysis_prompt(truncated, country))
}

/// Truncate to at most `max` characters (UTF-8 safe).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

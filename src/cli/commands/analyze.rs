//! One-off contract analysis from the command line.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use console::style;

use crate::analysis::ContractAnalyzer;
use crate::config::Settings;
use crate::extract::{is_allowed_upload, ALLOWED_EXTENSIONS};
use crate::llm::LlmClient;
use crate::store::{AnalysisStore, FileStore};

use super::extract::file_name;

/// Analyze a file and print the outcome as JSON on stdout.
pub async fn cmd_analyze(
    settings: &Settings,
    file: &Path,
    country: &str,
    save: bool,
) -> anyhow::Result<()> {
    let filename = file_name(file);
    if !is_allowed_upload(&filename) {
        anyhow::bail!(
            "Unsupported file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        );
    }

    settings.require_llm_credentials()?;
    let client = LlmClient::new(settings.llm.clone())?;
    let analyzer = ContractAnalyzer::new(Arc::new(client));

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("{} is empty", file.display());
    }

    eprintln!(
        "{} Analyzing {} with {} ({})",
        style("→").cyan(),
        filename,
        settings.llm.provider.as_str(),
        settings.llm.model
    );
    let outcome = analyzer.analyze_document(bytes, &filename, country).await?;

    if let Some(analysis) = outcome.as_contract() {
        let s = &analysis.summary;
        eprintln!(
            "  {} {} green, {} yellow, {} red",
            style("✓").green(),
            s.green_count,
            s.yellow_count,
            s.red_count
        );
    } else {
        eprintln!("  {} Not a contract", style("!").yellow());
    }

    if save {
        let store = FileStore::new(&settings.data_dir);
        let record = store.save(outcome).await?;
        eprintln!(
            "  {} Saved as {}",
            style("✓").green(),
            style(&record.id).bold()
        );
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}

//! Text extraction command.

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::extract::TextExtractor;

/// Print the text extracted from `file` on stdout.
pub async fn cmd_extract(file: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file_name(file);

    let result = tokio::task::spawn_blocking(move || TextExtractor::new().extract(&bytes, &filename))
        .await??;

    let pages = result
        .page_count
        .map(|n| format!(", {} pages", n))
        .unwrap_or_default();
    eprintln!(
        "{} {} ({}, {} chars{})",
        style("✓").green(),
        file.display(),
        result.format.as_str(),
        result.text.chars().count(),
        pages
    );
    println!("{}", result.text);
    Ok(())
}

/// Final path component, used to pick the parser.
pub(super) fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

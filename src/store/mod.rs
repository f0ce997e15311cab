//! Persistence for analysis outcomes.
//!
//! Two interchangeable backends share the [`AnalysisStore`] trait:
//! - [`FileStore`]: one pretty-printed JSON file per analysis, survives restarts
//! - [`MemoryStore`]: process-local map, for stateless hosting

mod file;
mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::models::{AnalysisListing, AnalysisOutcome, StoredAnalysis};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Which storage backend a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StorageMode {
    /// JSON files in the data directory
    #[default]
    Disk,
    /// In-process map, lost on restart
    Memory,
}

impl StorageMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disk" | "file" | "durable" => Some(Self::Disk),
            "memory" | "ephemeral" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Errors from the storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend for analysis outcomes.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist an outcome under a fresh identifier and creation time.
    async fn save(&self, outcome: AnalysisOutcome) -> StoreResult<StoredAnalysis>;

    /// Fetch one record; unknown ids are `Ok(None)`.
    async fn get(&self, id: &str) -> StoreResult<Option<StoredAnalysis>>;

    /// All records, most recent first.
    async fn list(&self) -> StoreResult<Vec<AnalysisListing>>;

    /// Whether records survive a restart. Listing is only exposed when true.
    fn is_durable(&self) -> bool;
}

/// Build the backend selected by `mode`.
pub fn open_store(mode: StorageMode, data_dir: PathBuf) -> Arc<dyn AnalysisStore> {
    match mode {
        StorageMode::Disk => Arc::new(FileStore::new(data_dir)),
        StorageMode::Memory => Arc::new(MemoryStore::new()),
    }
}

/// Stamp an outcome with a new id and the current time.
fn new_record(outcome: AnalysisOutcome) -> StoredAnalysis {
    StoredAnalysis {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        outcome,
    }
}

/// Only canonical UUIDs are accepted as ids.
fn is_valid_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok_and(|u| u.hyphenated().to_string() == id)
}

/// Most recent first.
fn sort_listings(listings: &mut [AnalysisListing]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Clause, ContractAnalysis, RiskLevel, Summary};

    pub(crate) fn sample_outcome(filename: &str) -> AnalysisOutcome {
        let clauses = vec![
            Clause {
                clause_type: "payment_terms".to_string(),
                risk_level: RiskLevel::Yellow,
                original_text: "Payment within 60 days of approval".to_string(),
                explanation: "You could wait two months.".to_string(),
                push_back: Some("Ask for Net 30".to_string()),
                suggested_alternative: Some("within 30 days of posting".to_string()),
            },
            Clause {
                clause_type: "deliverables".to_string(),
                risk_level: RiskLevel::Green,
                original_text: "One Instagram reel".to_string(),
                explanation: "Clear.".to_string(),
                push_back: None,
                suggested_alternative: None,
            },
        ];
        AnalysisOutcome::Contract(ContractAnalysis {
            summary: Summary {
                biggest_risk: "Slow payment".to_string(),
                ..Summary::tally(&clauses)
            },
            clauses,
            next_steps: vec!["Negotiate payment terms".to_string()],
            filename: filename.to_string(),
            country: "United States".to_string(),
            contract_text_preview: "This agreement...".to_string(),
        })
    }

    /// Shared behaviour checks run against both backends.
    pub(crate) async fn exercise_round_trip(store: &dyn AnalysisStore) {
        let saved = store.save(sample_outcome("deal.pdf")).await.unwrap();
        let fetched = store.get(&saved.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, saved.id);
        assert_eq!(fetched.created_at, saved.created_at);
        let expected = sample_outcome("deal.pdf");
        let expected = expected.as_contract().unwrap();
        let actual = fetched.outcome.as_contract().unwrap();
        assert_eq!(actual.summary, expected.summary);
        assert_eq!(actual.clauses, expected.clauses);
        assert_eq!(actual.filename, expected.filename);
    }

    pub(crate) async fn exercise_listing_order(store: &dyn AnalysisStore) {
        let mut ids = Vec::new();
        for n in 0..3 {
            let saved = store.save(sample_outcome(&format!("deal-{n}.pdf"))).await.unwrap();
            ids.push(saved.id);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(listed[0].id, ids[2]);

        let newest = store.save(sample_outcome("deal-new.pdf")).await.unwrap();
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[0].filename, "deal-new.pdf");
        assert!(listed[0].summary.is_some());
    }

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_valid_id("67E55044-10B1-426F-9247-BB680E5FE0C8"));
        assert!(!is_valid_id("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id(""));
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = new_record(sample_outcome("a.txt"));
        let b = new_record(sample_outcome("a.txt"));
        assert_ne!(a.id, b.id);
        assert!(is_valid_id(&a.id));
    }

    #[test]
    fn test_storage_mode_parse() {
        assert_eq!(StorageMode::parse("DISK"), Some(StorageMode::Disk));
        assert_eq!(StorageMode::parse("ephemeral"), Some(StorageMode::Memory));
        assert_eq!(StorageMode::parse("s3"), None);
    }
}

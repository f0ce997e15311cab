//! In-process analysis store for stateless deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{new_record, sort_listings, AnalysisStore, StoreResult};
use crate::models::{AnalysisListing, AnalysisOutcome, StoredAnalysis};

/// Ephemeral store; everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoredAnalysis>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn save(&self, outcome: AnalysisOutcome) -> StoreResult<StoredAnalysis> {
        let mut records = self.records.write().await;
        let mut record = new_record(outcome);
        while records.contains_key(&record.id) {
            record.id = uuid::Uuid::new_v4().to_string();
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<StoredAnalysis>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<AnalysisListing>> {
        let mut listings: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .map(StoredAnalysis::listing)
            .collect();
        sort_listings(&mut listings);
        Ok(listings)
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{exercise_listing_order, exercise_round_trip};

    #[tokio::test]
    async fn test_round_trip() {
        exercise_round_trip(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_listing_order() {
        exercise_listing_order(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = MemoryStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
        assert!(!store.is_durable());
    }
}

//! File-backed analysis store: `{data_dir}/{id}.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{is_valid_id, new_record, sort_listings, AnalysisStore, StoreError, StoreResult};
use crate::models::{AnalysisListing, AnalysisOutcome, StoredAnalysis};

/// Attempts at finding an unused id before giving up.
const MAX_ID_ATTEMPTS: usize = 3;

/// Durable store writing one JSON file per analysis.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Create the data directory on first use.
    async fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Read one file into a listing entry.
    async fn read_listing(path: &Path) -> StoreResult<AnalysisListing> {
        let bytes = fs::read(path).await?;
        let record: StoredAnalysis = serde_json::from_slice(&bytes)?;
        Ok(record.listing())
    }
}

#[async_trait]
impl AnalysisStore for FileStore {
    async fn save(&self, outcome: AnalysisOutcome) -> StoreResult<StoredAnalysis> {
        self.ensure_dir().await?;

        let mut record = new_record(outcome);
        for _ in 0..MAX_ID_ATTEMPTS {
            let path = self.path_for(&record.id);
            let file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            let mut file = match file {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(id = %record.id, "Analysis id already taken, generating another");
                    record.id = uuid::Uuid::new_v4().to_string();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let json = serde_json::to_vec_pretty(&record)?;
            file.write_all(&json).await?;
            file.flush().await?;

            info!(id = %record.id, path = %path.display(), "Saved analysis");
            return Ok(record);
        }

        Err(StoreError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "could not allocate an unused analysis id",
        )))
    }

    async fn get(&self, id: &str) -> StoreResult<Option<StoredAnalysis>> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        self.ensure_dir().await?;

        let bytes = match fs::read(self.path_for(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn list(&self) -> StoreResult<Vec<AnalysisListing>> {
        self.ensure_dir().await?;

        let mut listings = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_listing(&path).await {
                Ok(listing) => listings.push(listing),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable analysis"),
            }
        }

        sort_listings(&mut listings);
        Ok(listings)
    }

    fn is_durable(&self) -> bool {
        true
    }
}

//! Uploaded dataset registry
//!
//! Dataset-aware runs can reference a previously uploaded tabular file. The
//! store keeps the raw bytes on disk keyed by UUID and an in-memory record
//! of the file's shape; the shape summary is what reaches agent prompts.
//! Records live for the process lifetime, matching the upload-then-run
//! usage pattern.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

/// Metadata for one uploaded dataset
#[derive(Debug, Clone)]
pub struct DatasetRecord {
    /// Registry key
    pub id: Uuid,
    /// Original upload file name
    pub name: String,
    /// On-disk location of the raw bytes
    pub path: PathBuf,
    /// Data row count (excluding the header)
    pub rows: usize,
    /// Column names from the header row
    pub columns: Vec<String>,
    /// Optional column that partitions the data by domain
    pub domain_column: Option<String>,
    /// Upload time
    pub created_at: DateTime<Utc>,
}

impl DatasetRecord {
    /// One-line summary rendered into agent prompts
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "'{}' with {} rows and columns: {}",
            self.name,
            self.rows,
            self.columns.join(", ")
        );
        if let Some(domain) = &self.domain_column {
            summary.push_str(&format!(" (domain column: {domain})"));
        }
        summary
    }
}

/// Registry of uploaded datasets
pub struct DatasetStore {
    dir: PathBuf,
    records: RwLock<HashMap<Uuid, DatasetRecord>>,
}

impl DatasetStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Dataset(format!("cannot create dataset dir: {e}")))?;
        Ok(Self {
            dir,
            records: RwLock::new(HashMap::new()),
        })
    }

    /// Save an uploaded CSV and register its shape
    ///
    /// # Errors
    /// Rejects files that do not parse as CSV, and a `domain_column` that is
    /// not one of the header columns.
    #[instrument(skip(self, bytes), fields(name = %name, size = bytes.len()))]
    pub async fn save(
        &self,
        name: &str,
        bytes: &[u8],
        domain_column: Option<String>,
    ) -> Result<DatasetRecord> {
        let (columns, rows) = inspect_csv(bytes)?;

        if let Some(domain) = &domain_column {
            if !columns.iter().any(|c| c == domain) {
                return Err(Error::Dataset(format!(
                    "domain column '{domain}' not found in dataset columns"
                )));
            }
        }

        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{id}.csv"));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Dataset(format!("cannot write dataset file: {e}")))?;

        let record = DatasetRecord {
            id,
            name: name.to_string(),
            path,
            rows,
            columns,
            domain_column,
            created_at: Utc::now(),
        };

        self.records.write().await.insert(id, record.clone());
        info!(dataset_id = %id, rows = record.rows, "dataset registered");
        Ok(record)
    }

    /// Look up a dataset record
    pub async fn get(&self, id: Uuid) -> Option<DatasetRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Resolve a dataset reference from a run request into a prompt summary
    ///
    /// # Errors
    /// Returns `Error::UnknownDataset` for ids that do not parse or do not
    /// exist; callers reject such runs before any agent call is made.
    pub async fn summary_for(&self, id: &str) -> Result<String> {
        let uuid = Uuid::parse_str(id).map_err(|_| Error::UnknownDataset(id.to_string()))?;
        self.get(uuid)
            .await
            .map(|record| record.summary())
            .ok_or_else(|| Error::UnknownDataset(id.to_string()))
    }
}

/// Parse header and row count from CSV bytes
fn inspect_csv(bytes: &[u8]) -> Result<(Vec<String>, usize)> {
    let mut reader = csv::Reader::from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Dataset(format!("invalid CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.is_empty() {
        return Err(Error::Dataset("dataset has no columns".to_string()));
    }

    let mut rows = 0usize;
    for record in reader.records() {
        record.map_err(|e| Error::Dataset(format!("invalid CSV row: {e}")))?;
        rows += 1;
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &[u8] = b"effort,size,domain\n10,100,web\n20,180,batch\n";

    #[tokio::test]
    async fn test_save_registers_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();

        let record = store.save("projects.csv", CSV, None).await.unwrap();
        assert_eq!(record.rows, 2);
        assert_eq!(record.columns, vec!["effort", "size", "domain"]);
        assert!(record.path.exists());
    }

    #[tokio::test]
    async fn test_summary_for_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();
        let record = store
            .save("projects.csv", CSV, Some("domain".to_string()))
            .await
            .unwrap();

        let summary = store.summary_for(&record.id.to_string()).await.unwrap();
        assert!(summary.contains("projects.csv"));
        assert!(summary.contains("2 rows"));
        assert!(summary.contains("domain column: domain"));
    }

    #[tokio::test]
    async fn test_unknown_domain_column_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();
        let err = store
            .save("projects.csv", CSV, Some("region".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }

    #[tokio::test]
    async fn test_unknown_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();

        let err = store.summary_for("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, Error::UnknownDataset(_)));

        let err = store
            .summary_for(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDataset(_)));
    }
}

//! Local filesystem storage implementation.
//!
//! Records are appended as JSON lines. Nothing is ever rewritten, so two
//! runs over the same inputs simply leave two sets of lines.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::IngestedRecord;
use crate::storage::RecordStore;

/// File holding the records under the root directory.
pub const RECORDS_FILE: &str = "records.jsonl";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Full path of the records file.
    pub fn path(&self) -> PathBuf {
        self.root_dir.join(RECORDS_FILE)
    }

    /// Append pre-serialized lines in one write.
    async fn append(&self, lines: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .await?;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every stored record back, oldest first.
    pub async fn load_all(&self) -> Result<Vec<IngestedRecord>> {
        let content = match tokio::fs::read_to_string(self.path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn ensure_index(&self) -> Result<()> {
        log::debug!("Local store has no indexes; skipping");
        Ok(())
    }

    async fn insert_one(&self, record: &IngestedRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.append(&line).await?;
        log::info!("Inserted 1 record into {}", self.path().display());
        Ok(())
    }

    async fn insert_many(&self, records: &[IngestedRecord]) -> Result<usize> {
        if records.is_empty() {
            log::warn!("No valid documents to insert.");
            return Ok(0);
        }

        // Encode everything first so a failure leaves the file untouched
        let mut lines = String::new();
        for record in records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        self.append(&lines).await?;
        log::info!(
            "Inserted {} documents into {}",
            records.len(),
            self.path().display()
        );
        Ok(records.len())
    }
}

//! Storage abstractions for ingested records.
//!
//! Two backends implement [`RecordStore`]:
//! - [`MongoStore`]: one document per record in a MongoDB collection
//! - [`LocalStore`]: append-only `records.jsonl` for dry runs
//!
//! ```text
//! {local_dir}/
//! └── records.jsonl     # one IngestedRecord per line
//! ```

pub mod local;
pub mod mongo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{IngestedRecord, StoreBackend, StoreConfig};

// Re-export for convenience
pub use local::LocalStore;
pub use mongo::MongoStore;

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ensure the (`input`, `ingested_at`) lookup index exists.
    async fn ensure_index(&self) -> Result<()>;

    /// Insert a single record.
    async fn insert_one(&self, record: &IngestedRecord) -> Result<()>;

    /// Insert records unordered and return how many landed.
    ///
    /// A failing record does not stop the others. An empty slice is a no-op.
    async fn insert_many(&self, records: &[IngestedRecord]) -> Result<usize>;
}

/// Open the backend selected in the configuration.
pub async fn open(config: &StoreConfig) -> Result<Box<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Mongo => Ok(Box::new(MongoStore::connect(config).await?)),
        StoreBackend::Local => {
            log::info!("Using local record store at {}", config.local_dir);
            Ok(Box::new(LocalStore::new(&config.local_dir)))
        }
    }
}

//! MongoDB storage implementation.

use std::time::Duration;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};

use crate::error::Result;
use crate::models::{IngestedRecord, StoreConfig};
use crate::storage::RecordStore;

/// MongoDB-backed record store.
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connect and ping the server so a bad URI fails before any fetch.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.server_selection_timeout =
            Some(Duration::from_millis(config.server_selection_timeout_ms));
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        log::info!(
            "Connected to MongoDB, writing to {}.{}",
            config.database,
            config.collection
        );

        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        Ok(Self { collection })
    }
}

/// Convert a record to the stored document shape.
///
/// `ingested_at` becomes a native BSON datetime so range queries work.
pub fn to_document(record: &IngestedRecord) -> Result<Document> {
    let mut document = doc! {
        "source": record.source.as_str(),
        "endpoint": record.endpoint.as_str(),
        "input": record.input.as_str(),
        "ingested_at": bson::DateTime::from_chrono(record.ingested_at),
        "raw": bson::to_bson(&record.raw)?,
    };
    if let Some(count) = record.pulse_count {
        document.insert("pulse_count", i64::try_from(count).unwrap_or(i64::MAX));
    }
    if let Some(malicious) = record.is_malicious {
        document.insert("is_malicious", Bson::Boolean(malicious));
    }
    Ok(document)
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn ensure_index(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "input": 1, "ingested_at": 1 })
            .build();
        let result = self.collection.create_index(index).await?;
        log::debug!("Index ready: {}", result.index_name);
        Ok(())
    }

    async fn insert_one(&self, record: &IngestedRecord) -> Result<()> {
        let document = to_document(record)?;
        let result = self.collection.insert_one(document).await?;
        log::info!("Inserted document {}", result.inserted_id);
        Ok(())
    }

    async fn insert_many(&self, records: &[IngestedRecord]) -> Result<usize> {
        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            match to_document(record) {
                Ok(document) => documents.push(document),
                Err(e) => log::warn!("Skipping record for {}: {}", record.input, e),
            }
        }

        if documents.is_empty() {
            log::warn!("No valid documents to insert.");
            return Ok(0);
        }

        let total = documents.len();
        match self.collection.insert_many(documents).ordered(false).await {
            Ok(result) => {
                log::info!("Inserted {} documents.", result.inserted_ids.len());
                Ok(result.inserted_ids.len())
            }
            Err(e) => match e.kind.as_ref() {
                ErrorKind::InsertMany(failure) => {
                    let failed = failure.write_errors.as_ref().map_or(0, Vec::len);
                    let inserted = total.saturating_sub(failed);
                    log::warn!(
                        "Bulk write error; inserted {}. Details: {:?}",
                        inserted,
                        failure
                    );
                    Ok(inserted)
                }
                _ => Err(e.into()),
            },
        }
    }
}

//! MongoDB-backed document store.
//!
//! Records live in the `textdocuments` collection with camelCase field names,
//! matching documents written by earlier deployments of the service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{DocumentStore, StoreError, StoredDocument};

/// Collection holding one record per `textId`.
pub const COLLECTION: &str = "textdocuments";

/// On-disk shape of a stored document. Extra fields (`_id`, `__v`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextDocumentRecord {
    text_id: String,
    #[serde(default)]
    data: String,
    created_at: BsonDateTime,
    updated_at: BsonDateTime,
}

impl TryFrom<TextDocumentRecord> for StoredDocument {
    type Error = StoreError;

    fn try_from(record: TextDocumentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            text_id: record.text_id,
            data: record.data,
            created_at: to_chrono(record.created_at)?,
            updated_at: to_chrono(record.updated_at)?,
        })
    }
}

fn to_chrono(dt: BsonDateTime) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {dt}")))
}

/// Document store over a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
    collection: Collection<TextDocumentRecord>,
}

impl MongoStore {
    /// Connect to `uri` and make sure the unique `textId` index exists.
    ///
    /// The database named in the connection string is used when present;
    /// otherwise `default_db`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Mongo`] if the URI is invalid or index creation
    /// fails.
    pub async fn connect(uri: &str, default_db: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(default_db));
        let collection = db.collection::<TextDocumentRecord>(COLLECTION);

        let store = Self { db, collection };
        store.ensure_indexes().await?;
        info!(database = %store.db.name(), collection = COLLECTION, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "textId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn upsert(&self, text_id: &str, envelope: &str) -> Result<StoredDocument, StoreError> {
        let now = BsonDateTime::now();
        let record = self
            .collection
            .find_one_and_update(
                doc! { "textId": text_id },
                doc! {
                    "$set": { "data": envelope, "updatedAt": now },
                    "$setOnInsert": { "createdAt": now },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| StoreError::Backend("upsert returned no document".into()))?;

        record.try_into()
    }

    async fn find_by_identifier(
        &self,
        text_id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.collection
            .find_one(doc! { "textId": text_id })
            .await?
            .map(StoredDocument::try_from)
            .transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

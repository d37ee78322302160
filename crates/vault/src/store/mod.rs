//! Document persistence behind an upsert-by-identifier contract.
//!
//! # Responsibilities
//!
//! - Persist `{textId, envelope}` pairs, creating the record on first write and
//!   replacing the envelope on later writes.
//! - Maintain `createdAt` (set once) and `updatedAt` (set on every write).
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** Stores only ever see envelopes, never
//!   plaintext or keys.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StoreBackend};

/// Errors produced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A persisted document. `data` holds the ciphertext envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub text_id: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Async persistence boundary used by the document service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace the envelope stored under `text_id` and return the
    /// record as it exists after the write.
    async fn upsert(&self, text_id: &str, envelope: &str) -> Result<StoredDocument, StoreError>;

    /// Look up the record stored under `text_id`.
    async fn find_by_identifier(&self, text_id: &str)
        -> Result<Option<StoredDocument>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build the storage backend selected by `cfg.store_backend`.
///
/// # Errors
///
/// Returns an error if the MongoDB connection string is missing or invalid,
/// or if the unique `textId` index cannot be created.
pub async fn connect(cfg: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match cfg.store_backend {
        StoreBackend::Memory => {
            info!("using in-memory document store; documents are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Mongodb => {
            let uri = cfg
                .db_url
                .as_deref()
                .context("DB_URL is required for the mongodb store backend")?;
            let store = MongoStore::connect(uri, &cfg.db_name)
                .await
                .context("failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
    }
}

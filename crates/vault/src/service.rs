//! The store/retrieve boundary between the HTTP layer and the crypto + storage
//! core.
//!
//! Every document written is decrypted again before it is returned, so a
//! successful `store` proves that the persisted envelope can be read back.

use std::sync::Arc;

use common::{protocol::DocumentView, ServiceError};
use tracing::{debug, error, warn};

use crate::crypto::{CipherCodec, CipherError};
use crate::store::{DocumentStore, StoreError, StoredDocument};

/// Encrypts documents on the way into the store and decrypts them on the way out.
#[derive(Clone)]
pub struct DocumentService {
    codec: CipherCodec,
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(codec: CipherCodec, store: Arc<dyn DocumentStore>) -> Self {
        Self { codec, store }
    }

    /// Encrypt `plaintext` under `text_id` and upsert it.
    ///
    /// An empty `plaintext` is stored as an empty envelope.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::BadRequest`] if `text_id` is empty.
    /// - [`ServiceError::Storage`] if the upsert fails.
    /// - [`ServiceError::DecryptionFailed`] if the record returned by the store
    ///   cannot be decrypted.
    pub async fn store(&self, text_id: &str, plaintext: &str) -> Result<DocumentView, ServiceError> {
        ensure_identifier(text_id)?;

        let envelope = self.codec.encrypt(plaintext, text_id);
        let stored = self
            .store
            .upsert(text_id, &envelope)
            .await
            .map_err(storage_failure)?;

        debug!(text_id, "document stored");
        self.open(stored)
    }

    /// Fetch and decrypt the document stored under `text_id`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if nothing is stored under `text_id`.
    /// - [`ServiceError::Storage`] if the lookup fails.
    /// - [`ServiceError::DecryptionFailed`] if the stored envelope is malformed
    ///   or rejected by the cipher.
    pub async fn retrieve(&self, text_id: &str) -> Result<DocumentView, ServiceError> {
        ensure_identifier(text_id)?;

        let stored = self
            .store
            .find_by_identifier(text_id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| ServiceError::NotFound(text_id.to_owned()))?;

        self.open(stored)
    }

    /// Returns `true` if the document store answers a ping.
    pub async fn is_ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "document store ping failed");
                false
            }
        }
    }

    fn open(&self, stored: StoredDocument) -> Result<DocumentView, ServiceError> {
        let data = self
            .codec
            .decrypt(&stored.data, &stored.text_id)
            .map_err(|e| {
                match e {
                    CipherError::Format(_) => {
                        warn!(text_id = %stored.text_id, cause = %e, "stored envelope is malformed")
                    }
                    CipherError::Decryption(_) => {
                        warn!(text_id = %stored.text_id, cause = %e, "stored envelope rejected by cipher")
                    }
                }
                ServiceError::DecryptionFailed
            })?;

        Ok(DocumentView {
            text_id: stored.text_id,
            data,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}

fn ensure_identifier(text_id: &str) -> Result<(), ServiceError> {
    if text_id.is_empty() {
        return Err(ServiceError::BadRequest("textId is required".into()));
    }
    Ok(())
}

fn storage_failure(e: StoreError) -> ServiceError {
    error!(error = %e, "document store operation failed");
    ServiceError::Storage
}

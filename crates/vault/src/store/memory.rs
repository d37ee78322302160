//! [`MemoryStore`]: process-local document store for development and tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, StoredDocument};

/// Thread-safe in-memory map of documents keyed by `textId`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(&self, text_id: &str, envelope: &str) -> Result<StoredDocument, StoreError> {
        let now = Utc::now();
        let mut docs = self.inner.write().await;
        let doc = docs
            .entry(text_id.to_owned())
            .and_modify(|doc| {
                doc.data = envelope.to_owned();
                doc.updated_at = now;
            })
            .or_insert_with(|| StoredDocument {
                text_id: text_id.to_owned(),
                data: envelope.to_owned(),
                created_at: now,
                updated_at: now,
            });
        Ok(doc.clone())
    }

    async fn find_by_identifier(
        &self,
        text_id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.inner.read().await.get(text_id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initially_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.find_by_identifier("doc1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let store = MemoryStore::new();
        let first = store.upsert("doc1", "aa:bb").await.unwrap();
        assert_eq!(first.data, "aa:bb");
        assert_eq!(first.created_at, first.updated_at);

        let second = store.upsert("doc1", "cc:dd").await.unwrap();
        assert_eq!(second.data, "cc:dd");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.len().await, 1);

        let found = store.find_by_identifier("doc1").await.unwrap().unwrap();
        assert_eq!(found, second);
    }

    #[tokio::test]
    async fn identifiers_are_independent() {
        let store = MemoryStore::new();
        store.upsert("a", "1").await.unwrap();
        store.upsert("b", "2").await.unwrap();
        assert_eq!(store.find_by_identifier("a").await.unwrap().unwrap().data, "1");
        assert_eq!(store.find_by_identifier("b").await.unwrap().unwrap().data, "2");
    }

    #[tokio::test]
    async fn concurrent_upserts_keep_one_record() {
        let store = MemoryStore::new();
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert("shared", &format!("v{i}")).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        assert_eq!(store.len().await, 1);
    }
}

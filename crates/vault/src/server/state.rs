//! Shared application state injected into every Axum handler.

use axum::http::HeaderValue;

use crate::service::DocumentService;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-backed or small values) so that
/// Axum can clone the state for each request.
#[derive(Clone)]
pub struct AppState {
    /// Encrypting front of the document store.
    pub documents: DocumentService,
    /// The single origin allowed by the CORS layer.
    pub allowed_origin: HeaderValue,
}

impl AppState {
    pub fn new(documents: DocumentService, allowed_origin: HeaderValue) -> Self {
        Self {
            documents,
            allowed_origin,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::crypto::{CipherCodec, KeyDeriver, ServerSecret};
    use crate::store::{DocumentStore, MemoryStore};

    pub const TEST_ORIGIN: &str = "http://localhost:5173";

    /// State over an in-memory store with a fixed test secret.
    pub fn in_memory_state() -> AppState {
        state_with_store(Arc::new(MemoryStore::new()))
    }

    pub fn state_with_store(store: Arc<dyn DocumentStore>) -> AppState {
        let codec = CipherCodec::new(KeyDeriver::new(ServerSecret::new("s3cr3t")));
        AppState::new(
            DocumentService::new(codec, store),
            HeaderValue::from_static(TEST_ORIGIN),
        )
    }
}

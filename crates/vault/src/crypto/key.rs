//! Per-document key derivation.
//!
//! `key = SHA-256(identifier || secret)`, both taken as UTF-8 bytes with no
//! separator. The derived key is never stored; every encrypt/decrypt call
//! recomputes it.

use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Process-wide server secret mixed into every derived key.
///
/// Loaded once from configuration and injected into [`KeyDeriver`]. The value
/// is never printed, not even through `Debug`.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct ServerSecret(String);

impl ServerSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns `true` if the secret is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServerSecret([REDACTED])")
    }
}

/// A 256-bit key derived for a single document.
///
/// The buffer is overwritten with zeroes on drop.
pub struct DerivedKey(Box<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Turns a document identifier into its AES-256 key.
///
/// Cheap to clone; the secret is shared read-only behind an `Arc`.
#[derive(Clone, Debug)]
pub struct KeyDeriver {
    secret: Arc<ServerSecret>,
}

impl KeyDeriver {
    pub fn new(secret: ServerSecret) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }

    /// Derive the key for `identifier`.
    ///
    /// Deterministic: the same identifier and secret always produce the same
    /// key. Callers are responsible for rejecting empty identifiers.
    pub fn derive(&self, identifier: &str) -> DerivedKey {
        let digest = Sha256::new()
            .chain_update(identifier.as_bytes())
            .chain_update(self.secret.as_bytes())
            .finalize();

        let mut key = Box::new([0u8; KEY_LEN]);
        key.copy_from_slice(&digest);
        DerivedKey(key)
    }
}

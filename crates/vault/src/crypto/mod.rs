//! Per-document encryption primitives.
//!
//! This module is intentionally free of storage and HTTP dependencies.
//!
//! # Envelope format
//!
//! ```text
//! <hex(iv), 32 chars>:<hex(aes-256-cbc/pkcs7 ciphertext)>
//! ```
//!
//! Envelopes are persisted verbatim; changing this layout makes existing
//! documents unreadable.

pub mod cipher;
pub mod key;

pub use cipher::{CipherCodec, CipherError};
pub use key::{KeyDeriver, ServerSecret};

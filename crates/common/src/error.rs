//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::DecryptionFailed`] → 500
/// - [`ServiceError::Storage`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing `textId`, missing `data`, or invalid JSON.
    #[error("{0}")]
    BadRequest(String),

    /// No document is stored under the requested identifier.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A stored envelope could not be turned back into plaintext.
    ///
    /// Malformed envelopes and cipher rejections are deliberately reported
    /// the same way; the distinction only exists in the server logs.
    #[error("Failed to decrypt data")]
    DecryptionFailed,

    /// The document store rejected the operation or could not be reached.
    #[error("storage backend error")]
    Storage,
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::DecryptionFailed => 500,
            ServiceError::Storage => 500,
        }
    }
}

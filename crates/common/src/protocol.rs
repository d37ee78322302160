//! Request and response types exchanged over the public HTTP API.
//!
//! Field names are camelCase on the wire (`textId`, `createdAt`, ...) so that
//! existing browser clients keep working unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Request body for `POST /api/documents`.
///
/// Both fields are optional at the serde level so that the handler can report
/// exactly which one is missing instead of returning a generic rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocumentRequest {
    /// Caller-supplied document identifier.
    #[serde(default)]
    pub text_id: Option<String>,
    /// Plaintext to encrypt and store. An empty string is a valid payload.
    #[serde(default)]
    pub data: Option<String>,
}

/// A document as returned to callers, with `data` already decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub text_id: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Successful response body for `POST /api/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocumentResponse {
    pub success: bool,
    pub message: String,
    pub document: DocumentView,
}

impl StoreDocumentResponse {
    pub fn saved(document: DocumentView) -> Self {
        Self {
            success: true,
            message: "Document saved successfully".into(),
            document,
        }
    }
}

/// Successful response body for `GET /api/documents/:textId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDocumentResponse {
    pub success: bool,
    pub document: DocumentView,
}

impl GetDocumentResponse {
    pub fn found(document: DocumentView) -> Self {
        Self {
            success: true,
            document,
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short human-readable error summary (e.g. `"Document not found"`).
    pub error: String,
    /// Optional detail, only present for server-side failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] with no detail message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    /// Attach a detail message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the document store answered a ping.
    pub store_ready: bool,
}

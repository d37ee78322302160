//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ErrorResponse, GetDocumentResponse, HealthResponse, StoreDocumentRequest,
        StoreDocumentResponse,
    },
    ServiceError,
};
use tracing::error;

use super::state::AppState;

/// `GET /` — plain-text liveness banner.
pub async fn root() -> &'static str {
    "Server is running!!"
}

/// `POST /api/documents` — encrypt and upsert a document.
///
/// `textId` must be a non-empty string and `data` must be present (an empty
/// string is allowed). The response echoes the stored document with `data`
/// decrypted from what was actually persisted.
pub async fn store_document(
    State(state): State<AppState>,
    body: Result<Json<StoreDocumentRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let err = ErrorResponse::new("invalid JSON body").with_message(rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    let text_id = match req.text_id {
        Some(id) if !id.is_empty() => id,
        _ => return bad_request("textId is required"),
    };
    let Some(data) = req.data else {
        return bad_request("data field is required");
    };

    match state.documents.store(&text_id, &data).await {
        Ok(document) => {
            (StatusCode::OK, Json(StoreDocumentResponse::saved(document))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// `GET /api/documents/:text_id` — fetch and decrypt a document.
pub async fn get_document(
    State(state): State<AppState>,
    Path(text_id): Path<String>,
) -> Response {
    match state.documents.retrieve(&text_id).await {
        Ok(document) => (StatusCode::OK, Json(GetDocumentResponse::found(document))).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the document store answers a ping.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let store_ready = state.documents.is_ready().await;

    let (status_code, status_str) = if store_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        store_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

/// Map a [`ServiceError`] to its HTTP response.
///
/// Client errors carry only a short summary. Server errors are reported as
/// `Internal server error` with the error's display text as detail, which for
/// decryption failures is deliberately generic.
fn error_response(e: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match &e {
        ServiceError::BadRequest(message) => ErrorResponse::new(message.as_str()),
        ServiceError::NotFound(_) => ErrorResponse::new("Document not found"),
        ServiceError::DecryptionFailed | ServiceError::Storage => {
            error!(error = %e, "request failed");
            ErrorResponse::new("Internal server error").with_message(e.to_string())
        }
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum_test::TestServer;
    use chrono::Utc;
    use serde_json::{json, Value};

    use crate::server::router;
    use crate::server::state::test_support::{in_memory_state, state_with_store};
    use crate::store::{MockDocumentStore, StoreError, StoredDocument};

    fn server() -> TestServer {
        TestServer::new(router::build(in_memory_state())).unwrap()
    }

    fn is_envelope(s: &str) -> bool {
        let Some((iv, ct)) = s.split_once(':') else {
            return false;
        };
        let hex = |f: &str| !f.is_empty() && f.chars().all(|c| c.is_ascii_hexdigit());
        iv.len() == 32 && hex(iv) && hex(ct) && ct.len() % 2 == 0
    }

    #[tokio::test]
    async fn store_and_fetch_document() {
        let server = server();

        let resp = server
            .post("/api/documents")
            .json(&json!({"textId": "doc1", "data": "hello world"}))
            .await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Document saved successfully");
        assert_eq!(body["document"]["textId"], "doc1");
        assert_eq!(body["document"]["data"], "hello world");
        assert!(body["document"]["createdAt"].is_string());
        assert!(body["document"]["updatedAt"].is_string());

        let resp = server.get("/api/documents/doc1").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["document"]["data"], "hello world");
    }

    #[tokio::test]
    async fn second_post_replaces_document() {
        let state = in_memory_state();
        let documents = state.documents.clone();
        let server = TestServer::new(router::build(state)).unwrap();

        let first: Value = server
            .post("/api/documents")
            .json(&json!({"textId": "doc1", "data": "hello world"}))
            .await
            .json();

        server
            .post("/api/documents")
            .json(&json!({"textId": "doc1", "data": "updated"}))
            .await
            .assert_status_ok();
        assert_eq!(documents.retrieve("doc1").await.unwrap().data, "updated");

        let resp = server.get("/api/documents/doc1").await;
        let body: Value = resp.json();
        assert_eq!(body["document"]["data"], "updated");
        assert_eq!(body["document"]["createdAt"], first["document"]["createdAt"]);
    }

    #[tokio::test]
    async fn upsert_sends_envelope_to_store() {
        let mut mock = MockDocumentStore::new();
        mock.expect_upsert()
            .withf(|_, envelope| is_envelope(envelope))
            .times(1)
            .returning(|id, envelope| {
                let now = Utc::now();
                Ok(StoredDocument {
                    text_id: id.to_owned(),
                    data: envelope.to_owned(),
                    created_at: now,
                    updated_at: now,
                })
            });
        let server = TestServer::new(router::build(state_with_store(Arc::new(mock)))).unwrap();

        let resp = server
            .post("/api/documents")
            .json(&json!({"textId": "doc1", "data": "hello world"}))
            .await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<Value>()["document"]["data"], "hello world");
    }

    #[tokio::test]
    async fn missing_document_returns_404() {
        let resp = server().get("/api/documents/missing").await;
        resp.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(resp.json::<Value>(), json!({"error": "Document not found"}));
    }

    #[tokio::test]
    async fn empty_data_is_accepted() {
        let server = server();
        let resp = server
            .post("/api/documents")
            .json(&json!({"textId": "blank", "data": ""}))
            .await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<Value>()["document"]["data"], "");

        let resp = server.get("/api/documents/blank").await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<Value>()["document"]["data"], "");
    }

    #[tokio::test]
    async fn missing_text_id_is_rejected() {
        let server = server();
        for body in [json!({"data": "x"}), json!({"textId": "", "data": "x"})] {
            let resp = server.post("/api/documents").json(&body).await;
            resp.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(resp.json::<Value>(), json!({"error": "textId is required"}));
        }
    }

    #[tokio::test]
    async fn missing_data_is_rejected() {
        let server = server();
        for body in [json!({"textId": "doc1"}), json!({"textId": "doc1", "data": null})] {
            let resp = server.post("/api/documents").json(&body).await;
            resp.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(
                resp.json::<Value>(),
                json!({"error": "data field is required"})
            );
        }
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let resp = server()
            .post("/api/documents")
            .text("{not json")
            .content_type("application/json")
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<Value>()["error"], "invalid JSON body");
    }

    #[tokio::test]
    async fn undecryptable_record_returns_generic_500() {
        let mut mock = MockDocumentStore::new();
        mock.expect_find_by_identifier().returning(|id| {
            let now = Utc::now();
            Ok(Some(StoredDocument {
                text_id: id.to_owned(),
                data: "deadbeef:cafe".into(),
                created_at: now,
                updated_at: now,
            }))
        });
        let server = TestServer::new(router::build(state_with_store(Arc::new(mock)))).unwrap();

        let resp = server.get("/api/documents/doc1").await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.json::<Value>(),
            json!({"error": "Internal server error", "message": "Failed to decrypt data"})
        );
    }

    #[tokio::test]
    async fn storage_failure_returns_500_without_backend_detail() {
        let mut mock = MockDocumentStore::new();
        mock.expect_upsert()
            .returning(|_, _| Err(StoreError::Backend("replica set unreachable".into())));
        let server = TestServer::new(router::build(state_with_store(Arc::new(mock)))).unwrap();

        let resp = server
            .post("/api/documents")
            .json(&json!({"textId": "doc1", "data": "x"}))
            .await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json();
        assert_eq!(body["error"], "Internal server error");
        assert!(!body["message"].as_str().unwrap().contains("replica"));
    }

    #[tokio::test]
    async fn health_reports_store_down() {
        let mut mock = MockDocumentStore::new();
        mock.expect_ping()
            .returning(|| Err(StoreError::Backend("down".into())));
        let server = TestServer::new(router::build(state_with_store(Arc::new(mock)))).unwrap();

        let resp = server.get("/health").await;
        resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.json::<Value>()["store_ready"], false);
    }

    #[tokio::test]
    async fn root_banner() {
        let resp = server().get("/").await;
        resp.assert_status_ok();
        resp.assert_text("Server is running!!");
    }
}

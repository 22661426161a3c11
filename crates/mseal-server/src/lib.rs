//! HTTP adapter for MediaSeal.
//!
//! A thin axum front end over the two core services. No business logic lives
//! here: handlers parse the request, call
//! [`RegistrationService`](mseal_core::RegistrationService) or
//! [`VerificationService`](mseal_core::VerificationService), and shape the
//! result into JSON.
//!
//! Endpoints:
//! - `POST /v1/records`: raw file bytes in, `{id, digest, transaction}` out
//! - `GET /v1/records/{id}`: verification verdict, or 404 when the id is
//!   unknown to the store or ledger
//! - `GET /v1/health`, `GET /v1/info`

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::SealServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    use mseal_ledger::InMemoryLedger;
    use mseal_store::{ContentStore, InMemoryContentStore};
    use mseal_types::MediaType;

    use super::*;

    fn test_server() -> (Arc<InMemoryContentStore>, SealServer) {
        let store = Arc::new(InMemoryContentStore::new());
        let server = SealServer::with_collaborators(
            ServerConfig::default(),
            Arc::clone(&store) as Arc<dyn mseal_store::ContentStore>,
            Arc::new(InMemoryLedger::new()),
        );
        (store, server)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_record(bytes: &'static [u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/records")
            .header(header::CONTENT_TYPE, "video/mp4")
            .body(Body::from(bytes))
            .unwrap()
    }

    fn get_record(id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/v1/records/{id}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (_store, server) = test_server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (_store, server) = test_server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/v1/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["name"], "mseal-server");
    }

    #[tokio::test]
    async fn register_then_verify_roundtrip() {
        let (_store, server) = test_server();
        let router = server.router();

        let response = router.clone().oneshot(post_record(b"abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(
            body["digest"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let id = body["id"].as_str().unwrap().to_owned();

        let response = router.oneshot(get_record(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["tampered"], false);
        assert_eq!(body["current_digest"], body["stored_digest"]);
    }

    #[tokio::test]
    async fn tampered_store_content_flips_the_verdict() {
        let (store, server) = test_server();
        let router = server.router();

        let response = router.clone().oneshot(post_record(b"ABC")).await.unwrap();
        let body = json_body(response).await;
        let id = body["id"].as_str().unwrap().to_owned();
        let record_id = mseal_types::RecordId::parse(&id).unwrap();

        store.remove(&record_id);
        store
            .put(&record_id, b"ABD", &MediaType::mp4())
            .await
            .unwrap();

        let response = router.oneshot(get_record(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["tampered"], true);
        assert_ne!(body["current_digest"], body["stored_digest"]);
    }

    #[tokio::test]
    async fn unknown_id_returns_404() {
        let (_store, server) = test_server();
        let id = mseal_types::RecordId::generate().to_string();
        let response = server.router().oneshot(get_record(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("no stored content"));
    }

    #[tokio::test]
    async fn malformed_id_returns_400() {
        let (_store, server) = test_server();
        let response = server
            .router()
            .oneshot(get_record("not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_upload_returns_400() {
        let (_store, server) = test_server();
        let response = server.router().oneshot(post_record(b"")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn uploaded_media_type_is_stored_with_the_blob() {
        let (store, server) = test_server();
        let request = Request::builder()
            .method("POST")
            .uri("/v1/records")
            .header(header::CONTENT_TYPE, "video/quicktime")
            .body(Body::from(&b"mov bytes"[..]))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        let id = mseal_types::RecordId::parse(body["id"].as_str().unwrap()).unwrap();
        assert_eq!(
            store.media_type_of(&id).unwrap().as_str(),
            "video/quicktime"
        );
    }

    #[tokio::test]
    async fn disallowed_media_type_returns_415() {
        let (_store, server) = test_server();
        let request = Request::builder()
            .method("POST")
            .uri("/v1/records")
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(&b"png bytes"[..]))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn oversize_upload_is_rejected() {
        let store = Arc::new(InMemoryContentStore::new());
        let config = ServerConfig {
            max_upload_bytes: 16,
            ..ServerConfig::default()
        };
        let server = SealServer::with_collaborators(
            config,
            store as Arc<dyn mseal_store::ContentStore>,
            Arc::new(InMemoryLedger::new()),
        );
        let request = Request::builder()
            .method("POST")
            .uri("/v1/records")
            .header(header::CONTENT_TYPE, "video/mp4")
            .body(Body::from(vec![0u8; 64]))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use receiptlens_core::ReceiptResult;
use receiptlens_ocr::{build_http_client, ReceiptPipeline, Upload};

use crate::config::ServerConfig;
use crate::error::ApiError;

const FILE_FIELD: &str = "file";

/// Shared handler state. `pipeline` is `None` when no API key is configured;
/// uploads are then rejected before any outbound call.
#[derive(Clone)]
pub struct AppState {
    pipeline: Option<Arc<ReceiptPipeline>>,
}

impl AppState {
    pub fn new(pipeline: Option<ReceiptPipeline>) -> Self {
        Self { pipeline: pipeline.map(Arc::new) }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let pipeline = match &config.google.api_key {
            Some(key) => Some(ReceiptPipeline::google(
                build_http_client()?,
                key.clone(),
                &config.google.client,
                config.timeouts.stage_timeouts(),
            )),
            None => None,
        };
        Ok(Self::new(pipeline))
    }
}

pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/process-receipt", post(process_receipt))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn process_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReceiptResult>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Processing(e.body_text()))?;
    let upload = read_upload(&mut multipart).await?.ok_or(ApiError::NoFile)?;

    let pipeline = state.pipeline.as_ref().ok_or(ApiError::MissingCredentials)?;

    info!(file = %upload.file_name, mime = %upload.mime_type, bytes = upload.bytes.len(), "processing upload");
    Ok(Json(pipeline.extract(&upload).await))
}

/// The first `file` field of the form, if any.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "ignoring form field");
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Some(Upload::new(file_name, mime_type.as_deref(), bytes.to_vec())));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use receiptlens_ocr::{MockLanguageModel, MockReply, MockTextDetector, StageTimeouts};
    use tower::ServiceExt;

    const BOUNDARY: &str = "receiptlens-test-boundary";

    fn multipart_request(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content_type, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            if let Some(ct) = content_type {
                body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/process-receipt")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn failing_state() -> AppState {
        let pipeline = ReceiptPipeline::new(
            Arc::new(MockTextDetector::new(MockReply::Status(403))),
            Arc::new(MockLanguageModel::new(MockReply::Status(500), MockReply::Status(500))),
            StageTimeouts::default(),
        );
        AppState::new(Some(pipeline))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app(AppState::new(None), 1024)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn missing_file_is_bad_request() {
        let request = multipart_request(&[("note", None, None, &b"hello"[..])]);
        let response = app(failing_state(), 1 << 20).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No file provided"}));
    }

    #[tokio::test]
    async fn missing_key_is_server_error() {
        let request = multipart_request(&[("file", Some("r.png"), Some("image/png"), &b"png"[..])]);
        let response = app(AppState::new(None), 1 << 20).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "Google Cloud API key not configured"}));
    }

    #[tokio::test]
    async fn missing_file_checked_before_key() {
        let request = multipart_request(&[("note", None, None, &b"hello"[..])]);
        let response = app(AppState::new(None), 1 << 20).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_multipart_body_is_processing_error() {
        let request = Request::post("/api/process-receipt")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app(failing_state(), 1 << 20).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], json!("Failed to process receipt"));
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn exhausted_chain_still_returns_ok_placeholder() {
        let request = multipart_request(&[("file", Some("lunch.jpg"), Some("image/jpeg"), &b"\xff\xd8\xff"[..])]);
        let response = app(failing_state(), 1 << 20).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["confidence"], json!(0.3));
        assert!(body["rawText"].as_str().unwrap().contains("lunch.jpg"));
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn oversized_body_without_length_header_is_413() {
        let big = vec![7u8; 8192];
        let mut request = multipart_request(&[("file", Some("big.pdf"), Some("application/pdf"), &big[..])]);
        request.headers_mut().remove("content-length");

        let response = app(failing_state(), 1024).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await, json!({"error": "File too large"}));
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let big = vec![0u8; 4096];
        let request = multipart_request(&[("file", Some("big.png"), Some("image/png"), &big[..])]);
        let response = app(failing_state(), 1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

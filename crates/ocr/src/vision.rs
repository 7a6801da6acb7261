//! Google Cloud Vision `images:annotate` client (TEXT_DETECTION).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::TextDetector;
use crate::config::{ApiKey, API_KEY_HEADER};
use crate::error::{ensure_success, StageError};

const SERVICE: &str = "vision";

pub struct GoogleVisionClient {
    http: Client,
    base_url: String,
    api_key: ApiKey,
}

impl GoogleVisionClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self { http, base_url: base_url.into(), api_key }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/images:annotate", self.base_url.trim_end_matches('/'))
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    requests: [ImageRequest<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    image: ImageContent<'a>,
    features: [Feature; 1],
}

#[derive(Debug, Serialize)]
struct ImageContent<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

impl AnnotateResponse {
    /// The first annotation holds the full detected text.
    fn into_text(self) -> Option<String> {
        self.responses
            .into_iter()
            .next()?
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .filter(|d| !d.trim().is_empty())
    }
}

#[async_trait]
impl TextDetector for GoogleVisionClient {
    async fn detect_text(&self, content_base64: &str) -> Result<String, StageError> {
        let body = AnnotateRequest {
            requests: [ImageRequest {
                image: ImageContent { content: content_base64 },
                features: [Feature { kind: "TEXT_DETECTION", max_results: 1 }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|source| StageError::transport(SERVICE, source))?;
        let response = ensure_success(SERVICE, response).await?;

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|source| StageError::transport(SERVICE, source))?;

        let text = parsed.into_text().ok_or(StageError::NoTextDetected)?;
        debug!(chars = text.len(), "vision detected text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = AnnotateRequest {
            requests: [ImageRequest {
                image: ImageContent { content: "QUJD" },
                features: [Feature { kind: "TEXT_DETECTION", max_results: 1 }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "requests": [{
                    "image": {"content": "QUJD"},
                    "features": [{"type": "TEXT_DETECTION", "maxResults": 1}]
                }]
            })
        );
    }

    #[test]
    fn first_annotation_is_the_text() {
        let r: AnnotateResponse = serde_json::from_value(json!({
            "responses": [{
                "textAnnotations": [
                    {"description": "SAFEWAY\nTOTAL 9.99", "locale": "en"},
                    {"description": "SAFEWAY"}
                ]
            }]
        }))
        .unwrap();
        assert_eq!(r.into_text().as_deref(), Some("SAFEWAY\nTOTAL 9.99"));
    }

    #[test]
    fn missing_annotations_yield_none() {
        let r: AnnotateResponse = serde_json::from_value(json!({"responses": [{}]})).unwrap();
        assert!(r.into_text().is_none());
        let r: AnnotateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(r.into_text().is_none());
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let c = GoogleVisionClient::new(Client::new(), "http://localhost:9/", ApiKey::new("k").unwrap());
        assert_eq!(c.endpoint(), "http://localhost:9/v1/images:annotate");
    }

    #[tokio::test]
    async fn transport_error_does_not_carry_the_key() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let c = GoogleVisionClient::new(Client::new(), format!("http://{addr}"), ApiKey::new("SUPER-SECRET-KEY").unwrap());

        let err = c.detect_text("QUJD").await.unwrap_err();

        assert!(matches!(err, StageError::Transport { service: "vision", .. }));
        let msg = err.to_string();
        assert!(!msg.contains("SUPER-SECRET-KEY"), "got: {msg}");
        assert!(!msg.contains("images:annotate"), "got: {msg}");
    }
}

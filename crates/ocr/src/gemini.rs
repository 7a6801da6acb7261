//! Gemini `generateContent` client, used for both text-only and multimodal calls.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::LanguageModel;
use crate::config::{ApiKey, GoogleConfig, API_KEY_HEADER};
use crate::error::{ensure_success, StageError};
use crate::types::InlineContent;

const SERVICE: &str = "gemini";

pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    api_key: ApiKey,
}

impl GeminiClient {
    pub fn new(http: Client, config: &GoogleConfig, api_key: ApiKey) -> Self {
        Self {
            http,
            base_url: config.gemini_base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request<'a>(&self, prompt: &'a str, inline: Option<InlineContent<'a>>) -> GenerateRequest<'a> {
        let mut parts = vec![Part::Text { text: prompt }];
        if let Some(content) = inline {
            parts.push(Part::Inline {
                inline_data: InlineData { mime_type: content.mime_type, data: content.data_base64 },
            });
        }
        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, or empty.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str, inline: Option<InlineContent<'_>>) -> Result<String, StageError> {
        let multimodal = inline.is_some();
        let body = self.request(prompt, inline);

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|source| StageError::transport(SERVICE, source))?;
        let response = ensure_success(SERVICE, response).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|source| StageError::transport(SERVICE, source))?;
        let text = parsed.into_text();
        debug!(model = %self.model, multimodal, chars = text.len(), "gemini responded");
        Ok(text)
    }
}

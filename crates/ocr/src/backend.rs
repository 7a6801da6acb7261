use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::StageError;
use crate::types::InlineContent;

/// Abstraction over an OCR text-detection service.
/// Implementations accept base64 document content and return the detected text.
#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect_text(&self, content_base64: &str) -> Result<String, StageError>;
}

/// Abstraction over a generative language model.
///
/// `inline` is `None` for a text-only call and carries the document for a
/// multimodal call. The returned string is the model's raw generated text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, inline: Option<InlineContent<'_>>) -> Result<String, StageError>;
}

// ── Mock backends (always available, used for tests) ─────────────────────────

/// Scripted outcome of a mock call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Fails as if the service returned this HTTP status.
    Status(u16),
    /// Never completes; exercises stage timeouts.
    Hang,
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    async fn play(&self, service: &'static str) -> Result<String, StageError> {
        match self {
            MockReply::Text(t) => Ok(t.clone()),
            MockReply::Status(status) => Err(StageError::Upstream {
                service,
                status: *status,
                body: "mock failure".to_string(),
            }),
            MockReply::Hang => std::future::pending().await,
        }
    }
}

/// Returns a preset reply and counts calls.
pub struct MockTextDetector {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockTextDetector {
    pub fn new(reply: MockReply) -> Self {
        Self { reply, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextDetector for MockTextDetector {
    async fn detect_text(&self, _content_base64: &str) -> Result<String, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply.play("mock-ocr").await? {
            t if t.is_empty() => Err(StageError::NoTextDetected),
            t => Ok(t),
        }
    }
}

/// Separate scripted replies for text-only and multimodal calls.
pub struct MockLanguageModel {
    text_reply: MockReply,
    multimodal_reply: MockReply,
    text_calls: AtomicUsize,
    multimodal_calls: AtomicUsize,
    last_inline: Mutex<Option<(String, String)>>,
    last_prompt: Mutex<Option<String>>,
}

impl MockLanguageModel {
    pub fn new(text_reply: MockReply, multimodal_reply: MockReply) -> Self {
        Self {
            text_reply,
            multimodal_reply,
            text_calls: AtomicUsize::new(0),
            multimodal_calls: AtomicUsize::new(0),
            last_inline: Mutex::new(None),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn multimodal_calls(&self) -> usize {
        self.multimodal_calls.load(Ordering::SeqCst)
    }

    /// `(mime_type, data_base64)` of the most recent multimodal call.
    pub fn last_inline(&self) -> Option<(String, String)> {
        self.last_inline.lock().ok().and_then(|g| g.clone())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn generate(&self, prompt: &str, inline: Option<InlineContent<'_>>) -> Result<String, StageError> {
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        match inline {
            Some(content) => {
                self.multimodal_calls.fetch_add(1, Ordering::SeqCst);
                if let Ok(mut last) = self.last_inline.lock() {
                    *last = Some((content.mime_type.to_string(), content.data_base64.to_string()));
                }
                self.multimodal_reply.play("mock-llm").await
            }
            None => {
                self.text_calls.fetch_add(1, Ordering::SeqCst);
                self.text_reply.play("mock-llm").await
            }
        }
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, info_span, warn, Instrument};

use receiptlens_core::{ExtractionPath, ReceiptResult};

use crate::backend::{LanguageModel, TextDetector};
use crate::config::{ApiKey, GoogleConfig, StageTimeouts};
use crate::error::StageError;
use crate::fallback;
use crate::gemini::GeminiClient;
use crate::hash;
use crate::parse::parse_model_output;
use crate::prompts;
use crate::types::{InlineContent, Stage, Upload};
use crate::vision::GoogleVisionClient;

/// `raw_text` for results read directly from the document.
pub const DIRECT_RAW_TEXT: &str = "Processed directly by Gemini AI (no OCR text available)";

/// The result of one extraction together with every stage failure on the way.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub result: ReceiptResult,
    pub failures: Vec<(Stage, StageError)>,
}

/// Orchestrates: OCR → structure, else direct document read, else placeholder.
///
/// Stages run strictly in order and stop at the first success. Every upstream
/// call is bounded by a timeout from [`StageTimeouts`].
pub struct ReceiptPipeline {
    detector: Arc<dyn TextDetector>,
    model: Arc<dyn LanguageModel>,
    timeouts: StageTimeouts,
}

impl ReceiptPipeline {
    pub fn new(detector: Arc<dyn TextDetector>, model: Arc<dyn LanguageModel>, timeouts: StageTimeouts) -> Self {
        Self { detector, model, timeouts }
    }

    /// Wire the Google Vision and Gemini clients with one shared HTTP client.
    pub fn google(http: reqwest::Client, api_key: ApiKey, config: &GoogleConfig, timeouts: StageTimeouts) -> Self {
        let detector = GoogleVisionClient::new(http.clone(), config.vision_base_url.clone(), api_key.clone());
        let model = GeminiClient::new(http, config, api_key);
        Self::new(Arc::new(detector), Arc::new(model), timeouts)
    }

    /// Always returns a result; upstream failures only select a weaker path.
    pub async fn extract(&self, upload: &Upload) -> ReceiptResult {
        self.extract_with_outcome(upload).await.result
    }

    pub async fn extract_with_outcome(&self, upload: &Upload) -> ExtractionOutcome {
        let span = info_span!(
            "extract",
            file = %upload.file_name,
            mime = %upload.mime_type,
            bytes = upload.bytes.len(),
            digest = %hash::upload_digest(&upload.bytes),
        );
        self.run_chain(upload).instrument(span).await
    }

    async fn run_chain(&self, upload: &Upload) -> ExtractionOutcome {
        let encoded = STANDARD.encode(&upload.bytes);
        let mut failures = Vec::new();

        match self.ocr_path(&encoded).await {
            Ok(result) => return finish(result, failures),
            Err((stage, e)) => {
                warn!(%stage, error = %e, "OCR path failed, trying direct document read");
                failures.push((stage, e));
            }
        }

        match self.direct_path(&encoded, &upload.mime_type).await {
            Ok(result) => return finish(result, failures),
            Err(e) => {
                warn!(stage = %Stage::Direct, error = %e, "direct read failed, using placeholder");
                failures.push((Stage::Direct, e));
            }
        }

        let today = chrono::Local::now().date_naive();
        finish(fallback::placeholder(&upload.file_name, today), failures)
    }

    async fn ocr_path(&self, encoded: &str) -> Result<ReceiptResult, (Stage, StageError)> {
        let text = bounded(Stage::Ocr, self.timeouts.ocr, self.detector.detect_text(encoded))
            .await
            .map_err(|e| (Stage::Ocr, e))?;
        // Never ask the model to structure nothing.
        if text.trim().is_empty() {
            return Err((Stage::Ocr, StageError::NoTextDetected));
        }

        let prompt = prompts::text_structuring_prompt(&text);
        let response = bounded(Stage::Structuring, self.timeouts.model, self.model.generate(&prompt, None))
            .await
            .map_err(|e| (Stage::Structuring, e))?;
        let fields = parse_model_output(&response).map_err(|e| (Stage::Structuring, e))?;

        Ok(ReceiptResult::from_fields(fields, ExtractionPath::OcrStructured, text))
    }

    async fn direct_path(&self, encoded: &str, mime_type: &str) -> Result<ReceiptResult, StageError> {
        let prompt = prompts::direct_document_prompt();
        let inline = InlineContent { mime_type, data_base64: encoded };
        let response = bounded(Stage::Direct, self.timeouts.model, self.model.generate(&prompt, Some(inline))).await?;
        let fields = parse_model_output(&response)?;

        Ok(ReceiptResult::from_fields(fields, ExtractionPath::DirectMultimodal, DIRECT_RAW_TEXT))
    }
}

fn finish(result: ReceiptResult, failures: Vec<(Stage, StageError)>) -> ExtractionOutcome {
    let path = result.path().unwrap_or(ExtractionPath::Placeholder);
    info!(%path, confidence = result.confidence(), items = result.items().len(), "receipt extracted");
    ExtractionOutcome { result, failures }
}

async fn bounded<F>(stage: Stage, limit: Duration, call: F) -> Result<String, StageError>
where
    F: Future<Output = Result<String, StageError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(StageError::Timeout { stage, elapsed_ms: limit.as_millis() as u64 }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

use crate::types::Stage;

/// Why a single stage of the fallback chain did not produce a result.
///
/// These never reach the HTTP caller; the pipeline logs them and moves on to
/// the next stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// The service answered with a non-success status.
    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The request could not be sent or the response body could not be read.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// OCR succeeded but found no text.
    #[error("No text detected in the image")]
    NoTextDetected,

    /// The model response held no usable receipt JSON.
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("{stage} call timed out after {elapsed_ms}ms")]
    Timeout { stage: Stage, elapsed_ms: u64 },
}

impl StageError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        StageError::MalformedModelOutput(reason.into())
    }

    /// Wrap a reqwest failure with the request URL removed, so nothing from
    /// the URL ends up in logs.
    pub(crate) fn transport(service: &'static str, source: reqwest::Error) -> Self {
        StageError::Transport { service, source: source.without_url() }
    }
}

/// Pass a successful response through; turn anything else into [`StageError::Upstream`].
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, StageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StageError::Upstream { service, status: status.as_u16(), body })
}

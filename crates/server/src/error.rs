use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to the HTTP caller. Upstream service failures never appear
/// here; the extraction pipeline absorbs them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file provided")]
    NoFile,

    #[error("Google Cloud API key not configured")]
    MissingCredentials,

    /// The upload exceeded the body limit while it was being streamed.
    #[error("File too large")]
    PayloadTooLarge,

    /// Anything unexpected while reading the request.
    #[error("Failed to process receipt")]
    Processing(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MissingCredentials | ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Processing(details) => {
                error!(%details, "error processing receipt");
                Some(details.clone())
            }
            ApiError::MissingCredentials => {
                error!("rejecting upload: Google Cloud API key not configured");
                None
            }
            ApiError::NoFile | ApiError::PayloadTooLarge => None,
        };
        (status, Json(ErrorBody { error: self.to_string(), details })).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            _ => ApiError::Processing(e.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::NoFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingCredentials.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::Processing("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn body_shape() {
        let body = ErrorBody { error: ApiError::NoFile.to_string(), details: None };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"No file provided"}"#);

        let body = ErrorBody {
            error: ApiError::Processing("boom".into()).to_string(),
            details: Some("boom".into()),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Failed to process receipt","details":"boom"}"#
        );
    }
}

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Request header carrying the API key for both Google services.
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

/// A Google Cloud API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or whitespace-only key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        (!key.is_empty()).then_some(ApiKey(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Endpoints and generation settings for the Google services.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoogleConfig {
    pub vision_base_url: String,
    pub gemini_base_url: String,
    pub model: String,
    /// Low temperature keeps the model close to what is printed on the receipt.
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            vision_base_url: "https://vision.googleapis.com".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.1,
            max_output_tokens: 1000,
        }
    }
}

/// Upper bound on each upstream call. A call that exceeds it fails its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub ocr: Duration,
    pub model: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self { ocr: Duration::from_secs(30), model: Duration::from_secs(45) }
    }
}

/// Shared HTTP client for both Google services.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("receiptlens/", env!("CARGO_PKG_VERSION")))
        .build()
}

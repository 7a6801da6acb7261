use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use receiptlens_ocr::{ApiKey, GoogleConfig, StageTimeouts};

pub const CONFIG_PATH_VAR: &str = "RECEIPTLENS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "receiptlens.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Server settings: TOML file first, then environment overrides.
///
/// ```toml
/// bind = "0.0.0.0:3000"
/// body_limit_bytes = 20971520
///
/// [google]
/// api_key = "..."
/// model = "gemini-1.5-flash"
///
/// [timeouts]
/// ocr_secs = 30
/// model_secs = 45
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub body_limit_bytes: usize,
    pub google: GoogleSection,
    pub timeouts: TimeoutsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleSection {
    #[serde(default, deserialize_with = "api_key")]
    pub api_key: Option<ApiKey>,
    #[serde(flatten)]
    pub client: GoogleConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TimeoutsSection {
    pub ocr_secs: u64,
    pub model_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            body_limit_bytes: 20 * 1024 * 1024,
            google: GoogleSection::default(),
            timeouts: TimeoutsSection::default(),
        }
    }
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        let d = StageTimeouts::default();
        Self { ocr_secs: d.ocr.as_secs(), model_secs: d.model.as_secs() }
    }
}

impl TimeoutsSection {
    pub fn stage_timeouts(&self) -> StageTimeouts {
        StageTimeouts {
            ocr: Duration::from_secs(self.ocr_secs),
            model: Duration::from_secs(self.model_secs),
        }
    }
}

fn api_key<'de, D>(deserializer: D) -> Result<Option<ApiKey>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(ApiKey::new))
}

impl ServerConfig {
    /// Load from `$RECEIPTLENS_CONFIG`, or `receiptlens.toml` when present, then
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        let config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `GOOGLE_CLOUD_API_KEY`, `RECEIPTLENS_BIND` and
    /// `RECEIPTLENS_BODY_LIMIT_BYTES` from `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = lookup("GOOGLE_CLOUD_API_KEY").and_then(ApiKey::new) {
            self.google.api_key = Some(key);
        }
        if let Some(bind) = lookup("RECEIPTLENS_BIND") {
            self.bind = bind;
        }
        if let Some(limit) = lookup("RECEIPTLENS_BODY_LIMIT_BYTES") {
            self.body_limit_bytes = limit
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "RECEIPTLENS_BODY_LIMIT_BYTES", value: limit })?;
        }
        Ok(self)
    }
}

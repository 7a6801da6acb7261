pub mod backend;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod hash;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod types;
pub mod vision;

pub use backend::{LanguageModel, MockLanguageModel, MockReply, MockTextDetector, TextDetector};
pub use config::{build_http_client, ApiKey, GoogleConfig, StageTimeouts};
pub use error::StageError;
pub use fallback::placeholder;
pub use gemini::GeminiClient;
pub use parse::parse_model_output;
pub use pipeline::{ExtractionOutcome, ReceiptPipeline};
pub use types::{InlineContent, Stage, Upload};
pub use vision::GoogleVisionClient;

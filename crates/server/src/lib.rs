pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::{app, AppState};

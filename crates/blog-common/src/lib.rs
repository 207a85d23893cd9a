//! # blog-common
//!
//! Shared utilities including configuration, telemetry, and the session context.

pub mod config;
pub mod session;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    ApiConfig, AppSettings, ClientConfig, ConfigError, Environment, FeedConfig, UploadConfig,
};
pub use session::{Session, SessionState};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};

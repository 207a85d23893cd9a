//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub feeds: FeedConfig,
    pub uploads: UploadConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// REST backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:3000`
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Page sizes for the paginated feeds
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: u32,
    #[serde(default = "default_author_posts_per_page")]
    pub author_posts_per_page: u32,
    #[serde(default = "default_comments_per_page")]
    pub comments_per_page: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            author_posts_per_page: default_author_posts_per_page(),
            comments_per_page: default_comments_per_page(),
        }
    }
}

/// Upload limits
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_picture_bytes")]
    pub max_picture_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_picture_bytes: default_max_picture_bytes(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "blog-client".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_posts_per_page() -> u32 {
    9
}

fn default_author_posts_per_page() -> u32 {
    6
}

fn default_comments_per_page() -> u32 {
    5
}

fn default_max_picture_bytes() -> usize {
    3 * 1024 * 1024 // 3 MiB
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `API_BASE_URL` is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(value) => Environment::parse(&value)
                .ok_or(ConfigError::InvalidValue("APP_ENV", value))?,
            None => Environment::default(),
        };

        let base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingVar("API_BASE_URL"))?;

        let feeds = FeedConfig {
            posts_per_page: page_size(&lookup, "POSTS_PER_PAGE", default_posts_per_page())?,
            author_posts_per_page: page_size(
                &lookup,
                "AUTHOR_POSTS_PER_PAGE",
                default_author_posts_per_page(),
            )?,
            comments_per_page: page_size(
                &lookup,
                "COMMENTS_PER_PAGE",
                default_comments_per_page(),
            )?,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ApiConfig {
                base_url,
                timeout_secs: parsed(&lookup, "API_TIMEOUT_SECS")?
                    .unwrap_or_else(default_timeout_secs),
            },
            feeds,
            uploads: UploadConfig {
                max_picture_bytes: parsed(&lookup, "MAX_PICTURE_BYTES")?
                    .unwrap_or_else(default_max_picture_bytes),
            },
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
        })
        .transpose()
}

fn page_size<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parsed::<F, u32>(lookup, key)? {
        Some(0) => Err(ConfigError::InvalidValue(key, "0".to_string())),
        Some(size) => Ok(size),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

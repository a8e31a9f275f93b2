use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Application settings, loaded once at startup and passed to whoever needs them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_name: String,
    pub version: String,
    pub api_v1_str: String,

    pub gemini_api_key: String,
    pub gemini_model_name: String,
    pub gemini_api_base: String,
    pub request_timeout: Duration,

    pub max_file_size: usize,
    pub allowed_image_types: Vec<String>,

    pub cors_origins: Vec<String>,
    pub bind_addr: String,
}

impl Settings {
    /// Read settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("GEMINI_TIMEOUT_SECS must be a number of seconds, got '{}'", raw))?,
            ),
            None => Duration::from_secs(60),
        };

        let max_file_size = match get("MAX_FILE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_FILE_SIZE must be a byte count, got '{}'", raw))?,
            None => DEFAULT_MAX_FILE_SIZE,
        };

        let cors_origins = match get("BACKEND_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://frontend:3000".to_string(),
            ],
        };

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => 8000,
        };

        Ok(Self {
            project_name: "Prompted Plate API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_v1_str: "/api/v1".to_string(),
            gemini_api_key: get("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model_name: get("GEMINI_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            request_timeout,
            max_file_size,
            allowed_image_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/jpg".to_string(),
            ],
            cors_origins,
            bind_addr: format!("{}:{}", host, port),
        })
    }

    /// Validate required settings
    pub fn validate(&self) -> Result<()> {
        if self.gemini_api_key.trim().is_empty() {
            anyhow::bail!("GEMINI_API_KEY environment variable is required");
        }
        if self.max_file_size == 0 {
            anyhow::bail!("MAX_FILE_SIZE must be greater than zero");
        }
        Ok(())
    }
}

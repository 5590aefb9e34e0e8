use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use extraction::DEFAULT_WORKER_COUNT;

/// Default ceiling for uploaded video files (100 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub worker_count: usize,
    pub work_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Upper bound on an uploaded file, in bytes.
    pub max_upload_bytes: usize,
    /// SQLite connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let work_dir = env::var("WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("guide-extraction"));
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| work_dir.join("uploads"));

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            worker_count: env::var("WORKER_COUNT")
                .unwrap_or_else(|_| DEFAULT_WORKER_COUNT.to_string())
                .parse()
                .context("WORKER_COUNT must be a valid number")?,
            work_dir,
            upload_dir,
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .context("MAX_UPLOAD_BYTES must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok(),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .context("ANTHROPIC_API_KEY must be set")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
        })
    }
}

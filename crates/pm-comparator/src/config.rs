use std::path::PathBuf;

use pm_common::http::StandardsApiConfig;

use crate::bookmarks::DEFAULT_STORAGE_KEY;
use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// Redis is optional; without it bookmarks only live for the session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Standards backend location and request limits.
    pub api: StandardsApiConfig,
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables durable bookmarks.
    pub redis_url: Option<String>,
    /// Redis key holding the JSON bookmark list.
    pub bookmarks_key: String,
    /// Replacement for the compiled-in knowledge base.
    pub knowledge_path: Option<PathBuf>,
}

impl Config {
    /// Optional:
    /// - `STANDARDS_API_URL`, `STANDARDS_API_TIMEOUT_SECS`: see `StandardsApiConfig`
    /// - `REDIS_URL`: Redis connection string (omit to keep bookmarks in memory)
    /// - `BOOKMARKS_KEY`: storage key (default: "standards-bookmarks")
    /// - `PM_KNOWLEDGE_PATH`: JSON knowledge base file; must exist when set
    pub fn from_env() -> Result<Self, AppError> {
        let knowledge_path = std::env::var("PM_KNOWLEDGE_PATH").ok().map(PathBuf::from);
        if let Some(path) = &knowledge_path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "PM_KNOWLEDGE_PATH points to a missing file: {}",
                    path.display()
                )));
            }
        }

        let bookmarks_key = std::env::var("BOOKMARKS_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            api: StandardsApiConfig::from_env(),
            redis_url: std::env::var("REDIS_URL").ok(),
            bookmarks_key,
            knowledge_path,
        })
    }
}

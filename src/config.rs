use std::path::PathBuf;

use crate::foundation::error::{BotError, BotResult};
use crate::links::shorten::TINYURL_ENDPOINT;

/// Default number of vinyl render workers.
pub const DEFAULT_WORKERS: usize = 2;

/// Default location of the vinyl overlay texture.
pub const DEFAULT_OVERLAY: &str = "vinyl_overlay.png";

/// Settings for one bot process.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Chat transport credential.
    pub token: String,
    /// Directory holding every temporary media file.
    pub work_dir: PathBuf,
    /// Vinyl overlay texture; a missing file means pass-through.
    pub overlay_path: Option<PathBuf>,
    /// Size of the vinyl render pool.
    pub workers: usize,
    /// URL-shortening endpoint.
    pub shortener_endpoint: String,
}

impl BotConfig {
    /// Validate raw settings. Fails with `ConfigurationMissing` when the token is absent.
    pub fn resolve(
        token: Option<String>,
        work_dir: Option<PathBuf>,
        overlay_path: Option<PathBuf>,
        workers: usize,
        shortener_endpoint: Option<String>,
    ) -> BotResult<Self> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BotError::configuration_missing("TELEGRAM_BOT_TOKEN is not set"))?;
        if workers == 0 {
            return Err(BotError::validation("workers must be >= 1"));
        }
        let shortener_endpoint = shortener_endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| TINYURL_ENDPOINT.to_string());

        Ok(Self {
            token,
            work_dir: work_dir.unwrap_or_else(default_work_dir),
            overlay_path: overlay_path.or_else(|| Some(PathBuf::from(DEFAULT_OVERLAY))),
            workers,
            shortener_endpoint,
        })
    }
}

/// `<tmp>/roundnote`.
pub fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("roundnote")
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

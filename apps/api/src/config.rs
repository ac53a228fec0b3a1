use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_API_URL, DEFAULT_MODEL};
use crate::render::{AssetPaths, RenderOptions};
use crate::structuring::Truncation;

/// Application configuration loaded from environment variables.
/// Nothing is required at startup; a missing API key surfaces on the first
/// conversion.
#[derive(Debug, Clone)]
pub struct Config {
    pub nvidia_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub head_chars: usize,
    pub full_chars: usize,
    pub assets_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Truncation::default();
        Ok(Config {
            nvidia_api_key: get("NVIDIA_API_KEY").filter(|k| !k.trim().is_empty()),
            llm_api_url: get("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout_secs: parse_or(&get, "LLM_TIMEOUT_SECS", 180)?,
            head_chars: parse_or(&get, "STRUCTURE_HEAD_CHARS", defaults.head_chars)?,
            full_chars: parse_or(&get, "STRUCTURE_FULL_CHARS", defaults.full_chars)?,
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&get, "PORT", 5000)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_url: self.llm_api_url.clone(),
            model: self.llm_model.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
            ..LlmSettings::default()
        }
    }

    pub fn truncation(&self) -> Truncation {
        Truncation {
            head_chars: self.head_chars,
            full_chars: self.full_chars,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            assets: AssetPaths::in_dir(&self.assets_dir),
            ..RenderOptions::default()
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

use std::num::NonZeroUsize;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::AnalysisLimits;

pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "facebook/bart-large-mnli";
pub const DEFAULT_GENERATOR_MODEL: &str = "google/flan-t5-large";

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub inference_base_url: String,
    /// Bearer token for the inference endpoint. Anonymous calls are rate limited hard.
    pub hf_api_token: Option<String>,
    pub classifier_model: String,
    pub generator_model: String,
    pub limits: AnalysisLimits,
    /// Analyses allowed in flight before new uploads are turned away with 503.
    pub analysis_queue_size: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = AnalysisLimits::default();

        Ok(Config {
            port: parse_env("PORT", 7860)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            inference_base_url: std::env::var("INFERENCE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            hf_api_token: std::env::var("HF_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            classifier_model: std::env::var("CLASSIFIER_MODEL")
                .unwrap_or_else(|_| DEFAULT_CLASSIFIER_MODEL.to_string()),
            generator_model: std::env::var("GENERATOR_MODEL")
                .unwrap_or_else(|_| DEFAULT_GENERATOR_MODEL.to_string()),
            limits: AnalysisLimits {
                preview_chars: parse_nonzero_env("PREVIEW_CHARS", defaults.preview_chars)?,
                excerpt_chars: parse_nonzero_env("EXCERPT_CHARS", defaults.excerpt_chars)?,
                max_feedback_tokens: parse_nonzero_env(
                    "MAX_FEEDBACK_TOKENS",
                    defaults.max_feedback_tokens,
                )?,
            },
            analysis_queue_size: parse_nonzero_env("ANALYSIS_QUEUE_SIZE", 5)?,
            max_upload_bytes: parse_nonzero_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

/// Sizes and counts where zero would leave the service unable to answer.
fn parse_nonzero_env(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(raw) => parse_nonzero_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_nonzero_value(key: &str, raw: &str) -> Result<usize> {
    parse_value::<NonZeroUsize>(key, raw)
        .map(NonZeroUsize::get)
        .with_context(|| format!("Environment variable '{key}' must be greater than zero"))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}"))
}

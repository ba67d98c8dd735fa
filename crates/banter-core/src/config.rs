//! Completion provider configuration.
//!
//! The API credential and base URL are read once at startup from the
//! environment. A missing credential is startup-fatal in the front ends,
//! not a core concern.

use std::env;

use crate::error::{BanterError, Result};

/// Default OpenAI-compatible endpoint (OpenRouter).
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Connection settings for the completion provider.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ApiConfig {
    /// Creates a config with the default base URL and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// - `BANTER_API_KEY` (required)
    /// - `BANTER_BASE_URL` (default: OpenRouter)
    /// - `BANTER_MODEL` (default: `openai/gpt-4o`)
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if `BANTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("BANTER_API_KEY")
            .map_err(|_| BanterError::config("BANTER_API_KEY not set in the environment"))?;

        let base_url = env::var("BANTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("BANTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }

    /// Overrides the base URL after construction.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

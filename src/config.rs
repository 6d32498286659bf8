//! Configuration for document summarisation.
//!
//! API credentials and the endpoint are process-wide settings. They live in one [`SummarizeConfig`] value that is handed to
//! [`crate::summarize::Summarizer::new`], so tests can swap in a fake
//! completion service without touching globals or the environment.
//! Sampling and the OCR render resolution are fixed and not configurable
//! (see [`crate::completion::SamplingParams`] and [`RENDER_DPI`]).

use crate::completion::CompletionService;
use crate::error::SummarizeError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default OpenAI-compatible endpoint (NVIDIA API catalog).
pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";

/// Default chat model on [`DEFAULT_BASE_URL`].
pub const DEFAULT_MODEL: &str = "meta/llama-3.1-70b-instruct";

/// Environment variables consulted, in order, when no API key is configured.
pub const API_KEY_ENV_VARS: [&str; 2] = ["NVIDIA_API_KEY", "OPENAI_API_KEY"];

/// Resolution pages without a text layer are rendered at before OCR.
pub const RENDER_DPI: u32 = 300;

/// Configuration for a [`crate::summarize::Summarizer`].
///
/// Built via [`SummarizeConfig::builder()`] or [`SummarizeConfig::default()`].
///
/// # Example
/// ```rust
/// use docsum::SummarizeConfig;
///
/// let config = SummarizeConfig::builder()
///     .base_url("http://localhost:8000/v1")
///     .model("llama3.1")
///     .build()
///     .unwrap();
/// assert_eq!(config.download_timeout_secs, 120);
/// ```
#[derive(Clone)]
pub struct SummarizeConfig {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`.
    pub base_url: String,

    /// Bearer token. If None, read from [`API_KEY_ENV_VARS`] at request time.
    pub api_key: Option<String>,

    /// Chat model identifier.
    pub model: String,

    /// Tesseract executable (name on `PATH` or absolute path). Default: `tesseract`.
    pub tesseract_cmd: PathBuf,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// edgequake-llm provider name (e.g. "openai", "ollama"). When set the
    /// summary is produced through that provider instead of `base_url`.
    pub provider_name: Option<String>,

    /// Pre-constructed edgequake-llm provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed completion service. Takes precedence over everything else.
    pub completion: Option<Arc<dyn CompletionService>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            tesseract_cmd: PathBuf::from("tesseract"),
            password: None,
            download_timeout_secs: 120,
            provider_name: None,
            provider: None,
            completion: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummarizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field(
                "completion",
                &self.completion.as_ref().map(|c| c.name().to_string()),
            )
            .finish()
    }
}

impl SummarizeConfig {
    /// Create a new builder for `SummarizeConfig`.
    pub fn builder() -> SummarizeConfigBuilder {
        SummarizeConfigBuilder {
            config: Self::default(),
        }
    }

    /// Configured API key, else the first non-empty one from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
    }
}

/// Builder for [`SummarizeConfig`].
pub struct SummarizeConfigBuilder {
    config: SummarizeConfig,
}

impl fmt::Debug for SummarizeConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SummarizeConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn completion(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.config.completion = Some(service);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummarizeConfig, SummarizeError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(SummarizeError::Input("base URL must not be empty".into()));
        }
        if c.model.trim().is_empty() {
            return Err(SummarizeError::Input("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

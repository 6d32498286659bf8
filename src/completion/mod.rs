//! The completion service: the language model the orchestrator talks to.
//!
//! The orchestrator only sees the [`CompletionService`] trait. A service
//! accepts one immutable [`SummaryRequest`] and hands back a
//! [`FragmentStream`]: a lazy, finite, non-restartable sequence of
//! [`StreamFragment`]s that the caller pulls to exhaustion.
//!
//! Two implementations ship with the crate:
//!
//! * [`openai::OpenAiCompatibleService`] — streaming `chat/completions` over
//!   HTTP + server-sent events (NVIDIA API catalog, vLLM, Ollama, …).
//! * [`provider::ProviderService`] — any edgequake-llm [`LLMProvider`],
//!   whose complete response is delivered as a single fragment.

pub mod openai;
pub mod provider;

use crate::config::SummarizeConfig;
use crate::error::SummarizeError;
use crate::prompts::resolve_instruction;
use async_trait::async_trait;
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

pub use openai::OpenAiCompatibleService;
pub use provider::ProviderService;

/// Sampling parameters sent with every summary request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 1.0,
            max_tokens: 2048,
        }
    }
}

/// One summarisation request. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    instruction: String,
    content: String,
    sampling: SamplingParams,
}

impl SummaryRequest {
    /// Build a request; a missing or empty `instruction` becomes
    /// [`crate::prompts::DEFAULT_INSTRUCTION`].
    pub fn new(instruction: Option<&str>, content: String, sampling: SamplingParams) -> Self {
        Self {
            instruction: resolve_instruction(instruction).to_string(),
            content,
            sampling,
        }
    }

    /// System message.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// User message: the extracted document text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sampling(&self) -> SamplingParams {
        self.sampling
    }
}

/// One incremental unit of model output.
///
/// `content == None` is a framing artifact (role-only delta, keep-alive,
/// usage chunk) and is skipped during assembly, never treated as the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFragment {
    pub content: Option<String>,
}

impl StreamFragment {
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            content: Some(s.into()),
        }
    }

    pub fn empty() -> Self {
        Self { content: None }
    }
}

/// A boxed stream of fragments. Ends by exhaustion; an `Err` item is fatal.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamFragment, SummarizeError>> + Send>>;

/// A chat-completion backend able to stream a summary.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Start a streaming completion.
    ///
    /// Errors returned here mean the call could not be established and are
    /// [`crate::error::UpstreamStage::Request`] failures. Errors yielded by
    /// the stream are mid-stream failures.
    async fn stream(&self, request: &SummaryRequest) -> Result<FragmentStream, SummarizeError>;
}

/// Resolve the completion service, from most-specific to least-specific:
///
/// 1. **Pre-built service** (`config.completion`) — used as-is (tests, custom middleware).
/// 2. **Pre-built provider** (`config.provider`) — wrapped in [`ProviderService`].
/// 3. **Named provider** (`config.provider_name`) — created through
///    [`ProviderFactory::create_llm_provider`] with `config.model`; the
///    provider reads its own API key from the environment.
/// 4. **OpenAI-compatible endpoint** on `config.base_url` (default).
pub fn resolve_service(
    config: &SummarizeConfig,
) -> Result<Arc<dyn CompletionService>, SummarizeError> {
    if let Some(ref service) = config.completion {
        return Ok(Arc::clone(service));
    }

    if let Some(ref provider) = config.provider {
        return Ok(Arc::new(ProviderService::new(Arc::clone(provider))));
    }

    if let Some(ref name) = config.provider_name {
        debug!("Creating edgequake-llm provider '{}' ({})", name, config.model);
        let provider: Arc<dyn LLMProvider> =
            ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
                SummarizeError::request(format!("provider '{name}' is not configured: {e}"))
            })?;
        return Ok(Arc::new(ProviderService::new(provider)));
    }

    Ok(Arc::new(OpenAiCompatibleService::from_config(config)?))
}

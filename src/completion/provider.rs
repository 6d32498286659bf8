//! Completion through an edgequake-llm [`LLMProvider`].
//!
//! Providers behind edgequake-llm answer with one complete response, so the
//! whole summary arrives as a single fragment. Assembly downstream does not
//! care whether it sees one fragment or a thousand.

use super::{CompletionService, FragmentStream, SamplingParams, StreamFragment, SummaryRequest};
use crate::error::SummarizeError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use futures::stream;
use std::sync::Arc;
use tracing::{debug, warn};

/// Adapter from [`LLMProvider`] to [`CompletionService`].
pub struct ProviderService {
    provider: Arc<dyn LLMProvider>,
}

impl ProviderService {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompletionService for ProviderService {
    fn name(&self) -> &str {
        "edgequake-llm"
    }

    async fn stream(&self, request: &SummaryRequest) -> Result<FragmentStream, SummarizeError> {
        let messages = vec![
            ChatMessage::system(request.instruction()),
            ChatMessage::user(request.content()),
        ];
        let options = build_options(request.sampling());

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| {
                warn!("Provider chat call failed: {}", e);
                SummarizeError::request(e.to_string())
            })?;

        debug!(
            "Provider response: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        let fragment = StreamFragment::text(response.content);
        Ok(Box::pin(stream::iter(vec![Ok(fragment)])))
    }
}

/// Map the fixed sampling parameters onto edgequake-llm options.
fn build_options(sampling: SamplingParams) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(sampling.temperature),
        top_p: Some(sampling.top_p),
        max_tokens: Some(sampling.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_carries_sampling() {
        let opts = build_options(SamplingParams::default());
        assert_eq!(opts.temperature, Some(0.8));
        assert_eq!(opts.top_p, Some(1.0));
        assert_eq!(opts.max_tokens, Some(2048));
    }
}

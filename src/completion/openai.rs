//! Streaming client for OpenAI-compatible `chat/completions` endpoints.
//!
//! The request is a plain JSON POST with `stream: true`; the response body
//! is a server-sent-event stream of chat-completion chunks:
//!
//! ```text
//! data: {"choices":[{"delta":{"role":"assistant"}}]}
//!
//! data: {"choices":[{"delta":{"content":"The report"}}]}
//!
//! data: [DONE]
//! ```
//!
//! Network chunks do not respect line boundaries (a JSON payload, or even a
//! multi-byte UTF-8 sequence, may be split across two reads), so bytes are
//! buffered in [`SseDecoder`] and only complete lines are parsed.

use super::{CompletionService, FragmentStream, StreamFragment, SummaryRequest};
use crate::config::SummarizeConfig;
use crate::error::SummarizeError;
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use tracing::{debug, warn};

/// Longest error-body excerpt quoted in an [`SummarizeError`].
const ERROR_BODY_EXCERPT: usize = 300;

/// Streaming chat client for any OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleService {
    /// Create a client for `{base_url}/chat/completions`.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, SummarizeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SummarizeError::request(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config(config: &SummarizeConfig) -> Result<Self, SummarizeError> {
        Self::new(&config.base_url, config.model.clone(), config.resolved_api_key())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for OpenAiCompatibleService {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn stream(&self, request: &SummaryRequest) -> Result<FragmentStream, SummarizeError> {
        let body = ChatCompletionRequest::new(&self.model, request);
        debug!(
            "POST {} (model={}, {} content chars)",
            self.endpoint,
            self.model,
            request.content().chars().count()
        );

        let mut req = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            warn!("Completion request failed: {}", e);
            SummarizeError::request(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Completion endpoint returned HTTP {}", status);
            return Err(SummarizeError::request(format!(
                "HTTP {status}: {}",
                excerpt(&text, ERROR_BODY_EXCERPT)
            )));
        }

        Ok(fragments_from_sse(response.bytes_stream()))
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(model: &'a str, request: &'a SummaryRequest) -> Self {
        let sampling = request.sampling();
        Self {
            model,
            messages: [
                WireMessage {
                    role: "system",
                    content: request.instruction(),
                },
                WireMessage {
                    role: "user",
                    content: request.content(),
                },
            ],
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_tokens,
            stream: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

// ── SSE decoding ─────────────────────────────────────────────────────────

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Fragment(StreamFragment),
    /// `data: [DONE]`
    Done,
}

/// Incremental line decoder for an SSE body.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns the events of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<SseEvent, SummarizeError>> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(ev) = parse_line(&line) {
                events.push(ev);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<Result<SseEvent, SummarizeError>> {
        let rest = std::mem::take(&mut self.buf);
        parse_line(&rest)
    }
}

fn parse_line(raw: &[u8]) -> Option<Result<SseEvent, SummarizeError>> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);

    // Blank separators, comments/keep-alives, and non-data fields (event:, id:, retry:).
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let data = line.strip_prefix("data:")?.trim_start();

    if data == "[DONE]" {
        return Some(Ok(SseEvent::Done));
    }

    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(SummarizeError::stream(format!(
                "malformed stream chunk: {e}"
            ))))
        }
    };

    if let Some(err) = chunk.error {
        return Some(Err(SummarizeError::stream(format!(
            "provider reported an error: {err}"
        ))));
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content);
    Some(Ok(SseEvent::Fragment(StreamFragment { content })))
}

struct SseState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<SseEvent, SummarizeError>>,
    finished: bool,
}

/// Turn a raw SSE byte stream into a [`FragmentStream`].
///
/// The stream ends at `[DONE]` or when the body is exhausted. A transport
/// error or an unparsable data line is yielded once as an `Err` and ends
/// the stream.
pub fn fragments_from_sse<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: fmt::Display + Send,
{
    let state = SseState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    let s = stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                match event {
                    Ok(SseEvent::Fragment(f)) => return Some((Ok(f), st)),
                    Ok(SseEvent::Done) => return None,
                    Err(e) => {
                        st.finished = true;
                        st.pending.clear();
                        return Some((Err(e), st));
                    }
                }
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(chunk)) => {
                    let events = st.decoder.push(chunk.as_ref());
                    st.pending.extend(events);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(SummarizeError::stream(e.to_string())), st));
                }
                None => {
                    st.finished = true;
                    st.pending.extend(st.decoder.finish());
                }
            }
        }
    });

    Box::pin(s)
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{cut}\u{2026}")
    }
}

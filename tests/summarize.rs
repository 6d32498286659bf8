//! Integration tests for the summarisation flow.
//!
//! No network access and no model: completion is either a scripted
//! in-process service or a one-shot SSE server on 127.0.0.1. PDF-path
//! tests only use inputs that fail before pdfium renders anything, so
//! they pass whether or not libpdfium is installed.

use async_trait::async_trait;
use docsum::{
    CompletionService, ErrorCategory, FragmentStream, OpenAiCompatibleService, StreamFragment,
    SummarizeConfig, SummarizeError, SummarizeProgressCallback, Summarizer, SummaryRequest,
    UpstreamStage, UploadedDocument,
};
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// What the scripted service does when called.
#[derive(Clone)]
enum Script {
    Fragments(Vec<Option<&'static str>>),
    /// Yield these, then fail mid-stream.
    BreakAfter(Vec<&'static str>),
    /// Fail before any fragment.
    Refuse,
}

struct ScriptedService {
    script: Script,
    calls: AtomicUsize,
    seen: Mutex<Option<SummaryRequest>>,
}

impl ScriptedService {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen(&self) -> SummaryRequest {
        self.seen.lock().unwrap().clone().expect("service was not called")
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream(&self, request: &SummaryRequest) -> Result<FragmentStream, SummarizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some(request.clone());

        let items: Vec<Result<StreamFragment, SummarizeError>> = match &self.script {
            Script::Fragments(parts) => parts
                .iter()
                .map(|p| {
                    Ok(StreamFragment {
                        content: p.map(str::to_string),
                    })
                })
                .collect(),
            Script::BreakAfter(parts) => parts
                .iter()
                .map(|p| Ok(StreamFragment::text(*p)))
                .chain(std::iter::once(Err(SummarizeError::stream("connection reset"))))
                .collect(),
            Script::Refuse => return Err(SummarizeError::request("HTTP 401 Unauthorized")),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}

fn summarizer_with(service: Arc<ScriptedService>) -> Summarizer {
    let config = SummarizeConfig::builder()
        .completion(service)
        .build()
        .unwrap();
    Summarizer::new(config).unwrap()
}

fn text_doc(name: &str, body: &str) -> UploadedDocument {
    UploadedDocument::new(name, body.as_bytes().to_vec())
}

// ── Plain-text flows ─────────────────────────────────────────────────────────

#[tokio::test]
async fn plain_text_summary_concatenates_fragments() {
    let service = ScriptedService::new(Script::Fragments(vec![
        Some("The "),
        None,
        Some("cat "),
        Some("sat."),
    ]));
    let out = summarizer_with(service.clone())
        .summarize(text_doc("notes.txt", "The cat sat on the mat."), None)
        .await
        .unwrap();

    assert_eq!(out.summary, "The cat sat.");
    assert_eq!(out.stats.fragments, 4);
    assert_eq!(out.stats.pages, 0);
    assert_eq!(service.calls(), 1);
    assert_eq!(service.seen().content(), "The cat sat on the mat.");
}

#[tokio::test]
async fn missing_instruction_uses_default() {
    let service = ScriptedService::new(Script::Fragments(vec![Some("ok")]));
    let s = summarizer_with(service.clone());

    s.summarize(text_doc("a.txt", "x"), None).await.unwrap();
    assert_eq!(service.seen().instruction(), "Summarize the content.");

    s.summarize(text_doc("a.txt", "x"), Some("")).await.unwrap();
    assert_eq!(service.seen().instruction(), "Summarize the content.");

    s.summarize(text_doc("a.txt", "x"), Some("One sentence."))
        .await
        .unwrap();
    assert_eq!(service.seen().instruction(), "One sentence.");
}

#[tokio::test]
async fn request_carries_fixed_sampling() {
    let service = ScriptedService::new(Script::Fragments(vec![Some("ok")]));
    summarizer_with(service.clone())
        .summarize(text_doc("a.md", "x"), None)
        .await
        .unwrap();
    let sampling = service.seen().sampling();
    assert_eq!(sampling.temperature, 0.8);
    assert_eq!(sampling.top_p, 1.0);
    assert_eq!(sampling.max_tokens, 2048);
}

#[tokio::test]
async fn empty_text_file_is_still_sent() {
    let service = ScriptedService::new(Script::Fragments(vec![Some("Nothing to summarise.")]));
    let out = summarizer_with(service.clone())
        .summarize(text_doc("empty.txt", ""), None)
        .await
        .unwrap();
    assert_eq!(out.summary, "Nothing to summarise.");
    assert_eq!(service.seen().content(), "");
}

#[tokio::test]
async fn all_null_fragments_give_empty_summary() {
    let service = ScriptedService::new(Script::Fragments(vec![None, None]));
    let out = summarizer_with(service)
        .summarize(text_doc("a.txt", "x"), None)
        .await
        .unwrap();
    assert_eq!(out.summary, "");
}

// ── Failures before the model is called ──────────────────────────────────────

#[tokio::test]
async fn unnamed_document_is_input_error() {
    let service = ScriptedService::new(Script::Fragments(vec![Some("never")]));
    let err = summarizer_with(service.clone())
        .summarize(UploadedDocument::new("", b"hello".to_vec()), None)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Input);
    assert_eq!(err.http_status(), 400);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn invalid_utf8_is_decoding_error() {
    let service = ScriptedService::new(Script::Fragments(vec![Some("never")]));
    let err = summarizer_with(service.clone())
        .summarize(UploadedDocument::new("latin1.txt", vec![b'a', 0xFF, b'b']), None)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Decoding);
    assert_eq!(err.http_status(), 500);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn unreadable_pdf_is_extraction_error() {
    let service = ScriptedService::new(Script::Fragments(vec![Some("never")]));
    let err = summarizer_with(service.clone())
        .summarize(UploadedDocument::new("REPORT.PDF", b"%PDF-garbage".to_vec()), None)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Extraction);
    assert_eq!(service.calls(), 0);

    let body = serde_json::to_value(err.to_body()).unwrap();
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
}

// ── Upstream failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn refused_call_is_upstream_error() {
    let service = ScriptedService::new(Script::Refuse);
    let err = summarizer_with(service)
        .summarize(text_doc("a.txt", "x"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SummarizeError::Upstream {
            stage: UpstreamStage::Request,
            ..
        }
    ));
    assert!(err.detail().contains("401"));
}

#[tokio::test]
async fn broken_stream_discards_partial_summary() {
    let service = ScriptedService::new(Script::BreakAfter(vec!["Partial ", "summ"]));
    let err = summarizer_with(service)
        .summarize(text_doc("a.txt", "x"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SummarizeError::Upstream {
            stage: UpstreamStage::Stream,
            ..
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Upstream);
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl SummarizeProgressCallback for RecordingProgress {
    fn on_summary_start(&self, content_chars: usize) {
        self.events.lock().unwrap().push(format!("start:{content_chars}"));
    }

    fn on_fragment(&self, content_len: usize) {
        self.events.lock().unwrap().push(format!("frag:{content_len}"));
    }

    fn on_summary_complete(&self, summary_chars: usize) {
        self.events.lock().unwrap().push(format!("done:{summary_chars}"));
    }
}

#[tokio::test]
async fn progress_sees_only_content_fragments() {
    let progress = Arc::new(RecordingProgress::default());
    let service = ScriptedService::new(Script::Fragments(vec![Some("ab"), None, Some("c")]));
    let config = SummarizeConfig::builder()
        .completion(service)
        .progress_callback(progress.clone())
        .build()
        .unwrap();

    Summarizer::new(config)
        .unwrap()
        .summarize(text_doc("a.txt", "hello"), None)
        .await
        .unwrap();

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(events, vec!["start:5", "frag:2", "frag:1", "done:3"]);
}

// ── OpenAI-compatible service against a local SSE server ─────────────────────

/// Serve exactly one HTTP response on a fresh port and return the base URL
/// plus a handle yielding the raw request body the client sent.
async fn one_shot_server(
    status_line: &'static str,
    content_type: &'static str,
    body: String,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let n = sock.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while raw.len() < header_end + content_length {
            let n = sock.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let request_body = String::from_utf8_lossy(&raw[header_end..]).into_owned();

        let response = format!(
            "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
        request_body
    });

    (format!("http://{addr}/v1"), handle)
}

fn sse(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("data: {l}\n\n")).collect()
}

#[tokio::test]
async fn http_service_streams_summary() {
    let body = sse(&[
        r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
        r#"{"choices":[{"delta":{"content":"Short "}}]}"#,
        r#"{"choices":[{"delta":{"content":null}}]}"#,
        r#"{"choices":[{"delta":{"content":"summary."}}]}"#,
        "[DONE]",
    ]);
    let (base_url, server) = one_shot_server("HTTP/1.1 200 OK", "text/event-stream", body).await;

    let service = OpenAiCompatibleService::new(&base_url, "test-model", Some("k".into())).unwrap();
    let config = SummarizeConfig::builder()
        .completion(Arc::new(service))
        .build()
        .unwrap();
    let out = Summarizer::new(config)
        .unwrap()
        .summarize(text_doc("doc.txt", "Body text."), Some("Be brief."))
        .await
        .unwrap();
    assert_eq!(out.summary, "Short summary.");

    let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(sent["model"], "test-model");
    assert_eq!(sent["stream"], true);
    assert_eq!(sent["messages"][0]["content"], "Be brief.");
    assert_eq!(sent["messages"][1]["content"], "Body text.");
}

#[tokio::test]
async fn http_error_status_is_request_failure() {
    let (base_url, _server) = one_shot_server(
        "HTTP/1.1 401 Unauthorized",
        "application/json",
        r#"{"error":"invalid api key"}"#.to_string(),
    )
    .await;

    let service = OpenAiCompatibleService::new(&base_url, "m", None).unwrap();
    let config = SummarizeConfig::builder()
        .completion(Arc::new(service))
        .build()
        .unwrap();
    let err = Summarizer::new(config)
        .unwrap()
        .summarize(text_doc("doc.txt", "x"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SummarizeError::Upstream {
            stage: UpstreamStage::Request,
            ..
        }
    ));
    assert!(err.detail().contains("401"), "got: {err}");
    assert!(err.detail().contains("invalid api key"), "got: {err}");
}

#[tokio::test]
async fn http_malformed_chunk_is_stream_failure() {
    let body = format!(
        "{}data: {{truncated\n\n",
        sse(&[r#"{"choices":[{"delta":{"content":"A"}}]}"#])
    );
    let (base_url, _server) = one_shot_server("HTTP/1.1 200 OK", "text/event-stream", body).await;

    let service = OpenAiCompatibleService::new(&base_url, "m", None).unwrap();
    let config = SummarizeConfig::builder()
        .completion(Arc::new(service))
        .build()
        .unwrap();
    let err = Summarizer::new(config)
        .unwrap()
        .summarize(text_doc("doc.txt", "x"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SummarizeError::Upstream {
            stage: UpstreamStage::Stream,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_endpoint_is_request_failure() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    };
    let service =
        OpenAiCompatibleService::new(&format!("http://127.0.0.1:{port}/v1"), "m", None).unwrap();
    let req = SummaryRequest::new(None, "x".into(), Default::default());
    let err = service.stream(&req).await.err().expect("connect should fail");
    assert_eq!(err.category(), ErrorCategory::Upstream);
}

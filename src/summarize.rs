//! Summarisation entry points.
//!
//! [`Summarizer`] owns everything a call needs that outlives the call (the
//! configuration, the completion service, the page extractor); each
//! [`Summarizer::summarize`] call owns its document, extracted text and
//! accumulator privately, so one `Summarizer` can serve concurrent calls.
//!
//! A call is strictly sequential:
//!
//! ```text
//! validate ─▶ extract (text | pdf) ─▶ build request ─▶ stream ─▶ assemble
//! ```
//!
//! Every step's failure ends the call; nothing is retried and no partial
//! summary is ever returned.

use crate::completion::{resolve_service, CompletionService, SamplingParams, SummaryRequest};
use crate::config::SummarizeConfig;
use crate::error::SummarizeError;
use crate::output::{ExtractedText, SummaryOutput, SummaryStats};
use crate::pipeline::document::DocumentExtractor;
use crate::pipeline::input::{self, DocumentKind, UploadedDocument};
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::page::PageExtractor;
use crate::pipeline::text;
use crate::prompts::resolve_instruction;
use crate::stream::assemble_summary;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The summarisation orchestrator.
pub struct Summarizer {
    config: SummarizeConfig,
    service: Arc<dyn CompletionService>,
    documents: DocumentExtractor,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("config", &self.config)
            .field("service", &self.service.name())
            .finish()
    }
}

impl Summarizer {
    /// Build a summarizer with the Tesseract OCR engine from `config`.
    pub fn new(config: SummarizeConfig) -> Result<Self, SummarizeError> {
        let ocr = Arc::new(TesseractOcr::new(config.tesseract_cmd.clone()));
        Self::with_ocr(config, ocr)
    }

    /// Build a summarizer with a caller-supplied OCR engine.
    pub fn with_ocr(
        config: SummarizeConfig,
        ocr: Arc<dyn OcrEngine>,
    ) -> Result<Self, SummarizeError> {
        let service = resolve_service(&config)?;
        let pages = Arc::new(PageExtractor::native_then_ocr(ocr));
        let documents = DocumentExtractor::new(pages)
            .with_password(config.password.clone())
            .with_progress(config.progress_callback.clone());
        debug!("Summarizer ready (completion service: {})", service.name());
        Ok(Self {
            config,
            service,
            documents,
        })
    }

    pub fn config(&self) -> &SummarizeConfig {
        &self.config
    }

    /// Turn a document into text without contacting the model.
    pub async fn extract(&self, document: UploadedDocument) -> Result<ExtractedText, SummarizeError> {
        document.validate()?;
        match document.kind() {
            DocumentKind::Pdf => {
                debug!("Processing PDF file '{}'", document.name());
                self.documents.extract(document.into_bytes()).await
            }
            DocumentKind::PlainText => {
                debug!("Processing plain text file '{}'", document.name());
                text::extract_text(document.into_bytes()).map(ExtractedText::plain)
            }
        }
    }

    /// Summarise `document` under `instruction` (default: "Summarize the content.").
    ///
    /// # Errors
    /// - [`SummarizeError::Input`] — the document has no name
    /// - [`SummarizeError::Extraction`] / [`SummarizeError::Decoding`] — the
    ///   document could not be turned into text; the model is not called
    /// - [`SummarizeError::Upstream`] — the completion call failed or the
    ///   stream broke off; any partial summary is discarded
    pub async fn summarize(
        &self,
        document: UploadedDocument,
        instruction: Option<&str>,
    ) -> Result<SummaryOutput, SummarizeError> {
        info!("Summarising '{}'", document.name());

        // ── Step 1–2: Validate + extract ─────────────────────────────────
        let extraction_start = Instant::now();
        let extracted = self.extract(document).await?;
        let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;

        let mut stats = SummaryStats {
            pages: extracted.pages.len(),
            ocr_pages: extracted.ocr_pages(),
            extracted_chars: extracted.text.chars().count(),
            extraction_duration_ms,
            ..Default::default()
        };
        info!(
            "Extracted {} chars ({} pages, {} via OCR) in {}ms",
            stats.extracted_chars, stats.pages, stats.ocr_pages, extraction_duration_ms
        );

        // ── Step 3–4: Build request + open stream ────────────────────────
        debug!("Instruction: {}", resolve_instruction(instruction));
        let request = SummaryRequest::new(instruction, extracted.text, SamplingParams::default());

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_summary_start(stats.extracted_chars);
        }

        let completion_start = Instant::now();
        debug!("Calling completion service '{}'", self.service.name());
        let stream = self.service.stream(&request).await.map_err(|e| {
            warn!("Completion call failed: {}", e);
            e
        })?;

        // ── Step 5–6: Assemble ───────────────────────────────────────────
        let assembled = assemble_summary(stream, self.config.progress_callback.as_deref()).await?;
        stats.fragments = assembled.fragments;
        stats.completion_duration_ms = completion_start.elapsed().as_millis() as u64;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_summary_complete(assembled.text.chars().count());
        }
        debug!("Summary generated: {}", assembled.text);
        info!(
            "Summary complete: {} chars from {} fragments in {}ms",
            assembled.text.chars().count(),
            stats.fragments,
            stats.completion_duration_ms
        );

        Ok(SummaryOutput {
            summary: assembled.text,
            stats,
        })
    }
}

/// Summarise a local file or HTTP/HTTPS URL.
pub async fn summarize_file(
    input_str: impl AsRef<str>,
    instruction: Option<&str>,
    config: &SummarizeConfig,
) -> Result<SummaryOutput, SummarizeError> {
    let document = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    Summarizer::new(config.clone())?
        .summarize(document, instruction)
        .await
}

/// Synchronous wrapper around [`Summarizer::summarize`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    document: UploadedDocument,
    instruction: Option<&str>,
    config: &SummarizeConfig,
) -> Result<SummaryOutput, SummarizeError> {
    let summarizer = Summarizer::new(config.clone())?;
    tokio::runtime::Runtime::new()
        .map_err(runtime_error)?
        .block_on(summarizer.summarize(document, instruction))
}

/// A runtime that cannot start is a local failure: nothing was extracted
/// and the completion service was never contacted.
fn runtime_error(e: std::io::Error) -> SummarizeError {
    SummarizeError::extraction(format!("failed to create tokio runtime: {e}"))
}

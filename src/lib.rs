//! # docsum
//!
//! Summarise uploaded documents (plain text or PDF) with a chat-completion
//! model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! UploadedDocument (name + bytes)
//!  │
//!  ├─ 1. Validate  a document must have a name
//!  ├─ 2. Extract   *.pdf → per page: native text, else render @300 DPI + OCR
//!  │               other → strict UTF-8 decode
//!  ├─ 3. Request   system = instruction (default "Summarize the content."),
//!  │               user = extracted text, temperature 0.8, top_p 1.0, 2048 tokens
//!  ├─ 4. Stream    chat completion, stream = true
//!  └─ 5. Assemble  concatenate fragment content in arrival order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsum::{SummarizeConfig, Summarizer, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from NVIDIA_API_KEY / OPENAI_API_KEY
//!     let summarizer = Summarizer::new(SummarizeConfig::default())?;
//!     let doc = UploadedDocument::new("report.pdf", std::fs::read("report.pdf")?);
//!     let out = summarizer.summarize(doc, Some("Three bullet points.")).await?;
//!     println!("{}", out.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsum` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Runtime requirements
//!
//! PDF input needs the pdfium shared library (see [`pipeline::pdfium`]) and,
//! for pages without a text layer, the `tesseract` executable.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod completion;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use completion::{
    CompletionService, FragmentStream, OpenAiCompatibleService, ProviderService, SamplingParams,
    StreamFragment, SummaryRequest,
};
pub use config::{SummarizeConfig, SummarizeConfigBuilder};
pub use error::{ErrorBody, ErrorCategory, SummarizeError, UpstreamStage};
pub use output::{ExtractedText, ExtractionMethod, PageExtraction, SummaryOutput, SummaryStats};
pub use pipeline::input::{DocumentKind, UploadedDocument};
pub use pipeline::ocr::{OcrEngine, OcrError, TesseractOcr};
pub use progress::{NoopProgressCallback, ProgressCallback, SummarizeProgressCallback};
pub use prompts::DEFAULT_INSTRUCTION;
pub use stream::assemble_summary;
pub use summarize::{summarize_file, summarize_sync, Summarizer};

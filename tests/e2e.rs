//! End-to-end tests against a live model, pdfium and tesseract.
//!
//! Gated behind `E2E_ENABLED` so they never run in CI by accident. PDF tests
//! additionally need a file in `./test_cases/` and skip if it is missing.
//!
//! Run with:
//!   E2E_ENABLED=1 NVIDIA_API_KEY=... cargo test --test e2e -- --nocapture

use docsum::{
    summarize_file, ExtractionMethod, SummarizeConfig, SummarizeProgressCallback, Summarizer,
    UploadedDocument,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Skip unless E2E_ENABLED is set *and* the file at `path` exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        e2e_skip_unless_enabled!();
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

#[tokio::test]
async fn test_summarize_plain_text_live() {
    e2e_skip_unless_enabled!();

    let text = "Rust is a systems programming language focused on safety, speed and \
                concurrency. Its ownership model guarantees memory safety without a \
                garbage collector, and its type system prevents data races at compile time.";
    let summarizer = Summarizer::new(SummarizeConfig::default()).unwrap();
    let out = summarizer
        .summarize(
            UploadedDocument::new("rust.txt", text.as_bytes().to_vec()),
            Some("Summarize in one sentence."),
        )
        .await
        .unwrap();

    println!("{}", out.summary);
    assert!(!out.summary.trim().is_empty());
    assert!(out.stats.fragments >= 1);
}

#[tokio::test]
async fn test_summarize_pdf_live() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample_text.pdf"));

    let out = summarize_file(path.to_string_lossy(), None, &SummarizeConfig::default())
        .await
        .unwrap();

    println!("{}", out.summary);
    assert!(!out.summary.trim().is_empty());
    assert!(out.stats.pages >= 1);
    assert!(out.stats.extracted_chars > 0);
}

#[tokio::test]
async fn test_extract_scanned_pdf_uses_ocr() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));

    let bytes = std::fs::read(&path).unwrap();
    let summarizer = Summarizer::new(SummarizeConfig::default()).unwrap();
    let extracted = summarizer
        .extract(UploadedDocument::new("scanned.pdf", bytes))
        .await
        .unwrap();

    assert!(extracted.ocr_pages() >= 1, "pages: {:?}", extracted.pages);
    assert!(extracted
        .pages
        .iter()
        .all(|p| p.method != ExtractionMethod::Native || p.chars > 0));
}

struct PageCounter(AtomicUsize);

impl SummarizeProgressCallback for PageCounter {
    fn on_page_extracted(&self, _page: usize, _total: usize, _m: ExtractionMethod, _c: usize) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_progress_counts_every_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample_text.pdf"));

    let counter = Arc::new(PageCounter(AtomicUsize::new(0)));
    let config = SummarizeConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let extracted = Summarizer::new(config)
        .unwrap()
        .extract(UploadedDocument::new("sample_text.pdf", bytes))
        .await
        .unwrap();

    assert_eq!(counter.0.load(Ordering::SeqCst), extracted.pages.len());
}

#[tokio::test]
async fn test_summarize_future_is_send() {
    e2e_skip_unless_enabled!();

    // The summarize future must be Send so servers can spawn it.
    let handle = tokio::spawn(async move {
        Summarizer::new(SummarizeConfig::default())
            .unwrap()
            .summarize(UploadedDocument::new("a.txt", b"Hello world.".to_vec()), None)
            .await
    });
    let out = handle.await.unwrap().unwrap();
    assert!(!out.summary.is_empty());
}

//! Progress-callback trait for extraction and summary events.
//!
//! Inject an [`Arc<dyn SummarizeProgressCallback>`] via
//! [`crate::config::SummarizeConfigBuilder::progress_callback`] to receive
//! events while a document is extracted and the summary streams in.
//!
//! Page events are fired from the blocking extraction thread, fragment
//! events from the async task that drains the completion stream, so the
//! trait is `Send + Sync`.
//!
//! # Example
//!
//! ```rust
//! use docsum::{SummarizeConfig, SummarizeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FragmentCounter(AtomicUsize);
//!
//! impl SummarizeProgressCallback for FragmentCounter {
//!     fn on_fragment(&self, _content_len: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = SummarizeConfig::builder()
//!     .progress_callback(Arc::new(FragmentCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ExtractionMethod;
use std::sync::Arc;

/// Called by the orchestrator as a summarisation call progresses.
///
/// All methods default to no-ops so callers only override what they need.
pub trait SummarizeProgressCallback: Send + Sync {
    /// Called once after the PDF is opened, before any page is extracted.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's text has been obtained.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in the document
    /// * `method`      — strategy that produced the text
    /// * `chars`       — characters extracted from the page
    fn on_page_extracted(
        &self,
        page_num: usize,
        total_pages: usize,
        method: ExtractionMethod,
        chars: usize,
    ) {
        let _ = (page_num, total_pages, method, chars);
    }

    /// Called just before the completion request is sent.
    fn on_summary_start(&self, content_chars: usize) {
        let _ = content_chars;
    }

    /// Called for every fragment carrying content.
    fn on_fragment(&self, content_len: usize) {
        let _ = content_len;
    }

    /// Called once the stream is exhausted and the summary is final.
    fn on_summary_complete(&self, summary_chars: usize) {
        let _ = summary_chars;
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl SummarizeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummarizeConfig`].
pub type ProgressCallback = Arc<dyn SummarizeProgressCallback>;

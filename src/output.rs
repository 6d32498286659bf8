//! Result types returned by extraction and summarisation.

use serde::{Deserialize, Serialize};

/// How the text of a single page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// The page's own text layer.
    Native,
    /// Raster render + OCR.
    Ocr,
    /// Every strategy came back empty.
    None,
}

/// Per-page extraction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageExtraction {
    /// 1-indexed page number.
    pub page_num: usize,
    pub method: ExtractionMethod,
    /// Characters (not bytes) contributed by this page.
    pub chars: usize,
}

/// Text extracted from an uploaded document.
///
/// For PDFs `text` is each page's text followed by a single `'\n'`, in page
/// order. Empty pages still contribute their newline. `pages` is empty for
/// plain-text uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub pages: Vec<PageExtraction>,
}

impl ExtractedText {
    pub fn plain(text: String) -> Self {
        Self {
            text,
            pages: Vec::new(),
        }
    }

    pub fn ocr_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.method == ExtractionMethod::Ocr)
            .count()
    }
}

/// Timing and volume figures for one summarisation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// PDF pages processed (0 for plain text).
    pub pages: usize,
    /// Pages whose text came from OCR.
    pub ocr_pages: usize,
    /// Characters sent to the model as user content.
    pub extracted_chars: usize,
    /// Stream fragments received, including content-less ones.
    pub fragments: usize,
    pub extraction_duration_ms: u64,
    pub completion_duration_ms: u64,
}

/// A finished summarisation: the complete summary text plus stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
    pub stats: SummaryStats,
}

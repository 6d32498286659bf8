//! PDF extraction: open the document and run the page extractor over every
//! page, in stored order.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state; its handles are not
//! `Send` and its calls block. The whole document (open, per-page text,
//! rendering, OCR) is processed inside one `spawn_blocking` closure, and
//! every pdfium handle is dropped before the closure returns, on success
//! and on error alike.

use super::page::{PageError, PageExtractor, PageSource};
use super::pdfium::bind_pdfium;
use crate::error::SummarizeError;
use crate::output::{ExtractedText, PageExtraction};
use crate::progress::ProgressCallback;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on either rendered dimension, whatever the page size.
const MAX_RENDER_EDGE_PX: i32 = 10_000;

/// Extracts text from whole PDF documents.
#[derive(Clone)]
pub struct DocumentExtractor {
    pages: Arc<PageExtractor>,
    password: Option<String>,
    progress: Option<ProgressCallback>,
}

impl DocumentExtractor {
    pub fn new(pages: Arc<PageExtractor>) -> Self {
        Self {
            pages,
            password: None,
            progress: None,
        }
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Extract the text of a PDF held in memory.
    ///
    /// # Errors
    /// [`SummarizeError::Extraction`] when pdfium is unavailable, the bytes
    /// are not a readable PDF, or a page fails (with its page number).
    pub async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedText, SummarizeError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.extract_blocking(&bytes))
            .await
            .map_err(|e| SummarizeError::extraction(format!("extraction task panicked: {e}")))?
    }

    fn extract_blocking(&self, bytes: &[u8]) -> Result<ExtractedText, SummarizeError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, self.password.as_deref())
            .map_err(|e| {
                let detail = format!("{e:?}");
                warn!("Failed to open PDF: {}", detail);
                if detail.to_lowercase().contains("password") {
                    if self.password.is_some() {
                        SummarizeError::extraction("wrong password for encrypted PDF")
                    } else {
                        SummarizeError::extraction("PDF is encrypted and requires a password")
                    }
                } else {
                    SummarizeError::extraction(format!("cannot parse PDF: {detail}"))
                }
            })?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        self.extract_pages(pages.iter().map(PdfiumPage), total)
    }

    /// Run the page extractor over `pages` in order.
    ///
    /// Each page contributes its text followed by one `'\n'`; blank pages
    /// contribute just the newline. The first page error aborts the whole
    /// document.
    pub fn extract_pages<P, I>(&self, pages: I, total: usize) -> Result<ExtractedText, SummarizeError>
    where
        P: PageSource,
        I: IntoIterator<Item = P>,
    {
        if let Some(ref cb) = self.progress {
            cb.on_extraction_start(total);
        }

        let mut text = String::new();
        let mut records = Vec::with_capacity(total);

        for (idx, page) in pages.into_iter().enumerate() {
            let page_num = idx + 1;
            let out = self.pages.extract(&page).map_err(|e| {
                warn!("Page {}/{}: {}", page_num, total, e);
                SummarizeError::page_extraction(page_num, e.to_string())
            })?;

            let chars = out.text.chars().count();
            debug!("Page {}/{}: {:?}, {} chars", page_num, total, out.method, chars);
            if let Some(ref cb) = self.progress {
                cb.on_page_extracted(page_num, total, out.method, chars);
            }

            text.push_str(&out.text);
            text.push('\n');
            records.push(PageExtraction {
                page_num,
                method: out.method,
                chars,
            });
        }

        Ok(ExtractedText {
            text,
            pages: records,
        })
    }
}

/// A pdfium page viewed through [`PageSource`].
struct PdfiumPage<'a>(PdfPage<'a>);

impl PageSource for PdfiumPage<'_> {
    fn native_text(&self) -> Result<String, PageError> {
        self.0
            .text()
            .map(|t| t.all())
            .map_err(|e| PageError::Text(format!("{e:?}")))
    }

    fn render(&self, dpi: u32) -> Result<DynamicImage, PageError> {
        let config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_maximum_width(MAX_RENDER_EDGE_PX)
            .set_maximum_height(MAX_RENDER_EDGE_PX);
        let bitmap = self
            .0
            .render_with_config(&config)
            .map_err(|e| PageError::Render(format!("{e:?}")))?;
        Ok(bitmap.as_image())
    }
}

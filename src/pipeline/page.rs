//! Per-page text extraction with an ordered list of strategies.
//!
//! A [`PageExtractor`] tries its strategies in order and stops at the first
//! one that returns non-empty text. The default chain is
//! [`NativeText`] → [`OcrFallback`]: read the page's text layer, and only
//! when that comes back empty render the page and OCR it. Rendering at
//! 300 DPI is the expensive step, so it never runs for pages that already
//! carry text.
//!
//! A failing strategy that still has a successor is logged and skipped
//! (a broken text layer is as good as no text layer). A failure in the last
//! strategy is returned, so an unavailable OCR engine surfaces as an error
//! instead of a silently blank page.

use super::ocr::{OcrEngine, OcrError};
use crate::config::RENDER_DPI;
use crate::output::ExtractionMethod;
use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A failure while extracting one page.
#[derive(Debug, Error)]
pub enum PageError {
    /// The page's text layer could not be read.
    #[error("text layer unreadable: {0}")]
    Text(String),

    /// Rasterisation failed.
    #[error("rasterisation failed: {0}")]
    Render(String),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// One page of a document, as seen by extraction strategies.
pub trait PageSource {
    /// Text from the page's own text layer; empty when there is none.
    fn native_text(&self) -> Result<String, PageError>;

    /// Rasterise the page at `dpi`.
    fn render(&self, dpi: u32) -> Result<DynamicImage, PageError>;
}

/// One way of getting text out of a page.
pub trait ExtractionStrategy: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    fn extract(&self, page: &dyn PageSource) -> Result<String, PageError>;
}

/// Read the page's embedded text layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeText;

impl ExtractionStrategy for NativeText {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Native
    }

    fn extract(&self, page: &dyn PageSource) -> Result<String, PageError> {
        page.native_text()
    }
}

/// Render the page and run OCR over the image.
pub struct OcrFallback {
    engine: Arc<dyn OcrEngine>,
    dpi: u32,
}

impl OcrFallback {
    pub fn new(engine: Arc<dyn OcrEngine>, dpi: u32) -> Self {
        Self { engine, dpi }
    }
}

impl ExtractionStrategy for OcrFallback {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ocr
    }

    fn extract(&self, page: &dyn PageSource) -> Result<String, PageError> {
        let image = page.render(self.dpi)?;
        debug!(
            "Rendered page at {} DPI → {}x{} px, running {}",
            self.dpi,
            image.width(),
            image.height(),
            self.engine.name()
        );
        Ok(self.engine.recognize(&image, self.dpi)?)
    }
}

/// Text of one page and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub text: String,
    pub method: ExtractionMethod,
}

/// Ordered strategy chain for a single page.
pub struct PageExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl PageExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Native text first, OCR at [`RENDER_DPI`] when the page has none.
    pub fn native_then_ocr(engine: Arc<dyn OcrEngine>) -> Self {
        Self::new(vec![
            Box::new(NativeText),
            Box::new(OcrFallback::new(engine, RENDER_DPI)),
        ])
    }

    /// Extract one page. Returns empty text with [`ExtractionMethod::None`]
    /// when every strategy came back empty.
    pub fn extract(&self, page: &dyn PageSource) -> Result<PageText, PageError> {
        let last = self.strategies.len().saturating_sub(1);
        for (i, strategy) in self.strategies.iter().enumerate() {
            match strategy.extract(page) {
                Ok(text) if !text.is_empty() => {
                    return Ok(PageText {
                        text,
                        method: strategy.method(),
                    })
                }
                Ok(_) => debug!("{:?} strategy found no text", strategy.method()),
                Err(e) if i < last => {
                    warn!("{:?} strategy failed, trying next: {}", strategy.method(), e)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(PageText {
            text: String::new(),
            method: ExtractionMethod::None,
        })
    }
}

//! Pipeline stages for document-to-text extraction.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text                      (plain-text uploads)
//!      └──▶ document ──▶ page ──▶ native text
//!                             └──▶ render ──▶ encode ──▶ ocr   (only if empty)
//! ```
//!
//! 1. [`input`]    — the uploaded document; path/URL loading for the CLI
//! 2. [`text`]     — strict UTF-8 decoding
//! 3. [`document`] — open the PDF with pdfium inside `spawn_blocking`
//! 4. [`page`]     — ordered extraction strategies per page
//! 5. [`encode`]   — PNG-encode rendered pages
//! 6. [`ocr`]      — the OCR engine (Tesseract CLI)
//! 7. [`pdfium`]   — library binding

pub mod document;
pub mod encode;
pub mod input;
pub mod ocr;
pub mod page;
pub mod pdfium;
pub mod text;

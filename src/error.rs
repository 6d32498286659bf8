//! Error types for the docsum library.
//!
//! Every failure of a summarisation call lands in exactly one of four
//! categories, matching the four places a call can break:
//!
//! * [`ErrorCategory::Input`] — the request itself is malformed (no file, no
//!   file name, invalid configuration). The caller's fault; never retried.
//! * [`ErrorCategory::Extraction`] — a PDF could not be opened, rendered or
//!   OCR'd. Carries the 1-indexed page number when one page is to blame.
//! * [`ErrorCategory::Decoding`] — a plain-text upload is not valid UTF-8.
//! * [`ErrorCategory::Upstream`] — the completion service could not be
//!   reached, rejected the request, or broke off mid-stream.
//!
//! Errors are reported once and terminate the call. There is no partial
//! result type: a call yields one complete summary or one error.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// All errors returned by the docsum library.
#[derive(Debug, Clone, Error)]
pub enum SummarizeError {
    /// Missing or malformed request (no file, empty name, bad config).
    #[error("{0}")]
    Input(String),

    /// The document could not be parsed, rendered or OCR'd.
    #[error("{}", extraction_message(*page, detail))]
    Extraction { page: Option<usize>, detail: String },

    /// A plain-text upload was not valid UTF-8.
    #[error("File is not valid UTF-8 text: {0}")]
    Decoding(String),

    /// The completion service failed to answer or broke off mid-stream.
    #[error("{stage}: {detail}")]
    Upstream { stage: UpstreamStage, detail: String },
}

fn extraction_message(page: Option<usize>, detail: &str) -> String {
    match page {
        Some(p) => format!("Error extracting text from PDF (page {p}): {detail}"),
        None => format!("Error extracting text from PDF: {detail}"),
    }
}

/// Where an [`SummarizeError::Upstream`] failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamStage {
    /// The call could not be established or was rejected (network, auth, HTTP status).
    Request,
    /// The call was accepted but reading the fragment stream failed.
    Stream,
}

impl fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamStage::Request => f.write_str("Error calling completion service"),
            UpstreamStage::Stream => f.write_str("Error while reading summary stream"),
        }
    }
}

/// Coarse error category, stable across releases and safe to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    #[serde(rename = "InputError")]
    Input,
    #[serde(rename = "ExtractionError")]
    Extraction,
    #[serde(rename = "DecodingError")]
    Decoding,
    #[serde(rename = "UpstreamError")]
    Upstream,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Input => "InputError",
            ErrorCategory::Extraction => "ExtractionError",
            ErrorCategory::Decoding => "DecodingError",
            ErrorCategory::Upstream => "UpstreamError",
        };
        f.write_str(s)
    }
}

/// JSON error body: `{"error": ..., "details": ..., "category": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
    pub category: ErrorCategory,
}

impl SummarizeError {
    pub fn extraction(detail: impl Into<String>) -> Self {
        SummarizeError::Extraction {
            page: None,
            detail: detail.into(),
        }
    }

    pub fn page_extraction(page: usize, detail: impl Into<String>) -> Self {
        SummarizeError::Extraction {
            page: Some(page),
            detail: detail.into(),
        }
    }

    pub fn request(detail: impl Into<String>) -> Self {
        SummarizeError::Upstream {
            stage: UpstreamStage::Request,
            detail: detail.into(),
        }
    }

    pub fn stream(detail: impl Into<String>) -> Self {
        SummarizeError::Upstream {
            stage: UpstreamStage::Stream,
            detail: detail.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SummarizeError::Input(_) => ErrorCategory::Input,
            SummarizeError::Extraction { .. } => ErrorCategory::Extraction,
            SummarizeError::Decoding(_) => ErrorCategory::Decoding,
            SummarizeError::Upstream { .. } => ErrorCategory::Upstream,
        }
    }

    /// Human-readable detail, without the category headline.
    pub fn detail(&self) -> &str {
        match self {
            SummarizeError::Input(d) | SummarizeError::Decoding(d) => d,
            SummarizeError::Extraction { detail, .. } | SummarizeError::Upstream { detail, .. } => {
                detail
            }
        }
    }

    /// HTTP status a transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            SummarizeError::Input(_) => 400,
            _ => 500,
        }
    }

    /// Headline used as the `error` field of [`ErrorBody`].
    fn headline(&self) -> String {
        match self {
            SummarizeError::Input(msg) => msg.clone(),
            SummarizeError::Extraction { page: Some(p), .. } => {
                format!("Error extracting text from PDF (page {p})")
            }
            SummarizeError::Extraction { page: None, .. } => {
                "Error extracting text from PDF".to_string()
            }
            SummarizeError::Decoding(_) => "Error decoding plain text file".to_string(),
            SummarizeError::Upstream { stage, .. } => stage.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.headline(),
            details: self.detail().to_string(),
            category: self.category(),
        }
    }
}

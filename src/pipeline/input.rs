//! Input handling: the uploaded document and how to obtain one.
//!
//! An [`UploadedDocument`] is just a name and bytes. The name decides the
//! extraction route (`.pdf` → PDF pipeline, anything else → UTF-8 text) and
//! is otherwise ignored. The CLI builds documents from local paths or
//! HTTP/HTTPS URLs via [`resolve_input`]; library callers with bytes in hand
//! (e.g. from a multipart form) use [`UploadedDocument::new`] directly.

use crate::error::SummarizeError;
use std::path::Path;
use tracing::{debug, info};

/// Message for a request that carried no file at all.
pub const NO_FILE_UPLOADED: &str = "No file uploaded";

/// Message for a file part with an empty file name.
pub const NO_FILE_SELECTED: &str = "No file selected";

/// Extraction route chosen from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// `.pdf` suffix (ASCII case-insensitive) → [`DocumentKind::Pdf`].
    pub fn from_name(name: &str) -> Self {
        let is_pdf = name.len() >= 4
            && name
                .get(name.len() - 4..)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"));
        if is_pdf {
            DocumentKind::Pdf
        } else {
            DocumentKind::PlainText
        }
    }
}

/// An uploaded file, owned by a single summarisation call.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    name: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_name(&self.name)
    }

    /// A document must at least have a name.
    pub fn validate(&self) -> Result<(), SummarizeError> {
        if self.name.is_empty() {
            return Err(SummarizeError::Input(NO_FILE_SELECTED.to_string()));
        }
        Ok(())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a document from a local path or an HTTP/HTTPS URL.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
) -> Result<UploadedDocument, SummarizeError> {
    if input.is_empty() {
        return Err(SummarizeError::Input(NO_FILE_UPLOADED.to_string()));
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

async fn read_local(path: &Path) -> Result<UploadedDocument, SummarizeError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            SummarizeError::Input(format!("File not found: '{}'", path.display()))
        }
        std::io::ErrorKind::PermissionDenied => {
            SummarizeError::Input(format!("Permission denied reading '{}'", path.display()))
        }
        _ => SummarizeError::Input(format!("Failed to read '{}': {e}", path.display())),
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("Read local file '{}' ({} bytes)", path.display(), bytes.len());
    Ok(UploadedDocument::new(name, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, SummarizeError> {
    info!("Downloading document from: {}", url);
    let fail = |reason: String| SummarizeError::Input(format!("Failed to download '{url}': {reason}"));

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| fail(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            fail(format!("timed out after {timeout_secs}s"))
        } else {
            fail(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let is_pdf_content = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/pdf"));

    let mut name = filename_from_url(url);
    if is_pdf_content && DocumentKind::from_name(&name) != DocumentKind::Pdf {
        name.push_str(".pdf");
    }

    let bytes = response.bytes().await.map_err(|e| fail(e.to_string()))?;
    info!("Downloaded '{}' ({} bytes)", name, bytes.len());
    Ok(UploadedDocument::new(name, bytes.to_vec()))
}

/// Last non-empty URL path segment, or `download`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

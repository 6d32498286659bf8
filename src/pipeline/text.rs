//! Plain-text extraction: the upload is expected to already be UTF-8 text.

use crate::error::SummarizeError;
use tracing::debug;

/// Decode `bytes` as UTF-8, exactly. No lossy fallback, no trimming.
pub fn extract_text(bytes: Vec<u8>) -> Result<String, SummarizeError> {
    let text = String::from_utf8(bytes).map_err(|e| {
        SummarizeError::Decoding(format!(
            "{} (at byte {})",
            e.utf8_error(),
            e.utf8_error().valid_up_to()
        ))
    })?;
    debug!("Decoded plain text: {} chars", text.chars().count());
    Ok(text)
}

//! Assembly of a streamed completion into one summary.
//!
//! The fragment stream is pulled in order, one fragment at a time, until it
//! is exhausted. Content-less fragments are skipped. The first error ends
//! assembly and the partial text is dropped with it: callers get the whole
//! summary or an error, never a truncated summary.

use crate::completion::FragmentStream;
use crate::error::SummarizeError;
use crate::progress::SummarizeProgressCallback;
use futures::StreamExt;
use tracing::{debug, warn};

/// A finished stream: the summary text and how many fragments produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledSummary {
    pub text: String,
    /// Every fragment received, content-less ones included.
    pub fragments: usize,
}

/// Drain `stream` and concatenate fragment content in arrival order.
pub async fn assemble_summary(
    mut stream: FragmentStream,
    progress: Option<&dyn SummarizeProgressCallback>,
) -> Result<AssembledSummary, SummarizeError> {
    let mut text = String::new();
    let mut fragments = 0usize;

    while let Some(item) = stream.next().await {
        let fragment = item.map_err(|e| {
            warn!(
                "Stream failed after {} fragments; discarding {} partial chars",
                fragments,
                text.len()
            );
            e
        })?;
        fragments += 1;

        if let Some(content) = fragment.content {
            if let Some(cb) = progress {
                cb.on_fragment(content.len());
            }
            text.push_str(&content);
        }
    }

    debug!("Stream exhausted after {} fragments", fragments);
    Ok(AssembledSummary { text, fragments })
}

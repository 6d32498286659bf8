//! OCR over rendered page images.
//!
//! [`OcrEngine`] is synchronous: it is only ever called from the blocking
//! extraction thread, one page at a time. [`TesseractOcr`] shells out to the
//! `tesseract` CLI, streaming the PNG through stdin and reading text from
//! stdout, so no temporary files are left behind on any exit path.

use super::encode::encode_png;
use image::DynamicImage;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Why an OCR attempt failed. "No text found" is not a failure.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary could not be started.
    #[error("OCR engine '{cmd}' is unavailable: {source}")]
    Unavailable {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited with an error.
    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The page image could not be handed to the engine.
    #[error("could not encode page image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text recognition over a rendered page.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Recognise text in `image`, rendered at `dpi`. May return an empty string.
    fn recognize(&self, image: &DynamicImage, dpi: u32) -> Result<String, OcrError>;
}

/// The Tesseract command-line engine.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    cmd: PathBuf,
}

impl TesseractOcr {
    pub fn new(cmd: impl Into<PathBuf>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage, dpi: u32) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        let mut child = Command::new(&self.cmd)
            .arg("stdin")
            .arg("stdout")
            .arg("--dpi")
            .arg(dpi.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OcrError::Unavailable {
                cmd: self.cmd.display().to_string(),
                source,
            })?;

        // Tesseract reads the whole image before writing, so a plain write
        // then wait cannot deadlock. Stdin is closed before waiting.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A clean exit after a short read still means the page was not seen.
        written?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract recognised {} chars", text.chars().count());
        Ok(text)
    }
}

//! Binding to the pdfium shared library.
//!
//! Resolution order:
//! 1. `PDFIUM_LIB_PATH` — a library file, or a directory containing the
//!    platform library (`libpdfium.so` / `libpdfium.dylib` / `pdfium.dll`).
//! 2. The platform library in the current directory.
//! 3. The system library search path.

use crate::error::SummarizeError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming an explicit pdfium library or directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, or fail with an extraction error explaining how to fix it.
pub fn bind_pdfium() -> Result<Pdfium, SummarizeError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(&p);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| {
        SummarizeError::extraction(format!(
            "failed to bind to pdfium library: {e:?}. \
             Install pdfium or set {PDFIUM_LIB_PATH_ENV}=/path/to/libpdfium"
        ))
    })?;

    Ok(Pdfium::new(bindings))
}

//! Error types for the doc2md library.
//!
//! One fatal error enum covers the whole conversion pipeline. The capability
//! probe is the single place where failures are *not* surfaced: probing is
//! advisory, so it swallows every error and answers `false` (see
//! [`crate::select::has_text_layer`]). The only internally recovered failure
//! is a per-image OCR error during the container extractor's embedded-image
//! fallback, which is logged and skipped.
//!
//! Every variant carries the offending file path; OCR failures additionally
//! carry the 1-based page number, so a batch driver can report exactly which
//! page of which file broke.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the doc2md library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file extension does not map to any known extractor.
    ///
    /// This is a caller configuration error, not a transient failure:
    /// retrying the same file will never succeed.
    #[error("Unsupported file type: '{path}'\nSupported extensions: .pdf, .docx, .doc")]
    UnsupportedType { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Generic extractor failure (direct extraction, container parsing, ...).
    #[error("Failed to convert '{path}': {reason}")]
    Conversion { path: PathBuf, reason: String },

    /// A page-level render or OCR failure. `page` is 1-based.
    ///
    /// Fatal to the whole extraction: there is no partial-success mode, so
    /// any Markdown accumulated before the failing page is discarded.
    #[error("OCR failed for '{path}' at page {page}: {reason}")]
    Ocr {
        path: PathBuf,
        page: usize,
        reason: String,
    },

    /// The file is a legacy binary `.doc`, detected by its OLE2 signature
    /// before container parsing was attempted.
    #[error(
        "'{path}' is a legacy binary .doc file, which is not supported.\n\
         Re-save it as .docx (an XML-based Word document) and retry."
    )]
    LegacyDocFormat { path: PathBuf },

    /// A capability backend could not be initialised (e.g. no pdfium
    /// library on the search path, missing Tesseract language data).
    #[error("Failed to initialise conversion engines: {0}")]
    EngineInit(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_error_carries_path_and_one_based_page() {
        let e = ConvertError::Ocr {
            path: PathBuf::from("scanned.pdf"),
            page: 3,
            reason: "render glitch".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("scanned.pdf"), "got: {msg}");
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("render glitch"), "got: {msg}");
    }

    #[test]
    fn legacy_doc_message_is_actionable() {
        let e = ConvertError::LegacyDocFormat {
            path: PathBuf::from("old.doc"),
        };
        let msg = e.to_string();
        assert!(msg.contains("old.doc"));
        assert!(msg.contains(".docx"), "should tell the user what to do: {msg}");
    }

    #[test]
    fn unsupported_type_names_the_file() {
        let e = ConvertError::UnsupportedType {
            path: PathBuf::from("notes.txt"),
        };
        assert!(e.to_string().contains("notes.txt"));
    }

    #[test]
    fn invalid_config_display() {
        let e = ConvertError::InvalidConfig("max_pages must be at least 1".into());
        assert!(e.to_string().contains("max_pages"));
    }
}

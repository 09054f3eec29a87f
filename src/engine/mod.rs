//! Capability seams for the conversion pipeline.
//!
//! The pipeline consumes three opaque capabilities: a page-oriented document
//! reader/renderer, an OCR engine, and a container-document parser. Each is
//! a trait here so that:
//!
//! 1. The selection-and-fallback logic in [`crate::select`] and
//!    [`crate::extract`] never names a backend crate directly.
//! 2. Tests can substitute mocks and assert which capabilities were invoked
//!    (e.g. "the OCR engine was never called").
//!
//! Default implementations live in the submodules: [`pdfium`] (pdfium-render),
//! [`tesseract`] (leptess), and [`docx`] (zip + quick-xml).
//!
//! Handle lifecycle: a [`DocumentPages`] borrows its engine and is released
//! by `Drop` on every exit path, including early returns and error paths.

use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

pub mod docx;
pub mod pdfium;
pub mod tesseract;

pub use docx::DocxEngine;
pub use pdfium::PdfiumEngine;
pub use tesseract::TesseractOcr;

/// A failure inside a capability backend.
///
/// Backends report the distinguished [`EngineError::LegacyFormat`] when the
/// input is a legacy binary `.doc` (detected by file signature); everything
/// else is an opaque reason string that the extractors wrap into the
/// appropriate [`crate::error::ConvertError`] variant.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The file carries the OLE2 compound-document signature of a legacy
    /// binary `.doc` rather than the ZIP signature of an OOXML container.
    #[error("legacy binary .doc format")]
    LegacyFormat,

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Shorthand for building an [`EngineError::Other`] from any Display.
    pub fn other(e: impl std::fmt::Display) -> Self {
        EngineError::Other(e.to_string())
    }
}

/// An opened page-oriented document.
///
/// Page indices are 0-based throughout; 1-based numbering appears only in
/// rendered Markdown headings and error messages.
pub trait DocumentPages {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// The machine-readable text layer of a page, or an error if the page
    /// cannot be read.
    fn page_text(&self, index: usize) -> Result<String, EngineError>;

    /// Rasterise a page at the given scale factor (1 ≈ 72 DPI).
    fn render_page(&self, index: usize, scale: u32) -> Result<DynamicImage, EngineError>;
}

/// Opens page-oriented documents and extracts their full text layer.
pub trait DocumentEngine: Send + Sync {
    /// Open a document. The returned handle borrows the engine and is
    /// released when dropped.
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn DocumentPages + 'a>, EngineError>;

    /// Full-document direct extraction: read every page's text layer and
    /// return the assembled Markdown. The backend applies its own internal
    /// page-layout logic; the result is returned verbatim to the caller.
    fn extract_markdown(&self, path: &Path) -> Result<String, EngineError>;
}

/// Derives text from a pixel image.
pub trait OcrEngine: Send + Sync {
    /// Run OCR over a single decoded image and return the recognised text.
    fn recognize(&self, image: &DynamicImage) -> Result<String, EngineError>;
}

/// An intermediate rich-text (HTML-like) rendering of a container document.
#[derive(Debug, Clone)]
pub struct RichText {
    /// The HTML-like markup. Embedded images appear as `<img>` elements with
    /// base64 data URIs so the fallback pass can recover them.
    pub html: String,
    /// Structural, non-fatal issues encountered while parsing. Surfaced as
    /// warnings by the container extractor, never raised.
    pub warnings: Vec<String>,
}

/// Parses structured container documents (DOCX) into [`RichText`].
pub trait ContainerEngine: Send + Sync {
    fn to_richtext(&self, path: &Path) -> Result<RichText, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_other_from_display() {
        let e = EngineError::other("zip archive truncated");
        assert_eq!(e.to_string(), "zip archive truncated");
    }

    #[test]
    fn legacy_format_is_distinguishable() {
        let e = EngineError::LegacyFormat;
        assert!(matches!(e, EngineError::LegacyFormat));
    }
}

//! The three extraction strategies.
//!
//! Each submodule implements exactly one strategy; [`Strategy::extract`] is
//! the single dispatch point the orchestrator calls after selection.
//!
//! ## Data flow
//!
//! ```text
//! select ──▶ direct      text layer, full document, no rendering
//!        ──▶ ocr         render page → recognise → "# Page N" sections
//!        ──▶ container   richtext → markdown, embedded-image OCR fallback
//! ```

use crate::config::ConversionConfig;
use crate::engine::{ContainerEngine, DocumentEngine, OcrEngine};
use crate::error::ConvertError;
use crate::select::Strategy;
use std::path::Path;
use std::sync::Arc;

pub mod container;
pub mod direct;
pub mod ocr;

/// The capability backends a conversion runs against.
///
/// Bundled behind `Arc` so a batch driver can share one set of engines
/// across files without re-binding pdfium or re-reading OCR models.
#[derive(Clone)]
pub struct Engines {
    pub document: Arc<dyn DocumentEngine>,
    pub ocr: Arc<dyn OcrEngine>,
    pub container: Arc<dyn ContainerEngine>,
}

impl Strategy {
    /// Run this strategy's extractor against `path`.
    ///
    /// Returns the assembled Markdown. An empty string is a valid result
    /// meaning "nothing failed, but no text was produced"; the orchestrator
    /// writes no file in that case.
    pub fn extract(
        self,
        path: &Path,
        config: &ConversionConfig,
        engines: &Engines,
    ) -> Result<String, ConvertError> {
        match self {
            Strategy::Direct => direct::extract(path, engines.document.as_ref()),
            Strategy::Ocr => ocr::extract(
                path,
                config,
                engines.document.as_ref(),
                engines.ocr.as_ref(),
            ),
            Strategy::Container => container::extract(
                path,
                config,
                engines.container.as_ref(),
                engines.ocr.as_ref(),
            ),
        }
    }
}

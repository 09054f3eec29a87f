//! Strategy selection: which extractor handles a given file.
//!
//! The decision order is deliberate:
//!
//! 1. Container extensions (`.docx`, `.doc`) always take the container
//!    extractor, even under `force_ocr`. A container is always structurally
//!    "extractable" through its parser, so a text-layer probe is meaningless
//!    at the container level; the OCR decision for containers happens only
//!    as a fallback after a first extraction pass yields nothing (see
//!    [`crate::extract::container`]).
//! 2. PDFs honour `force_ocr`, otherwise the capability probe decides
//!    between direct extraction and OCR.
//! 3. Anything else is an unsupported type — a caller configuration error,
//!    not a transient failure.

use crate::config::ConversionConfig;
use crate::engine::DocumentEngine;
use crate::error::ConvertError;
use std::path::Path;
use tracing::{debug, info};

/// Recognised input classes, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Container,
}

fn file_kind(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(FileKind::Pdf),
        "docx" | "doc" => Some(FileKind::Container),
        _ => None,
    }
}

/// The chosen extraction strategy for one file.
///
/// A plain tagged union: the orchestrator dispatches on the tag through
/// `Strategy::extract` in [`crate::extract`]; there is no converter class
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Read the machine-readable text layer, no rasterisation.
    Direct,
    /// Rasterise pages and run OCR per page.
    Ocr,
    /// Parse the container to rich text, with embedded-image OCR fallback.
    Container,
}

/// Capability probe: is direct extraction likely to succeed?
///
/// Opens the document, inspects only the first page's text layer, and
/// answers true iff the trimmed text is non-empty. Advisory only: every
/// failure (open error, zero pages, unreadable page) is converted into
/// `false`, never propagated. The document handle is dropped before
/// returning on every path.
pub fn has_text_layer(engine: &dyn DocumentEngine, path: &Path) -> bool {
    let doc = match engine.open(path) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("Probe could not open '{}': {e}", path.display());
            return false;
        }
    };
    if doc.page_count() == 0 {
        return false;
    }
    match doc.page_text(0) {
        Ok(text) => !text.trim().is_empty(),
        Err(e) => {
            debug!("Probe could not read page 1 of '{}': {e}", path.display());
            false
        }
    }
}

/// Choose the extraction strategy for `path`.
pub fn select_strategy(
    path: &Path,
    config: &ConversionConfig,
    engine: &dyn DocumentEngine,
) -> Result<Strategy, ConvertError> {
    match file_kind(path) {
        Some(FileKind::Container) => {
            info!("'{}' is a container document", path.display());
            Ok(Strategy::Container)
        }
        Some(FileKind::Pdf) => {
            if config.force_ocr {
                info!("Force OCR enabled, using OCR extraction");
                return Ok(Strategy::Ocr);
            }
            if has_text_layer(engine, path) {
                info!("'{}' has a text layer, using direct extraction", path.display());
                Ok(Strategy::Direct)
            } else {
                info!("'{}' appears to be scanned, using OCR", path.display());
                Ok(Strategy::Ocr)
            }
        }
        None => Err(ConvertError::UnsupportedType {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DocumentPages, EngineError};
    use image::DynamicImage;

    /// Document engine whose only page carries the given text layer.
    struct FixedTextEngine {
        first_page_text: Option<String>,
    }

    struct FixedTextDoc {
        text: Option<String>,
    }

    impl DocumentPages for FixedTextDoc {
        fn page_count(&self) -> usize {
            1
        }
        fn page_text(&self, _index: usize) -> Result<String, EngineError> {
            self.text
                .clone()
                .ok_or_else(|| EngineError::Other("unreadable page".into()))
        }
        fn render_page(&self, _index: usize, _scale: u32) -> Result<DynamicImage, EngineError> {
            Ok(DynamicImage::new_rgb8(1, 1))
        }
    }

    impl DocumentEngine for FixedTextEngine {
        fn open<'a>(
            &'a self,
            _path: &Path,
        ) -> Result<Box<dyn DocumentPages + 'a>, EngineError> {
            Ok(Box::new(FixedTextDoc {
                text: self.first_page_text.clone(),
            }))
        }
        fn extract_markdown(&self, _path: &Path) -> Result<String, EngineError> {
            Ok(String::new())
        }
    }

    /// Engine that cannot open anything.
    struct BrokenEngine;

    impl DocumentEngine for BrokenEngine {
        fn open<'a>(
            &'a self,
            _path: &Path,
        ) -> Result<Box<dyn DocumentPages + 'a>, EngineError> {
            Err(EngineError::Other("corrupt file".into()))
        }
        fn extract_markdown(&self, _path: &Path) -> Result<String, EngineError> {
            Err(EngineError::Other("corrupt file".into()))
        }
    }

    fn config() -> ConversionConfig {
        ConversionConfig::default()
    }

    #[test]
    fn pdf_with_text_selects_direct() {
        let engine = FixedTextEngine {
            first_page_text: Some("Hello".into()),
        };
        let s = select_strategy(Path::new("a.pdf"), &config(), &engine).unwrap();
        assert_eq!(s, Strategy::Direct);
    }

    #[test]
    fn pdf_with_blank_text_selects_ocr() {
        let engine = FixedTextEngine {
            first_page_text: Some("   \n\t ".into()),
        };
        let s = select_strategy(Path::new("a.pdf"), &config(), &engine).unwrap();
        assert_eq!(s, Strategy::Ocr);
    }

    #[test]
    fn force_ocr_overrides_probe_for_pdf() {
        let engine = FixedTextEngine {
            first_page_text: Some("Hello".into()),
        };
        let config = ConversionConfig::builder().force_ocr(true).build().unwrap();
        let s = select_strategy(Path::new("a.pdf"), &config, &engine).unwrap();
        assert_eq!(s, Strategy::Ocr);
    }

    #[test]
    fn container_extension_wins_even_under_force_ocr() {
        let engine = BrokenEngine;
        let config = ConversionConfig::builder().force_ocr(true).build().unwrap();
        for name in ["report.docx", "REPORT.DOCX", "legacy.doc"] {
            let s = select_strategy(Path::new(name), &config, &engine).unwrap();
            assert_eq!(s, Strategy::Container, "{name}");
        }
    }

    #[test]
    fn unrecognised_extension_is_unsupported() {
        let engine = BrokenEngine;
        let err = select_strategy(Path::new("notes.txt"), &config(), &engine).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedType { .. }));
    }

    #[test]
    fn probe_swallows_open_failures() {
        assert!(!has_text_layer(&BrokenEngine, Path::new("broken.pdf")));
    }

    #[test]
    fn probe_swallows_page_read_failures() {
        let engine = FixedTextEngine {
            first_page_text: None,
        };
        assert!(!has_text_layer(&engine, Path::new("odd.pdf")));
    }

    #[test]
    fn extension_is_case_insensitive() {
        let engine = FixedTextEngine {
            first_page_text: Some("x".into()),
        };
        let s = select_strategy(Path::new("A.PDF"), &config(), &engine).unwrap();
        assert_eq!(s, Strategy::Direct);
    }
}

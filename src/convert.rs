//! Conversion orchestrator: validate, select, extract, persist.
//!
//! [`Converter::convert`] runs one file end to end:
//!
//! 1. fail fast if the input does not exist;
//! 2. compute the output path (`output_dir/stem.md`, or a `markdown/`
//!    directory next to the input);
//! 3. honour the skip-existing policy *before* any extractor runs;
//! 4. create the output directory;
//! 5. dispatch through the strategy selector;
//! 6. persist non-empty Markdown atomically (temp file + rename, so an
//!    interrupted process never leaves a partial output file); an empty
//!    result writes nothing.
//!
//! Everything is synchronous and sequential: one file, one thread, no shared
//! mutable state. Batch drivers parallelise across files if they want to,
//! sharing the [`Engines`] bundle.

use crate::config::ConversionConfig;
use crate::engine::{DocxEngine, PdfiumEngine, TesseractOcr};
use crate::error::ConvertError;
use crate::extract::Engines;
use crate::select::select_strategy;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Markdown was extracted and written to this path.
    Written(PathBuf),
    /// The output file already existed and `skip_existing` was set;
    /// no extractor was invoked.
    SkippedExisting(PathBuf),
    /// Extraction succeeded but produced no text; no file was written.
    NoContent,
}

impl ConversionOutcome {
    /// The written output path, if any.
    pub fn output_path(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Written(p) => Some(p),
            _ => None,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, ConversionOutcome::Written(_))
    }
}

/// Converts documents to Markdown files.
///
/// Holds the capability backends; construct once and reuse across files.
pub struct Converter {
    engines: Engines,
}

impl Converter {
    /// Create a converter with the default backends: pdfium for PDFs,
    /// Tesseract (`eng`) for OCR, and the built-in DOCX parser.
    pub fn new() -> Result<Self, ConvertError> {
        let document =
            PdfiumEngine::new().map_err(|e| ConvertError::EngineInit(e.to_string()))?;
        Ok(Self::with_engines(Engines {
            document: Arc::new(document),
            ocr: Arc::new(TesseractOcr::default()),
            container: Arc::new(DocxEngine::new()),
        }))
    }

    /// Create a converter over caller-supplied backends.
    ///
    /// This is the seam tests use to substitute mock engines.
    pub fn with_engines(engines: Engines) -> Self {
        Self { engines }
    }

    /// Convert one file to Markdown on disk.
    pub fn convert(
        &self,
        path: impl AsRef<Path>,
        config: &ConversionConfig,
    ) -> Result<ConversionOutcome, ConvertError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let output_path = output_path_for(path, config.output_dir.as_deref());

        if config.skip_existing && output_path.exists() {
            info!(
                "Output '{}' already exists, skipping conversion",
                output_path.display()
            );
            return Ok(ConversionOutcome::SkippedExisting(output_path));
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConvertError::OutputWriteFailed {
                path: output_path.clone(),
                source: e,
            })?;
        }

        let strategy = select_strategy(path, config, self.engines.document.as_ref())?;
        debug!("Selected {strategy:?} strategy for '{}'", path.display());

        let markdown = strategy.extract(path, config, &self.engines)?;

        if markdown.is_empty() {
            info!("No text extracted from '{}', not writing a file", path.display());
            return Ok(ConversionOutcome::NoContent);
        }

        write_atomic(&output_path, &markdown)?;
        info!("Saved markdown to '{}'", output_path.display());
        Ok(ConversionOutcome::Written(output_path))
    }
}

/// Convert a single file with the default backends.
///
/// Convenience wrapper for one-shot use; batch callers should construct a
/// [`Converter`] once instead.
///
/// # Example
/// ```rust,no_run
/// use doc2md::{convert, ConversionConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::default();
/// let outcome = convert("document.pdf", &config)?;
/// if let Some(path) = outcome.output_path() {
///     println!("wrote {}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, ConvertError> {
    Converter::new()?.convert(path, config)
}

/// Compute the output path for an input file.
///
/// `output_dir/stem.md` when an output directory is configured, otherwise a
/// `markdown/` directory created next to the input.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{stem}.md");

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("markdown")
            .join(file_name),
    }
}

/// Single atomic write: temp file in the target directory, then rename.
fn write_atomic(path: &Path, content: &str) -> Result<(), ConvertError> {
    let tmp_path = path.with_extension("md.tmp");

    fs::write(&tmp_path, content).map_err(|e| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::rename(&tmp_path, path).map_err(|e| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_configured_directory() {
        let out = output_path_for(Path::new("/data/report.pdf"), Some(Path::new("/out")));
        assert_eq!(out, PathBuf::from("/out/report.md"));
    }

    #[test]
    fn output_path_defaults_to_markdown_sibling_dir() {
        let out = output_path_for(Path::new("/data/report.pdf"), None);
        assert_eq!(out, PathBuf::from("/data/markdown/report.md"));
    }

    #[test]
    fn output_path_strips_original_extension() {
        let out = output_path_for(Path::new("notes.docx"), Some(Path::new("o")));
        assert_eq!(out, PathBuf::from("o/notes.md"));
    }

    #[test]
    fn atomic_write_round_trips_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.md");
        let content = "# Titre\n\ncafé – naïve — ✓\n";

        write_atomic(&target, content).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), content);
        assert!(
            !target.with_extension("md.tmp").exists(),
            "temp file must not survive the rename"
        );
    }

    #[test]
    fn outcome_helpers() {
        let written = ConversionOutcome::Written(PathBuf::from("a.md"));
        assert!(written.was_written());
        assert_eq!(written.output_path(), Some(Path::new("a.md")));

        assert!(ConversionOutcome::NoContent.output_path().is_none());
        assert!(!ConversionOutcome::SkippedExisting(PathBuf::from("a.md")).was_written());
    }
}

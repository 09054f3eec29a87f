//! Configuration types for document-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The struct is immutable once built:
//! validation happens exactly once in [`ConversionConfigBuilder::build`], so
//! a config in your hands is a config that has already been checked, and no
//! option can fail at use time.
//!
//! # Design choice: builder over constructor
//! A positional constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults for
//! the rest; "updating" a config means building a new one.

use crate::error::ConvertError;
use crate::observer::ConversionObserver;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a single document conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .max_pages(10)
///     .force_ocr(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Output directory for Markdown files. Default: `None`.
    ///
    /// When unset, output goes to a `markdown/` directory created next to
    /// the input file.
    pub output_dir: Option<PathBuf>,

    /// Maximum number of pages to OCR per document. Default: `None` (all pages).
    ///
    /// Values larger than the true page count are silently clamped; the cap
    /// is a budget, not an assertion about the document. Must be ≥ 1.
    pub max_pages: Option<usize>,

    /// Force OCR for PDF documents even when a text layer is present. Default: false.
    ///
    /// Has no effect on container documents, whose OCR decision is made only
    /// as a fallback after a first extraction pass yields nothing.
    pub force_ocr: bool,

    /// Skip conversion when the output file already exists. Default: true.
    pub skip_existing: bool,

    /// Rasterisation scale factor for OCR rendering. Default: 2 (≈144 DPI).
    ///
    /// Tesseract accuracy drops sharply below ~120 DPI; 2× is the sweet spot
    /// between recognition quality and render time. Must be ≥ 1.
    pub ocr_render_scale: u32,

    /// Report progress every N pages during OCR. Default: 5. Must be ≥ 1.
    ///
    /// The last page is always reported regardless of the interval.
    pub progress_interval: usize,

    /// Observer for progress and warning events. Default: `None` (silent).
    pub observer: Option<Arc<dyn ConversionObserver>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_pages: None,
            force_ocr: false,
            skip_existing: true,
            ocr_render_scale: 2,
            progress_interval: 5,
            observer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("max_pages", &self.max_pages)
            .field("force_ocr", &self.force_ocr)
            .field("skip_existing", &self.skip_existing)
            .field("ocr_render_scale", &self.ocr_render_scale)
            .field("progress_interval", &self.progress_interval)
            .field(
                "observer",
                &self.observer.as_ref().map(|_| "<dyn ConversionObserver>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn force_ocr(mut self, v: bool) -> Self {
        self.config.force_ocr = v;
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn ocr_render_scale(mut self, scale: u32) -> Self {
        self.config.ocr_render_scale = scale;
        self
    }

    pub fn progress_interval(mut self, n: usize) -> Self {
        self.config.progress_interval = n;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ConversionObserver>) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// All numeric options must be ≥ 1. Validation failures surface here as
    /// [`ConvertError::InvalidConfig`], never later at use time.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if let Some(n) = c.max_pages {
            if n < 1 {
                return Err(ConvertError::InvalidConfig(
                    "max_pages must be at least 1".into(),
                ));
            }
        }
        if c.ocr_render_scale < 1 {
            return Err(ConvertError::InvalidConfig(
                "ocr_render_scale must be at least 1".into(),
            ));
        }
        if c.progress_interval < 1 {
            return Err(ConvertError::InvalidConfig(
                "progress_interval must be at least 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ConversionConfig::builder().build().unwrap();
        assert!(config.output_dir.is_none());
        assert!(config.max_pages.is_none());
        assert!(!config.force_ocr);
        assert!(config.skip_existing);
        assert_eq!(config.ocr_render_scale, 2);
        assert_eq!(config.progress_interval, 5);
    }

    #[test]
    fn max_pages_zero_is_rejected() {
        let err = ConversionConfig::builder().max_pages(0).build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
        assert!(err.to_string().contains("max_pages"));
    }

    #[test]
    fn max_pages_one_is_accepted() {
        let config = ConversionConfig::builder().max_pages(1).build().unwrap();
        assert_eq!(config.max_pages, Some(1));
    }

    #[test]
    fn render_scale_zero_is_rejected() {
        let err = ConversionConfig::builder()
            .ocr_render_scale(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ocr_render_scale"));
    }

    #[test]
    fn progress_interval_zero_is_rejected() {
        let err = ConversionConfig::builder()
            .progress_interval(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("progress_interval"));
    }

    #[test]
    fn debug_elides_observer() {
        use crate::observer::NoopObserver;
        let config = ConversionConfig::builder()
            .observer(Arc::new(NoopObserver))
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("<dyn ConversionObserver>"));
    }
}

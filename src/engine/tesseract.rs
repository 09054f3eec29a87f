//! Tesseract (leptess) backed [`OcrEngine`].
//!
//! leptess expects *encoded* image bytes rather than a raw pixel buffer, so
//! each call PNG-encodes the image in memory first. A fresh `LepTess` is
//! created per call: initialisation is cheap compared to recognition, and it
//! keeps all OCR session state scoped to a single extractor invocation.

use crate::engine::{EngineError, OcrEngine};
use image::DynamicImage;
use leptess::LepTess;
use std::io::Cursor;
use tracing::debug;

/// OCR engine backed by Tesseract via leptess.
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    /// Create an engine for the given Tesseract language code
    /// (e.g. `"eng"`, `"eng+fra"`).
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, EngineError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineError::Other(format!(
                "image dimensions must be non-zero (got {}x{})",
                image.width(),
                image.height()
            )));
        }

        // leptess decodes from encoded bytes, not raw pixels.
        let mut png_buf = Cursor::new(Vec::new());
        image
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .map_err(|e| EngineError::Other(format!("failed to encode image to PNG: {e}")))?;

        let mut tess = LepTess::new(None, &self.language)
            .map_err(|e| EngineError::Other(format!("failed to initialise Tesseract: {e}")))?;

        tess.set_image_from_mem(png_buf.get_ref())
            .map_err(|e| EngineError::Other(format!("failed to set image: {e}")))?;

        let text = tess
            .get_utf8_text()
            .map_err(|e| EngineError::Other(format!("recognition failed: {e}")))?;

        debug!(
            "OCR recognised {} bytes from {}x{} px image",
            text.len(),
            image.width(),
            image.height()
        );
        Ok(text)
    }
}

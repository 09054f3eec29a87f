//! pdfium-render backed [`DocumentEngine`].
//!
//! pdfium is the same renderer Chrome ships, which makes it the most
//! battle-tested option for both the text-layer reads used by the capability
//! probe and the rasterisation used by the OCR extractor. The shared library
//! is looked up next to the executable first, then on the system search path
//! (set `PDFIUM_LIB_PATH`-style overrides via `LD_LIBRARY_PATH`).

use crate::engine::{DocumentEngine, DocumentPages, EngineError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Document engine backed by the pdfium shared library.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Bind to a pdfium library: a copy next to the executable wins,
    /// otherwise fall back to the system search path.
    pub fn new() -> Result<Self, EngineError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| EngineError::Other(format!("failed to bind pdfium library: {e:?}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl DocumentEngine for PdfiumEngine {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn DocumentPages + 'a>, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Other(format!("{e:?}")))?;
        Ok(Box::new(PdfiumDocument { document }))
    }

    fn extract_markdown(&self, path: &Path) -> Result<String, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Other(format!("{e:?}")))?;

        let mut parts: Vec<String> = Vec::new();
        for page in document.pages().iter() {
            let text = page
                .text()
                .map_err(|e| EngineError::Other(format!("{e:?}")))?
                .all();
            parts.push(text);
        }
        debug!("Direct extraction read {} pages", parts.len());
        Ok(parts.join("\n\n"))
    }
}

/// An open pdfium document. Borrows the engine; dropped on every exit path.
struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl DocumentPages for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, EngineError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| EngineError::Other(format!("{e:?}")))?;
        let text = page
            .text()
            .map_err(|e| EngineError::Other(format!("{e:?}")))?
            .all();
        Ok(text)
    }

    fn render_page(&self, index: usize, scale: u32) -> Result<DynamicImage, EngineError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| EngineError::Other(format!("{e:?}")))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale as f32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| EngineError::Other(format!("{e:?}")))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} at {}x → {}x{} px",
            index + 1,
            scale,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

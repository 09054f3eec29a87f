//! Page-by-page OCR extraction for scanned documents.
//!
//! Pages are processed in strict ascending order so the `# Page N` sections
//! of the output appear in page order. Any single page failure (render or
//! recognition) aborts the whole extraction — there is no partial-success
//! mode, so Markdown accumulated before the failing page is discarded and
//! the error carries the 1-based page number.

use crate::config::ConversionConfig;
use crate::engine::{DocumentEngine, OcrEngine};
use crate::error::ConvertError;
use std::path::Path;
use tracing::{debug, info};

pub fn extract(
    path: &Path,
    config: &ConversionConfig,
    document: &dyn DocumentEngine,
    ocr: &dyn OcrEngine,
) -> Result<String, ConvertError> {
    info!("OCR extraction for '{}'", path.display());

    let doc = document.open(path).map_err(|e| ConvertError::Conversion {
        path: path.to_path_buf(),
        reason: format!("failed to open document: {e}"),
    })?;

    let total_pages = doc.page_count();
    // max_pages beyond the true count is a budget, silently clamped.
    let num_pages = config
        .max_pages
        .map_or(total_pages, |m| m.min(total_pages));

    info!("Processing {num_pages} of {total_pages} pages with OCR");

    let mut parts: Vec<String> = Vec::with_capacity(num_pages);

    for index in 0..num_pages {
        let page_num = index + 1;

        let image = doc
            .render_page(index, config.ocr_render_scale)
            .map_err(|e| ConvertError::Ocr {
                path: path.to_path_buf(),
                page: page_num,
                reason: format!("render failed: {e}"),
            })?;

        let text = ocr.recognize(&image).map_err(|e| ConvertError::Ocr {
            path: path.to_path_buf(),
            page: page_num,
            reason: e.to_string(),
        })?;

        parts.push(format!("\n\n# Page {page_num}\n\n{text}"));

        if index % config.progress_interval == 0 || index == num_pages - 1 {
            debug!("Processed page {page_num}/{num_pages}");
            if let Some(ref obs) = config.observer {
                obs.on_progress(page_num, num_pages);
            }
        }
    }

    let result = parts.concat();
    info!("Extracted {} characters via OCR", result.len());
    Ok(result)
}

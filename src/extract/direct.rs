//! Direct extraction: read the document's text layer, no rendering.
//!
//! The fast path for digital PDFs. The backend runs in full-document mode
//! and applies its own page-layout logic; whatever it returns is passed
//! through verbatim.

use crate::engine::DocumentEngine;
use crate::error::ConvertError;
use std::path::Path;
use tracing::info;

pub fn extract(path: &Path, engine: &dyn DocumentEngine) -> Result<String, ConvertError> {
    info!("Extracting text layer from '{}'", path.display());

    let markdown = engine
        .extract_markdown(path)
        .map_err(|e| ConvertError::Conversion {
            path: path.to_path_buf(),
            reason: format!("text extraction failed: {e}"),
        })?;

    info!("Extracted {} characters", markdown.len());
    Ok(markdown)
}

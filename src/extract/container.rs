//! Container-document extraction with embedded-image OCR fallback.
//!
//! Two passes. First the container is parsed into rich text and rendered to
//! Markdown with images stripped. If that Markdown trims down to nothing,
//! the document is treated as image-only: the rich text is scanned for
//! base64-embedded images, each is decoded and OCR'd in discovery order, and
//! non-empty recognitions become `# Image N` sections.
//!
//! Per-image failures in the fallback pass (undecodable base64, unreadable
//! image bytes, OCR errors) are the one internally recovered failure mode in
//! the crate: logged, reported to the observer, and skipped — the loop
//! continues with the next image.

use crate::config::ConversionConfig;
use crate::engine::{ContainerEngine, EngineError, OcrEngine};
use crate::error::ConvertError;
use crate::markdown::{embedded_image_payloads, richtext_to_markdown};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::Path;
use tracing::{info, warn};

pub fn extract(
    path: &Path,
    config: &ConversionConfig,
    container: &dyn ContainerEngine,
    ocr: &dyn OcrEngine,
) -> Result<String, ConvertError> {
    info!("Container extraction for '{}'", path.display());

    let rich = container.to_richtext(path).map_err(|e| match e {
        EngineError::LegacyFormat => ConvertError::LegacyDocFormat {
            path: path.to_path_buf(),
        },
        EngineError::Other(reason) => ConvertError::Conversion {
            path: path.to_path_buf(),
            reason: format!("container parsing failed: {reason}"),
        },
    })?;

    for warning in &rich.warnings {
        warn!("'{}': {warning}", path.display());
        if let Some(ref obs) = config.observer {
            obs.on_warning(warning);
        }
    }

    let markdown = richtext_to_markdown(&rich.html, true);
    if !markdown.trim().is_empty() {
        info!("Extracted {} characters", markdown.len());
        return Ok(markdown);
    }

    // Empty result with no error: the document is likely image-only.
    info!(
        "'{}' yielded no text, falling back to embedded-image OCR",
        path.display()
    );
    ocr_embedded_images(path, config, &rich.html, ocr)
}

/// OCR every base64-embedded image in the rich text, in discovery order.
fn ocr_embedded_images(
    path: &Path,
    config: &ConversionConfig,
    richtext: &str,
    ocr: &dyn OcrEngine,
) -> Result<String, ConvertError> {
    let payloads = embedded_image_payloads(richtext);
    if payloads.is_empty() {
        info!("No embedded images found in '{}'", path.display());
        return Ok(String::new());
    }

    let total = payloads.len();
    info!("Found {total} embedded image(s) to OCR");

    let mut parts: Vec<String> = Vec::new();

    for (index, payload) in payloads.iter().enumerate() {
        let image_num = index + 1;

        let skip = |reason: String| {
            warn!(
                "'{}': skipping embedded image {image_num}: {reason}",
                path.display()
            );
            if let Some(ref obs) = config.observer {
                obs.on_warning(&format!("skipped embedded image {image_num}: {reason}"));
            }
        };

        let bytes = match BASE64.decode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                skip(format!("invalid base64: {e}"));
                continue;
            }
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(e) => {
                skip(format!("undecodable image data: {e}"));
                continue;
            }
        };

        let text = match ocr.recognize(&image) {
            Ok(text) => text,
            Err(e) => {
                skip(format!("OCR failed: {e}"));
                continue;
            }
        };

        if !text.trim().is_empty() {
            parts.push(format!("\n\n# Image {image_num}\n\n{text}"));
        }

        if let Some(ref obs) = config.observer {
            obs.on_progress(image_num, total);
        }
    }

    let result = parts.concat();
    info!(
        "Embedded-image OCR produced {} characters from {total} image(s)",
        result.len()
    );
    Ok(result)
}

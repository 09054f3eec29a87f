//! DOCX backed [`ContainerEngine`]: ZIP + XML parsing into rich text.
//!
//! A `.docx` file is a ZIP archive of XML parts:
//!
//! - `word/document.xml` — main content (paragraphs, runs, tables, drawings)
//! - `word/_rels/document.xml.rels` — relationship ids → part targets
//! - `word/media/*` — embedded image payloads
//!
//! This engine flattens that structure into an HTML-like rich-text string:
//! headings (`<h1>`–`<h6>`), paragraphs, bold/italic runs, list items,
//! tables, and embedded images inlined as base64 data URIs. Inlining the
//! image bytes matters: the container extractor's fallback pass recovers
//! them from the rich text when the document turns out to be image-only.
//!
//! The legacy binary `.doc` format is rejected up front by its OLE2 file
//! signature, before any ZIP parsing is attempted, so the caller gets a
//! distinguished [`EngineError::LegacyFormat`] instead of an opaque
//! "not a zip archive" failure.

use crate::engine::{ContainerEngine, EngineError, RichText};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// ZIP local-file-header signature ("PK\x03\x04").
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE2 compound-document signature carried by legacy binary `.doc` files.
const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container engine for OOXML word-processor documents.
#[derive(Default)]
pub struct DocxEngine;

impl DocxEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ContainerEngine for DocxEngine {
    fn to_richtext(&self, path: &Path) -> Result<RichText, EngineError> {
        sniff_container(path)?;

        let file = File::open(path).map_err(EngineError::other)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| EngineError::Other(format!("not a readable DOCX archive: {e}")))?;

        let relationships = read_relationships(&mut archive);
        let document_xml = read_part(&mut archive, "word/document.xml")
            .ok_or_else(|| EngineError::Other("missing word/document.xml part".into()))?;
        let document_xml = String::from_utf8_lossy(&document_xml).into_owned();

        let mut builder = RichTextBuilder::new(relationships);
        builder.parse(&document_xml)?;
        let (html, mut warnings) = builder.finish();

        // Resolve image relationships against word/media only after the main
        // parse, so a single corrupt media part cannot abort the document.
        let html = inline_media(html, &mut archive, &mut warnings);

        debug!(
            "DOCX parsed: {} bytes of rich text, {} warnings",
            html.len(),
            warnings.len()
        );
        Ok(RichText { html, warnings })
    }
}

/// Reject non-container files by signature before ZIP parsing.
fn sniff_container(path: &Path) -> Result<(), EngineError> {
    let mut file = File::open(path).map_err(EngineError::other)?;
    let mut magic = [0u8; 8];
    // A single read() may legitimately return fewer bytes than requested;
    // keep filling until the buffer is full or EOF.
    let mut n = 0;
    while n < magic.len() {
        match file.read(&mut magic[n..]).map_err(EngineError::other)? {
            0 => break,
            read => n += read,
        }
    }

    if n >= 8 && magic == OLE2_MAGIC {
        return Err(EngineError::LegacyFormat);
    }
    if n >= 4 && magic[..4] == ZIP_MAGIC {
        return Ok(());
    }
    Err(EngineError::Other(
        "file signature is neither OOXML (ZIP) nor legacy .doc".into(),
    ))
}

/// Read a ZIP part fully into memory, `None` if absent or unreadable.
fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Option<Vec<u8>> {
    let mut part = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    part.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Parse `word/_rels/document.xml.rels` into rel-id → target map.
fn read_relationships(archive: &mut ZipArchive<File>) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Some(data) = read_part(archive, "word/_rels/document.xml.rels") else {
        return rels;
    };
    let xml = String::from_utf8_lossy(&data);
    let mut reader = Reader::from_str(&xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_value(&e, b"Id");
                let target = attr_value(&e, b"Target");
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    rels
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == key {
            String::from_utf8(a.value.to_vec()).ok()
        } else {
            None
        }
    })
}

/// Replace `{{media:target}}` placeholders with base64 data URIs.
///
/// Unresolvable media parts degrade to a warning; the `<img>` element is
/// dropped rather than failing the whole document.
fn inline_media(
    html: String,
    archive: &mut ZipArchive<File>,
    warnings: &mut Vec<String>,
) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html.as_str();

    while let Some(start) = rest.find("{{media:") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 8..];
        let Some(end) = after.find("}}") else {
            // Unterminated placeholder; keep the remainder verbatim.
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let target = &after[..end];
        let part_name = format!("word/{target}");
        match read_part(archive, &part_name) {
            Some(bytes) => {
                let mime = mime_for_target(target);
                out.push_str(&format!(
                    "<img src=\"data:{};base64,{}\"/>",
                    mime,
                    BASE64.encode(&bytes)
                ));
            }
            None => {
                warnings.push(format!("embedded image part '{part_name}' not found"));
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn mime_for_target(target: &str) -> &'static str {
    let ext = target.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "image/png",
    }
}

// ── document.xml parsing ─────────────────────────────────────────────────

/// Streaming state machine that flattens WordprocessingML into rich text.
struct RichTextBuilder {
    relationships: HashMap<String, String>,
    html: String,
    warnings: Vec<String>,
    /// Buffer for the paragraph being assembled.
    para: String,
    heading_level: Option<usize>,
    list_item: bool,
    /// Run formatting flags, reset at each `<w:r>`.
    run_bold: bool,
    run_italic: bool,
    in_run_props: bool,
    in_text: bool,
    table_depth: usize,
}

impl RichTextBuilder {
    fn new(relationships: HashMap<String, String>) -> Self {
        Self {
            relationships,
            html: String::new(),
            warnings: Vec::new(),
            para: String::new(),
            heading_level: None,
            list_item: false,
            run_bold: false,
            run_italic: false,
            in_run_props: false,
            in_text: false,
            table_depth: 0,
        }
    }

    fn parse(&mut self, xml: &str) -> Result<(), EngineError> {
        let mut reader = Reader::from_str(xml);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => self.on_start(&e),
                Ok(Event::Empty(e)) => self.on_empty(&e),
                Ok(Event::End(e)) => self.on_end(e.local_name().as_ref()),
                Ok(Event::Text(t)) => {
                    if self.in_text {
                        let text = t.unescape().unwrap_or_default();
                        self.push_run_text(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(EngineError::Other(format!(
                        "malformed document.xml: {e}"
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn on_start(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:p" => {
                self.para.clear();
                self.heading_level = None;
                self.list_item = false;
            }
            b"w:r" => {
                self.run_bold = false;
                self.run_italic = false;
            }
            b"w:rPr" => self.in_run_props = true,
            b"w:t" => self.in_text = true,
            b"w:tbl" => {
                self.table_depth += 1;
                self.html.push_str("<table>");
            }
            b"w:tr" => self.html.push_str("<tr>"),
            b"w:tc" => self.html.push_str("<td>"),
            _ => {}
        }
    }

    fn on_empty(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:pStyle" => {
                if let Some(style) = attr_value(e, b"w:val") {
                    self.heading_level = heading_level_for_style(&style);
                }
            }
            // A numbering reference marks the paragraph as a list item.
            b"w:numPr" | b"w:ilvl" | b"w:numId" => self.list_item = true,
            b"w:b" => {
                if self.in_run_props {
                    self.run_bold = !matches!(attr_value(e, b"w:val").as_deref(), Some("0" | "false"));
                }
            }
            b"w:i" => {
                if self.in_run_props {
                    self.run_italic =
                        !matches!(attr_value(e, b"w:val").as_deref(), Some("0" | "false"));
                }
            }
            b"w:br" => self.para.push_str("<br/>"),
            b"a:blip" => {
                if let Some(rel_id) = attr_value(e, b"r:embed") {
                    match self.relationships.get(&rel_id) {
                        Some(target) => {
                            // Placeholder resolved against word/media after
                            // the parse (see inline_media).
                            self.para.push_str(&format!("{{{{media:{target}}}}}"));
                        }
                        None => self.warnings.push(format!(
                            "image relationship '{rel_id}' has no target in document.xml.rels"
                        )),
                    }
                }
            }
            _ => {}
        }
    }

    fn on_end(&mut self, local: &[u8]) {
        // Local names here because End events for prefixed elements still
        // expose the full qname via name(); matching either works, but the
        // starts above already matched qnames.
        match local {
            b"p" => self.flush_paragraph(),
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"tc" => self.html.push_str("</td>"),
            b"tr" => self.html.push_str("</tr>"),
            b"tbl" => {
                self.table_depth = self.table_depth.saturating_sub(1);
                self.html.push_str("</table>");
            }
            _ => {}
        }
    }

    fn push_run_text(&mut self, text: &str) {
        let escaped = escape(text);
        match (self.run_bold, self.run_italic) {
            (true, true) => {
                self.para
                    .push_str(&format!("<strong><em>{escaped}</em></strong>"))
            }
            (true, false) => self.para.push_str(&format!("<strong>{escaped}</strong>")),
            (false, true) => self.para.push_str(&format!("<em>{escaped}</em>")),
            (false, false) => self.para.push_str(&escaped),
        }
    }

    fn flush_paragraph(&mut self) {
        if self.para.is_empty() {
            return;
        }
        let body = std::mem::take(&mut self.para);
        if self.table_depth > 0 {
            // Cell content: no paragraph wrapper, keep cells single-line.
            self.html.push_str(&body);
        } else if let Some(level) = self.heading_level {
            self.html.push_str(&format!("<h{level}>{body}</h{level}>"));
        } else if self.list_item {
            self.html.push_str(&format!("<li>{body}</li>"));
        } else {
            self.html.push_str(&format!("<p>{body}</p>"));
        }
    }

    fn finish(self) -> (String, Vec<String>) {
        (self.html, self.warnings)
    }
}

/// Map a paragraph style id to a heading level.
fn heading_level_for_style(style: &str) -> Option<usize> {
    if style.eq_ignore_ascii_case("title") {
        return Some(1);
    }
    let level = style.strip_prefix("Heading")?.parse::<usize>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

//! Rich-text (HTML-like) to Markdown rendering, plus the embedded-image scan
//! used by the container extractor's OCR fallback.
//!
//! The renderer understands exactly the element subset the container engine
//! emits: `h1`–`h6`, `p`, `strong`, `em`, `li`, `table`/`tr`/`td`, `br`, and
//! `img`. Images are stripped by default — inlining base64 payloads into
//! Markdown would bloat the output without bound — but their data URIs stay
//! discoverable in the rich text for the fallback pass.

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

/// Convert rich text to Markdown.
///
/// With `strip_images` set (the normal mode), `<img>` elements contribute
/// nothing to the output. With it unset, images are rendered as Markdown
/// image links pointing at their (data-URI) source.
pub fn richtext_to_markdown(richtext: &str, strip_images: bool) -> String {
    let mut reader = Reader::from_str(richtext);

    let mut blocks: Vec<String> = Vec::new();
    let mut inline = String::new();
    let mut heading: Option<usize> = None;
    let mut last_was_list_item = false;

    // Table assembly state.
    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut in_table = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6" => {
                    heading = Some((e.name().as_ref()[1] - b'0') as usize);
                    inline.clear();
                }
                b"p" | b"li" => inline.clear(),
                b"strong" => inline.push_str("**"),
                b"em" => inline.push('*'),
                b"table" => {
                    in_table = true;
                    table_rows.clear();
                }
                b"tr" => current_row.clear(),
                b"td" => inline.clear(),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6" => {
                    let level = heading.take().unwrap_or(1);
                    blocks.push(format!("{} {}", "#".repeat(level), inline.trim()));
                    inline.clear();
                    last_was_list_item = false;
                }
                b"p" => {
                    if !inline.trim().is_empty() {
                        blocks.push(inline.trim().to_string());
                    }
                    inline.clear();
                    last_was_list_item = false;
                }
                b"li" => {
                    let item = format!("- {}", inline.trim());
                    if last_was_list_item {
                        // Consecutive items share one block, one per line.
                        if let Some(last) = blocks.last_mut() {
                            last.push('\n');
                            last.push_str(&item);
                        }
                    } else {
                        blocks.push(item);
                    }
                    inline.clear();
                    last_was_list_item = true;
                }
                b"strong" => inline.push_str("**"),
                b"em" => inline.push('*'),
                b"td" => {
                    current_row.push(inline.trim().to_string());
                    inline.clear();
                }
                b"tr" => table_rows.push(std::mem::take(&mut current_row)),
                b"table" => {
                    in_table = false;
                    if let Some(rendered) = render_table(&table_rows) {
                        blocks.push(rendered);
                    }
                    table_rows.clear();
                    last_was_list_item = false;
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"br" => inline.push('\n'),
                b"img" => {
                    if !strip_images {
                        let src = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"src")
                            .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
                            .unwrap_or_default();
                        inline.push_str(&format!("![image]({src})"));
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let text = t.unescape().unwrap_or_default();
                // Whitespace-only runs still separate inline elements
                // (`<strong>a</strong> <strong>b</strong>`), but between
                // blocks they are formatting noise.
                if in_table || heading.is_some() || !inline.is_empty() || !text.trim().is_empty()
                {
                    inline.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            // Tolerate malformed markup: render what was understood so far.
            Err(_) => break,
            _ => {}
        }
    }

    blocks.join("\n\n")
}

/// Render collected rows as a GFM pipe table. First row is the header.
fn render_table(rows: &[Vec<String>]) -> Option<String> {
    let first = rows.first()?;
    if first.is_empty() {
        return None;
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!("| {} |", first.join(" | ")));
    lines.push(format!("|{}|", " --- |".repeat(first.len())));
    for row in &rows[1..] {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    Some(lines.join("\n"))
}

static RE_DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"data:image/[A-Za-z0-9.+-]+;base64,([A-Za-z0-9+/=]+)").unwrap()
});

/// Base64 payloads of embedded images, in discovery order.
///
/// Returns the raw base64 strings; decoding happens at the call site so a
/// malformed payload can be skipped per-image instead of aborting the scan.
pub fn embedded_image_payloads(richtext: &str) -> Vec<String> {
    RE_DATA_URI
        .captures_iter(richtext)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let md = richtext_to_markdown("<h1>Title</h1><p>Some text.</p>", true);
        assert_eq!(md, "# Title\n\nSome text.");
    }

    #[test]
    fn heading_levels() {
        let md = richtext_to_markdown("<h3>Deep</h3>", true);
        assert_eq!(md, "### Deep");
    }

    #[test]
    fn emphasis_markers() {
        let md = richtext_to_markdown(
            "<p><strong>bold</strong> and <em>italic</em></p>",
            true,
        );
        assert_eq!(md, "**bold** and *italic*");
    }

    #[test]
    fn whitespace_between_inline_elements_survives() {
        let md = richtext_to_markdown(
            "<p><strong>first</strong> <strong>second</strong></p>",
            true,
        );
        assert_eq!(md, "**first** **second**");
    }

    #[test]
    fn whitespace_between_blocks_is_dropped() {
        let md = richtext_to_markdown("<p>one</p>\n  <p>two</p>", true);
        assert_eq!(md, "one\n\ntwo");
    }

    #[test]
    fn list_items_share_a_block() {
        let md = richtext_to_markdown("<li>one</li><li>two</li><p>after</p>", true);
        assert_eq!(md, "- one\n- two\n\nafter");
    }

    #[test]
    fn tables_render_as_gfm() {
        let md = richtext_to_markdown(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>1</td><td>2</td></tr></table>",
            true,
        );
        assert_eq!(md, "| a | b |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn images_are_stripped_by_default() {
        let md = richtext_to_markdown(
            "<p>before</p><img src=\"data:image/png;base64,aGk=\"/><p>after</p>",
            true,
        );
        assert_eq!(md, "before\n\nafter");
        assert!(!md.contains("base64"));
    }

    #[test]
    fn image_only_document_renders_empty() {
        let md = richtext_to_markdown("<p><img src=\"data:image/png;base64,aGk=\"/></p>", true);
        assert!(md.trim().is_empty());
    }

    #[test]
    fn entities_are_unescaped() {
        let md = richtext_to_markdown("<p>a &amp; b &lt; c</p>", true);
        assert_eq!(md, "a & b < c");
    }

    #[test]
    fn payload_scan_preserves_discovery_order() {
        let html = "<img src=\"data:image/png;base64,Zmlyc3Q=\"/>\
                    <img src=\"data:image/jpeg;base64,c2Vjb25k\"/>";
        let payloads = embedded_image_payloads(html);
        assert_eq!(payloads, vec!["Zmlyc3Q=".to_string(), "c2Vjb25k".to_string()]);
    }

    #[test]
    fn payload_scan_ignores_non_image_uris() {
        assert!(embedded_image_payloads("<p>no images here</p>").is_empty());
    }
}

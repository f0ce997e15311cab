//! DOCX paragraph extraction.
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml`.
//! Each `<w:p>` element becomes one line of output.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph start, end and self-closing tags. `<w:pPr>` and friends don't match.
static PARAGRAPH_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?w:p(?:\s[^>]*)?/?>").unwrap());

/// Text runs, tabs and line breaks inside a paragraph.
static RUN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>(?P<text>[^<]*)</w:t>|(?P<tab><w:tab/>)|(?P<br><w:(?:br|cr)(?:\s[^>]*)?/>)")
        .unwrap()
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").unwrap());

/// Extract paragraph text joined by newlines.
pub(super) fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    Ok(paragraphs(&xml).join("\n"))
}

/// Split document XML into paragraph strings.
fn paragraphs(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut open: Option<usize> = None;

    for tag in PARAGRAPH_TAG.find_iter(xml) {
        let tag_text = tag.as_str();
        if tag_text.starts_with("</") {
            if let Some(start) = open.take() {
                out.push(paragraph_text(&xml[start..tag.start()]));
            }
        } else if tag_text.ends_with("/>") {
            out.push(String::new());
        } else {
            open = Some(tag.end());
        }
    }
    out
}

fn paragraph_text(paragraph: &str) -> String {
    let mut text = String::new();
    for caps in RUN_TOKEN.captures_iter(paragraph) {
        if let Some(run) = caps.name("text") {
            text.push_str(&unescape_xml(run.as_str()));
        } else if caps.name("tab").is_some() {
            text.push('\t');
        } else if caps.name("br").is_some() {
            text.push('\n');
        }
    }
    text
}

/// Decode the predefined XML entities and numeric character references.
fn unescape_xml(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY
        .replace_all(raw, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .and_then(|n| n.ok())
                    .and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

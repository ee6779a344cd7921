//! DOCX text extraction
//!
//! A .docx file is a ZIP container; the body text lives in
//! `word/document.xml`. Paragraph close tags become newlines, tabs become
//! tabs, everything else inside tags is dropped.

use crate::error::{DocQuarryError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Extract text from a DOCX file
pub(crate) fn extract(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| {
        DocQuarryError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read DOCX file {:?}: {}", path, e),
        ))
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        DocQuarryError::Parse(format!("Failed to open DOCX container {:?}: {}", path, e))
    })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| {
            DocQuarryError::Parse(format!(
                "DOCX file {:?} has no word/document.xml: {}",
                path, e
            ))
        })?
        .read_to_string(&mut xml)
        .map_err(|e| {
            DocQuarryError::Parse(format!("Failed to read DOCX body from {:?}: {}", path, e))
        })?;

    let text = document_xml_to_text(&xml);

    if text.trim().is_empty() {
        return Err(DocQuarryError::Parse(format!(
            "DOCX file {:?} contains no extractable text",
            path
        )));
    }

    Ok(text)
}

/// Strip OOXML markup, keeping visible text with paragraph breaks
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    let mut tag = String::new();
    let mut in_tag = false;

    for c in xml.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag.split_whitespace().next().unwrap_or("");
                match name {
                    "/w:p" => out.push('\n'),
                    "w:tab" | "w:tab/" => out.push('\t'),
                    "w:br" | "w:br/" => out.push('\n'),
                    _ => {}
                }
            }
            _ if in_tag => tag.push(c),
            _ => out.push(c),
        }
    }

    unescape_entities(&out)
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

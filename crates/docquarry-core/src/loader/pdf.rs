//! PDF text extraction

use crate::error::{DocQuarryError, Result};
use std::fs;
use std::path::Path;

/// Extract text from a PDF file
pub(crate) fn extract(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        DocQuarryError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read PDF file {:?}: {}", path, e),
        ))
    })?;

    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        DocQuarryError::Parse(format!("Failed to extract text from PDF {:?}: {}", path, e))
    })?;

    if text.trim().is_empty() {
        return Err(DocQuarryError::Parse(format!(
            "PDF file {:?} contains no extractable text (may be image-based)",
            path
        )));
    }

    Ok(text)
}

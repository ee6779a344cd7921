//! Plain-text extraction

use crate::error::{DocQuarryError, Result};
use std::fs;
use std::path::Path;

/// Extract text from a UTF-8 text file
pub(crate) fn extract(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        DocQuarryError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read text file {:?}: {}", path, e),
        ))
    })?;

    if text.trim().is_empty() {
        return Err(DocQuarryError::Parse(format!(
            "Text file {:?} is empty",
            path
        )));
    }

    Ok(text)
}

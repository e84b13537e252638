//! PDF text extraction.

use crate::error::{LeseError, Result};

/// Extract text from a PDF, page by page.
///
/// Pages are joined with a blank line in page order. A page without any
/// extractable text contributes an empty segment rather than an error.
pub(crate) fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| LeseError::CorruptDocument(format!("pdf: {}", e)))?;
    Ok(pages.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_is_corrupt() {
        let err = extract_pdf(b"not a pdf").unwrap_err();
        assert!(matches!(err, LeseError::CorruptDocument(_)));
    }
}

//! Document text extraction.
//!
//! Converts raw uploaded bytes plus a declared extension into plain UTF-8
//! text. Extraction is a pure function of the input; all parsing happens
//! in memory.

mod csv;
mod docx;
mod pdf;

use crate::error::Result;

/// Document format, derived from the declared file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain-text formats decoded as UTF-8 (txt, md, py, js, json).
    Text,
    /// PDF documents.
    Pdf,
    /// Word documents (doc, docx).
    Word,
    /// Comma-separated values.
    Csv,
    /// Anything else; decoded as UTF-8 on a best-effort basis.
    Other,
}

impl FileKind {
    /// Classify a file extension (without the leading dot).
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "txt" | "md" | "py" | "js" | "json" => FileKind::Text,
            "pdf" => FileKind::Pdf,
            "doc" | "docx" => FileKind::Word,
            "csv" => FileKind::Csv,
            _ => FileKind::Other,
        }
    }
}

/// Extract plain text from document bytes.
///
/// Unknown extensions fall back to lossy UTF-8 decoding and never fail.
/// Declared formats that cannot be parsed fail with `CorruptDocument`;
/// formats nothing here can parse fail with `UnsupportedFormat`.
pub fn extract_text(bytes: &[u8], extension: &str) -> Result<String> {
    match FileKind::from_extension(extension) {
        FileKind::Text | FileKind::Other => Ok(decode_lossy(bytes)),
        FileKind::Pdf => pdf::extract_pdf(bytes),
        FileKind::Word => docx::extract_docx(bytes),
        FileKind::Csv => Ok(csv::extract_csv(bytes)),
    }
}

/// Decode bytes as UTF-8, substituting invalid sequences.
fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_classification() {
        assert_eq!(FileKind::from_extension("txt"), FileKind::Text);
        assert_eq!(FileKind::from_extension("MD"), FileKind::Text);
        assert_eq!(FileKind::from_extension("pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_extension("docx"), FileKind::Word);
        assert_eq!(FileKind::from_extension("doc"), FileKind::Word);
        assert_eq!(FileKind::from_extension("csv"), FileKind::Csv);
        assert_eq!(FileKind::from_extension("xyz"), FileKind::Other);
        assert_eq!(FileKind::from_extension(""), FileKind::Other);
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text(b"hello world", "txt").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_invalid_utf8_is_substituted() {
        // 0xFF is never valid UTF-8
        let text = extract_text(&[b'o', b'k', 0xFF, b'!'], "txt").unwrap();
        assert_eq!(text, "ok\u{FFFD}!");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_lossy_decode() {
        let text = extract_text(b"some bytes", "bin").unwrap();
        assert_eq!(text, "some bytes");
    }
}

//! Word document text extraction.
//!
//! A docx file is a ZIP archive; the body text lives in `word/document.xml`
//! as `<w:t>` runs grouped into `<w:p>` paragraphs.

use crate::error::{LeseError, Result};
use quick_xml::events::Event;
use std::io::Read;

/// Magic bytes of an OLE2 compound file (legacy binary .doc).
const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Maximum decompressed bytes to read from the document XML entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract text from a Word document.
///
/// Paragraphs are joined with a blank line in document order; empty
/// paragraphs contribute empty segments.
pub(crate) fn extract_docx(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&OLE2_MAGIC) {
        return Err(LeseError::UnsupportedFormat(
            "legacy binary .doc is not supported; convert to .docx".to_string(),
        ));
    }

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| LeseError::CorruptDocument(format!("docx: {}", e)))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| LeseError::CorruptDocument(format!("docx: word/document.xml: {}", e)))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| LeseError::CorruptDocument(format!("docx: {}", e)))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(LeseError::CorruptDocument(
            "docx: word/document.xml exceeds size limit".to_string(),
        ));
    }

    paragraphs_from_xml(&doc_xml)
}

/// Walk the document XML and collect paragraph texts.
fn paragraphs_from_xml(xml: &[u8]) -> Result<String> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Text(te)) if in_text => {
                // Word splits runs mid-word; keep run text verbatim
                current.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"p" => {
                paragraphs.push(String::new());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(LeseError::CorruptDocument(format!("docx: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n\n"))
}

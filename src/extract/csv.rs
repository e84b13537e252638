//! CSV text extraction.
//!
//! Rows are rendered as their fields joined with `", "`, rows joined with
//! newlines, in row order. Fields keep their whitespace untouched.

/// Flatten CSV bytes into readable text.
///
/// Handles quoted fields (embedded commas and newlines) and doubled-quote
/// escapes. Blank lines are skipped; a quote inside an unquoted field is
/// kept literally.
pub(crate) fn extract_csv(bytes: &[u8]) -> String {
    let content = String::from_utf8_lossy(bytes);

    let mut rows: Vec<String> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => current.push(c),
            }
            continue;
        }

        match c {
            // Quotes only open a quoted section at the start of a field
            '"' if current.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut current));
                flush_row(&mut rows, &mut fields);
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        flush_row(&mut rows, &mut fields);
    }

    rows.join("\n")
}

fn flush_row(rows: &mut Vec<String>, fields: &mut Vec<String>) {
    // A lone empty field is a blank line, not a row
    if fields.len() == 1 && fields[0].is_empty() {
        fields.clear();
        return;
    }
    rows.push(fields.join(", "));
    fields.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_joined_with_comma_space() {
        let text = extract_csv(b"a,b\nc");
        assert_eq!(text, "a, b\nc");
    }

    #[test]
    fn test_quoted_field_keeps_embedded_comma() {
        let text = extract_csv(b"\"a,b\",c\n");
        assert_eq!(text, "a,b, c");
    }

    #[test]
    fn test_doubled_quotes_unescape() {
        let text = extract_csv(b"\"say \"\"hi\"\"\",x");
        assert_eq!(text, "say \"hi\", x");
    }

    #[test]
    fn test_quoted_field_keeps_embedded_newline() {
        let text = extract_csv(b"\"line1\nline2\",x\ny");
        assert_eq!(text, "line1\nline2, x\ny");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = extract_csv(b"a\n\n\nb\n");
        assert_eq!(text, "a\nb");
    }

    #[test]
    fn test_crlf_rows() {
        let text = extract_csv(b"a,b\r\nc,d\r\n");
        assert_eq!(text, "a, b\nc, d");
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let text = extract_csv(b"a , b\n");
        assert_eq!(text, "a ,  b");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_csv(b""), "");
    }
}

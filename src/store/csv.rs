//! Minimal CSV quoting and parsing for the history file.
//!
//! Fields containing the delimiter, quotes, or line breaks are quoted with
//! embedded quotes doubled, per the usual tabular-text conventions.

/// Quote a single field if it needs quoting.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Serialize one row, terminated with a newline.
pub(crate) fn write_row(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Parse an entire CSV document into rows of fields.
///
/// Handles quoted fields with embedded delimiters, doubled quotes, and line
/// breaks. Accepts both `\n` and `\r\n` row endings.
pub(crate) fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => row.push(std::mem::take(&mut field)),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }
    }

    // Last row may be missing its terminator
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape_field("hello"), "hello");
        assert_eq!(write_row(&["a", "b", "c"]), "a,b,c\n");
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn rows_roundtrip() {
        let fields = [
            "2026-08-06 10:00:00",
            "a, \"quoted\" excerpt",
            "multi\nline summary",
            "Positive",
        ];
        let line = write_row(&fields);
        let rows = parse(&line);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], fields);
    }

    #[test]
    fn parse_handles_crlf_rows() {
        let rows = parse("a,b\r\nc,d\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn parse_handles_missing_final_newline() {
        let rows = parse("a,b\nc,d");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn parse_of_empty_input_is_empty() {
        assert!(parse("").is_empty());
    }
}

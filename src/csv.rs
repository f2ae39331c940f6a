//! Delimited-text parsing.
//!
//! Reads the CSV that spreadsheet "publish to web" exports produce: quoted
//! fields, doubled quotes, newlines inside quotes, CRLF line endings and an
//! optional UTF-8 byte-order mark. The parser is lenient; malformed quoting
//! never fails, it just yields whatever fields it can.

use crate::models::RawTable;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Splits `text` into records of raw field values.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE => {
                in_quotes = true;
                row_started = true;
            }
            DELIMITER => {
                record.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                row_started = false;
            }
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }

    if row_started {
        record.push(field);
        records.push(record);
    }

    records
}

/// Parses `text` into a [`RawTable`]. The first non-blank record is the
/// header row; everything after it is data.
pub fn parse_table(text: &str) -> RawTable {
    let mut records = parse_records(text).into_iter();

    let headers: Vec<String> = loop {
        match records.next() {
            Some(record) if record.iter().all(|f| f.trim().is_empty()) => continue,
            Some(record) => break record.into_iter().map(|h| h.trim().to_string()).collect(),
            None => return RawTable::default(),
        }
    };

    RawTable::from_rows(headers, records.collect())
}

/// Heuristic for endpoints that answer a CSV request with an HTML page
/// (sign-in walls, error pages).
pub fn looks_like_html(text: &str) -> bool {
    let head: String = text
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(64)
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.starts_with("<head")
}

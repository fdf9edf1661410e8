use super::{ParseOutput, RawMarkerEntry};
use crate::error::{ParseError, Warning};
use crate::timecode::looks_like_timecode;

/// Header names that can hold the marker time, in preference order
const TIMECODE_HEADERS: &[&str] = &[
    "in",
    "timecode",
    "start",
    "start time",
    "marker in",
    "record in",
    "source in",
    "time",
];

/// Header names that can hold the marker name, in preference order
const LABEL_HEADERS: &[&str] = &["marker name", "name", "label", "title", "chapter"];

/// Used for the label when the name cell is blank
const FALLBACK_LABEL_HEADERS: &[&str] = &["comment", "comments", "description", "notes"];

const OTHER_HEADERS: &[&str] = &["out", "duration", "marker type", "color", "colour"];

fn normalize_header(field: &str) -> String {
    field.trim().to_ascii_lowercase()
}

pub(crate) fn is_known_header(field: &str) -> bool {
    let header = normalize_header(field);
    [TIMECODE_HEADERS, LABEL_HEADERS, FALLBACK_LABEL_HEADERS, OTHER_HEADERS]
        .iter()
        .any(|names| names.contains(&header.as_str()))
}

pub(crate) fn is_timecode_header(field: &str) -> bool {
    TIMECODE_HEADERS.contains(&normalize_header(field).as_str())
}

/// Tab wins over comma, comma over semicolon.
pub(crate) fn sniff_delimiter(line: &str) -> Option<char> {
    ['\t', ',', ';'].into_iter().find(|d| line.contains(*d))
}

/// Split one record, honouring double quotes and `""` escapes.
pub(crate) fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
}

/// Parse a marker CSV (or TSV) export with a header row.
///
/// Columns are found by header name, so their order does not matter. Rows
/// with a missing or malformed timecode are skipped with a warning.
pub fn parse_marker_csv(text: &str) -> Result<ParseOutput, ParseError> {
    let mut output = ParseOutput::default();
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| ParseError::structural("missing CSV header row"))?;
    let delimiter = sniff_delimiter(header_line)
        .ok_or_else(|| ParseError::structural("CSV header row has no delimiter"))?;

    let headers: Vec<String> = split_record(header_line, delimiter)
        .iter()
        .map(|h| normalize_header(h))
        .collect();

    let timecode_col = find_column(&headers, TIMECODE_HEADERS).ok_or_else(|| {
        ParseError::structural(format!(
            "CSV header has no timecode column (expected one of: {})",
            TIMECODE_HEADERS.join(", ")
        ))
    })?;
    let label_col = find_column(&headers, LABEL_HEADERS);
    let fallback_col = find_column(&headers, FALLBACK_LABEL_HEADERS);

    for (line_no, line) in lines {
        let fields = split_record(line, delimiter);

        let Some(timecode) = fields.get(timecode_col).filter(|tc| !tc.is_empty()) else {
            output.warnings.push(Warning::at_line(line_no, "row has no timecode value"));
            continue;
        };
        if !looks_like_timecode(timecode) {
            output.warnings.push(Warning::at_line(
                line_no,
                format!("malformed timecode '{}'", timecode),
            ));
            continue;
        }

        let cell = |col: Option<usize>| {
            col.and_then(|c| fields.get(c))
                .map(|s| s.as_str())
                .filter(|s| !s.is_empty())
        };
        let label = cell(label_col).or_else(|| cell(fallback_col)).unwrap_or("");

        output
            .entries
            .push(RawMarkerEntry::new(timecode.as_str(), label, line_no));
    }

    Ok(output)
}

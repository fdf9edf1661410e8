use std::sync::OnceLock;

use regex::Regex;

use super::{ParseOutput, RawMarkerEntry};
use crate::error::{ParseError, Warning};
use crate::format_detector::is_comment;
use crate::timecode::looks_like_timecode;

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-–—|]\s+").expect("separator regex"))
}

/// Drop a leading "- " style separator between timecode and label
fn clean_label(label: &str) -> String {
    separator_regex().replace(label.trim(), "").trim().to_string()
}

/// Parse plain `timecode label` lines.
///
/// Timecodes may be frame based (`00:01:02:03`) or decimal (`00:01:02.500`,
/// `1:02`). Blank lines and `#` / `//` comments are ignored.
pub fn parse_marker_text(text: &str) -> Result<ParseOutput, ParseError> {
    let mut output = ParseOutput::default();
    let mut content_lines = 0usize;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() || is_comment(line) {
            continue;
        }
        content_lines += 1;

        let (timecode, label) = match line.split_once(char::is_whitespace) {
            Some((timecode, rest)) => (timecode, rest),
            None => (line, ""),
        };

        if !looks_like_timecode(timecode) {
            output.warnings.push(Warning::at_line(
                line_no,
                format!("line does not start with a timecode: '{}'", line),
            ));
            continue;
        }

        output
            .entries
            .push(RawMarkerEntry::new(timecode, clean_label(label), line_no));
    }

    if content_lines == 0 {
        return Err(ParseError::structural("no marker lines found"));
    }

    Ok(output)
}

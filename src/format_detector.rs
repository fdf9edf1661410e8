use std::fmt;

use crate::error::ParseError;
use crate::marker_parser::csv;
use crate::timecode::looks_like_timecode;

/// Marker export formats understood by the parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    DaVinciResolveEdl,
    PremiereEdl,
    PremiereMarkerText,
    PremiereMarkerCsv,
}

impl FormatKind {
    pub const ALL: [FormatKind; 4] = [
        FormatKind::DaVinciResolveEdl,
        FormatKind::PremiereEdl,
        FormatKind::PremiereMarkerCsv,
        FormatKind::PremiereMarkerText,
    ];

    /// EDL timecodes are always frame based; the other formats may mix.
    pub fn is_edl(self) -> bool {
        matches!(self, FormatKind::DaVinciResolveEdl | FormatKind::PremiereEdl)
    }

    pub fn description(self) -> &'static str {
        match self {
            FormatKind::DaVinciResolveEdl => {
                "DaVinci Resolve timeline markers EDL (event + |C: |M: |D: lines)"
            }
            FormatKind::PremiereEdl => "Premiere Pro EDL (* FROM CLIP NAME comments or * LOC locators)",
            FormatKind::PremiereMarkerText => "Plain marker text (one 'timecode label' per line)",
            FormatKind::PremiereMarkerCsv => {
                "Marker CSV/TSV with a header row (Marker Name, In, ...)"
            }
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::DaVinciResolveEdl => "DaVinci Resolve EDL",
            FormatKind::PremiereEdl => "Premiere EDL",
            FormatKind::PremiereMarkerText => "Premiere marker text",
            FormatKind::PremiereMarkerCsv => "Premiere marker CSV",
        };
        f.write_str(name)
    }
}

/// Strip a byte-order mark left over from the export
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

fn has_edl_header(text: &str) -> bool {
    text.lines().map(str::trim).any(|line| {
        line.starts_with("TITLE:") || line.starts_with("FCM:")
    })
}

fn has_resolve_marker_lines(text: &str) -> bool {
    text.lines().any(|line| line.contains("|M:"))
}

fn has_clip_name_comments(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .any(|line| line.starts_with("* FROM CLIP NAME:"))
}

fn has_locator_comments(text: &str) -> bool {
    text.lines().map(str::trim).any(|line| line.starts_with("* LOC:"))
}

fn has_marker_csv_header(text: &str) -> bool {
    let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return false;
    };
    let Some(delimiter) = csv::sniff_delimiter(first) else {
        return false;
    };
    let fields = csv::split_record(first, delimiter);
    if fields.len() < 2 || fields.iter().any(|f| looks_like_timecode(f)) {
        return false;
    }
    // A header row without a time column is still a header row; the parser reports it
    fields.iter().any(|f| csv::is_timecode_header(f))
        || fields.iter().all(|f| csv::is_known_header(f))
}

fn has_marker_text_lines(text: &str) -> bool {
    let mut content_lines = 0usize;
    let mut timecode_lines = 0usize;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || is_comment(line) {
            continue;
        }
        content_lines += 1;
        let first_token = line.split_whitespace().next().unwrap_or("");
        if looks_like_timecode(first_token) {
            timecode_lines += 1;
        }
    }

    timecode_lines > 0 && timecode_lines * 2 >= content_lines
}

/// Identify the export format from structural signatures in the text.
///
/// Checks run in priority order and the first match wins. Input that matches
/// none of them is rejected instead of guessed.
pub fn detect_format(text: &str) -> Result<FormatKind, ParseError> {
    let text = strip_bom(text);
    if text.trim().is_empty() {
        return Err(ParseError::structural("input is empty"));
    }

    if has_edl_header(text) {
        if has_resolve_marker_lines(text) {
            return Ok(FormatKind::DaVinciResolveEdl);
        }
        if has_clip_name_comments(text) || has_locator_comments(text) {
            return Ok(FormatKind::PremiereEdl);
        }
    }

    if has_marker_csv_header(text) {
        return Ok(FormatKind::PremiereMarkerCsv);
    }

    if has_marker_text_lines(text) {
        return Ok(FormatKind::PremiereMarkerText);
    }

    Err(ParseError::UnrecognizedFormat)
}

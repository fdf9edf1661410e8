//! Marker extraction, one parser per [`FormatKind`].
//!
//! Parsers only pull `(timecode text, label)` pairs out of the export; the
//! timecode values are checked later by the normalizer, which knows the
//! frame rate. A bad record never fails the whole parse: it is skipped and
//! reported as a [`Warning`].

pub mod csv;
pub mod edl;
pub mod text;

use crate::error::{ParseError, Warning};
use crate::format_detector::{strip_bom, FormatKind};

/// One marker as found in the source text, before any time arithmetic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMarkerEntry {
    pub timecode_text: String,
    pub label: String,
    /// 1-based line the marker came from
    pub source_line: usize,
}

impl RawMarkerEntry {
    pub fn new(timecode_text: impl Into<String>, label: impl Into<String>, source_line: usize) -> Self {
        Self {
            timecode_text: timecode_text.into(),
            label: label.into(),
            source_line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub entries: Vec<RawMarkerEntry>,
    pub warnings: Vec<Warning>,
    /// `TITLE:` header of an EDL
    pub title: Option<String>,
    /// `FCM:` header of an EDL, `Some(true)` for drop frame
    pub drop_frame: Option<bool>,
}

/// Run the parser for `kind` over `text`.
pub fn parse_markers(kind: FormatKind, text: &str) -> Result<ParseOutput, ParseError> {
    let text = strip_bom(text);
    if text.trim().is_empty() {
        return Err(ParseError::structural("input is empty"));
    }

    match kind {
        FormatKind::DaVinciResolveEdl => edl::parse_resolve_edl(text),
        FormatKind::PremiereEdl => edl::parse_premiere_edl(text),
        FormatKind::PremiereMarkerText => text::parse_marker_text(text),
        FormatKind::PremiereMarkerCsv => csv::parse_marker_csv(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_structural_failure() {
        for kind in FormatKind::ALL {
            let err = parse_markers(kind, " \n\t\n").unwrap_err();
            assert!(matches!(err, ParseError::EmptyOrStructurallyInvalid { .. }));
        }
    }

    #[test]
    fn test_dispatch_by_kind() {
        let output = parse_markers(FormatKind::PremiereMarkerText, "00:00:01 One\n00:00:02 Two\n")
            .unwrap();
        assert_eq!(output.entries.len(), 2);
        assert_eq!(output.entries[1], RawMarkerEntry::new("00:00:02", "Two", 2));
    }
}

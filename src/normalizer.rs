use tracing::debug;

use crate::chapter_list::ChapterList;
use crate::error::{NormalizationError, Warning};
use crate::format_detector::FormatKind;
use crate::marker_parser::RawMarkerEntry;
use crate::timecode::{parse_any, parse_frame_timecode, FrameRate, Timecode};

/// Result of turning raw markers into a chapter list
#[derive(Debug, Clone)]
pub struct Normalized {
    pub chapters: ChapterList,
    pub warnings: Vec<Warning>,
    /// Time of the earliest marker, subtracted from every chapter
    pub origin_offset: Timecode,
}

struct Resolved {
    start: Timecode,
    label: String,
    source_line: usize,
}

fn resolve(
    entry: RawMarkerEntry,
    kind: FormatKind,
    rate: FrameRate,
) -> Result<Resolved, Warning> {
    let parsed = if kind.is_edl() {
        parse_frame_timecode(&entry.timecode_text, rate)
    } else {
        parse_any(&entry.timecode_text, rate)
    };

    match parsed {
        Ok(start) => Ok(Resolved {
            start,
            label: entry.label,
            source_line: entry.source_line,
        }),
        Err(err) => Err(Warning::at_line(entry.source_line, err.to_string())),
    }
}

/// Convert raw markers into a canonical chapter list.
///
/// Unreadable timecodes are dropped with a warning. The survivors are sorted
/// (ties keep source order), shifted so the earliest starts at zero, and
/// deduplicated on exact start time with the first marker winning.
pub fn normalize(
    entries: Vec<RawMarkerEntry>,
    kind: FormatKind,
    rate: FrameRate,
) -> Result<Normalized, NormalizationError> {
    let mut warnings = Vec::new();
    let mut resolved: Vec<Resolved> = Vec::with_capacity(entries.len());

    for entry in entries {
        match resolve(entry, kind, rate) {
            Ok(marker) => resolved.push(marker),
            Err(warning) => warnings.push(warning),
        }
    }

    resolved.sort_by_key(|marker| marker.start);

    let origin_offset = resolved
        .first()
        .map(|marker| marker.start)
        .ok_or(NormalizationError::NoValidChapters)?;
    let shift = -(origin_offset.as_millis() as i64);

    let mut kept: Vec<Resolved> = Vec::with_capacity(resolved.len());
    for mut marker in resolved {
        marker.start = marker.start.shift(shift);
        match kept.last() {
            Some(previous) if previous.start == marker.start => {
                warnings.push(Warning::at_line(
                    marker.source_line,
                    format!(
                        "duplicate marker at {} dropped ('{}' from line {} kept)",
                        marker.start, previous.label, previous.source_line
                    ),
                ));
            }
            _ => kept.push(marker),
        }
    }

    debug!(
        markers = kept.len(),
        offset_ms = origin_offset.as_millis(),
        "resolved markers"
    );

    let chapters = ChapterList::from_entries(kept.into_iter().map(|m| (m.start, m.label)));

    Ok(Normalized {
        chapters,
        warnings,
        origin_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tc: &str, label: &str, line: usize) -> RawMarkerEntry {
        RawMarkerEntry::new(tc, label, line)
    }

    fn starts(normalized: &Normalized) -> Vec<u64> {
        normalized.chapters.iter().map(|c| c.start.as_millis()).collect()
    }

    #[test]
    fn test_time_origin_correction() {
        let entries = vec![
            entry("00:00:07", "Middle", 1),
            entry("00:00:02", "First", 2),
            entry("00:00:15", "Last", 3),
        ];
        let normalized =
            normalize(entries, FormatKind::PremiereMarkerText, FrameRate::DEFAULT).unwrap();
        assert_eq!(starts(&normalized), vec![0, 5_000, 13_000]);
        assert_eq!(normalized.origin_offset, Timecode::from_millis(2_000));
        assert_eq!(normalized.chapters.as_slice()[0].label, "First");
    }

    #[test]
    fn test_duplicates_keep_first_in_sort_order() {
        let entries = vec![
            entry("00:00:00", "Start", 1),
            entry("00:00:03", "Kept", 2),
            entry("00:00:03.000", "Dropped", 3),
        ];
        let normalized =
            normalize(entries, FormatKind::PremiereMarkerCsv, FrameRate::DEFAULT).unwrap();
        assert_eq!(starts(&normalized), vec![0, 3_000]);
        assert_eq!(normalized.chapters.as_slice()[1].label, "Kept");
        assert_eq!(normalized.warnings.len(), 1);
        assert_eq!(normalized.warnings[0].line, Some(3));
    }

    #[test]
    fn test_bad_timecodes_dropped_with_warning() {
        let entries = vec![
            entry("01:00:00:00", "Intro", 4),
            entry("01:00:10:45", "Bad frame", 7),
            entry("01:00:20:15", "", 10),
        ];
        let normalized =
            normalize(entries, FormatKind::DaVinciResolveEdl, FrameRate::DEFAULT).unwrap();
        assert_eq!(starts(&normalized), vec![0, 20_500]);
        assert_eq!(normalized.chapters.as_slice()[1].label, "Chapter 2");
        assert_eq!(normalized.warnings.len(), 1);
        assert_eq!(normalized.warnings[0].line, Some(7));
    }

    #[test]
    fn test_edl_rejects_decimal_timecodes() {
        let entries = vec![entry("00:00:01.500", "Decimal", 1)];
        let err = normalize(entries, FormatKind::PremiereEdl, FrameRate::DEFAULT).unwrap_err();
        assert_eq!(err, NormalizationError::NoValidChapters);
    }

    #[test]
    fn test_empty_input_has_no_chapters() {
        assert_eq!(
            normalize(Vec::new(), FormatKind::PremiereMarkerText, FrameRate::DEFAULT).unwrap_err(),
            NormalizationError::NoValidChapters
        );
    }
}

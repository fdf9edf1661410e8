use std::sync::OnceLock;

use regex::Regex;

use super::{ParseOutput, RawMarkerEntry};
use crate::error::{ParseError, Warning};
use crate::timecode::is_frame_timecode;

/// One `NNN REEL TRACK TRANS SRC_IN SRC_OUT REC_IN REC_OUT` line
#[derive(Debug, Clone)]
struct EdlEvent {
    line: usize,
    reel: String,
    track: String,
    record_in: String,
}

/// A Premiere event collects its comment lines until the next event starts
#[derive(Debug)]
struct PendingClip {
    event: EdlEvent,
    clip_name: Option<String>,
    comment: Option<String>,
}

fn loc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\s*LOC:\s*(\S+)(?:\s+(\S+))?\s*(.*)$").expect("LOC regex"))
}

enum EventLine {
    Event(EdlEvent),
    Malformed(String),
    NotAnEvent,
}

fn parse_event_line(line: &str, line_no: usize) -> EventLine {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return EventLine::NotAnEvent;
    };
    if !first.chars().all(|c| c.is_ascii_digit()) {
        return EventLine::NotAnEvent;
    }

    if tokens.len() < 8 {
        return EventLine::Malformed(format!(
            "event {} has {} fields, expected at least 8",
            first,
            tokens.len()
        ));
    }

    let timecodes = &tokens[tokens.len() - 4..];
    if let Some(bad) = timecodes.iter().find(|tc| !is_frame_timecode(tc)) {
        return EventLine::Malformed(format!("event {} has malformed timecode '{}'", first, bad));
    }

    EventLine::Event(EdlEvent {
        line: line_no,
        reel: tokens[1].to_string(),
        track: tokens[2].to_string(),
        record_in: timecodes[2].to_string(),
    })
}

/// Read `TITLE:` / `FCM:`; returns true when the line was a header.
fn read_header(line: &str, output: &mut ParseOutput) -> bool {
    if let Some(rest) = line.strip_prefix("TITLE:") {
        let title = rest.trim();
        if !title.is_empty() {
            output.title = Some(title.to_string());
        }
        return true;
    }
    if let Some(rest) = line.strip_prefix("FCM:") {
        let mode = rest.trim().to_ascii_uppercase();
        output.drop_frame = Some(mode.starts_with("DROP"));
        return true;
    }
    false
}

fn check_structure(output: &ParseOutput, saw_header: bool, saw_event: bool) -> Result<(), ParseError> {
    if !saw_header && !saw_event && output.entries.is_empty() {
        return Err(ParseError::structural("no EDL header or event lines found"));
    }
    Ok(())
}

/// Pull the marker name out of ` |C:ResolveColorBlue |M:Intro |D:1`
fn resolve_marker_name(line: &str) -> Option<String> {
    let start = line.find("|M:")? + 3;
    let rest = &line[start..];
    let end = rest.find(" |D:").or_else(|| rest.find("|D:")).unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

/// Parse a DaVinci Resolve "Timeline Markers to EDL" export.
///
/// Each marker is an event line followed by a `|C: |M: |D:` metadata line.
/// Events with no metadata are plain edits and are ignored.
pub fn parse_resolve_edl(text: &str) -> Result<ParseOutput, ParseError> {
    let mut output = ParseOutput::default();
    let mut pending: Option<EdlEvent> = None;
    let mut saw_header = false;
    let mut saw_event = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }
        if read_header(line, &mut output) {
            saw_header = true;
            continue;
        }

        if line.contains("|M:") {
            match (pending.take(), resolve_marker_name(line)) {
                (Some(event), Some(name)) => {
                    output
                        .entries
                        .push(RawMarkerEntry::new(event.record_in, name, event.line));
                }
                _ => output.warnings.push(Warning::at_line(
                    line_no,
                    "marker metadata without a preceding event line",
                )),
            }
            continue;
        }

        match parse_event_line(line, line_no) {
            EventLine::Event(event) => {
                saw_event = true;
                pending = Some(event);
            }
            EventLine::Malformed(reason) => {
                saw_event = true;
                pending = None;
                output.warnings.push(Warning::at_line(line_no, reason));
            }
            EventLine::NotAnEvent => {}
        }
    }

    check_structure(&output, saw_header, saw_event)?;
    Ok(output)
}

fn is_marker_track(track: &str) -> bool {
    let track = track.to_ascii_uppercase();
    track.starts_with('V') || track == "B"
}

fn flush_clip(pending: Option<PendingClip>, output: &mut ParseOutput) {
    let Some(clip) = pending else {
        return;
    };
    if !is_marker_track(&clip.event.track) || clip.event.reel.eq_ignore_ascii_case("BL") {
        return;
    }
    let Some(clip_name) = clip.clip_name else {
        return;
    };
    let label = clip.comment.filter(|c| !c.is_empty()).unwrap_or(clip_name);
    output
        .entries
        .push(RawMarkerEntry::new(clip.event.record_in, label, clip.event.line));
}

/// Parse a Premiere Pro EDL.
///
/// Video events carrying `* FROM CLIP NAME:` become markers at their record-in
/// time, labelled by `* COMMENT:` when present. `* LOC:` locators are markers
/// of their own. Audio and black events are ignored.
pub fn parse_premiere_edl(text: &str) -> Result<ParseOutput, ParseError> {
    let mut output = ParseOutput::default();
    let mut pending: Option<PendingClip> = None;
    let mut saw_header = false;
    let mut saw_event = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }
        if read_header(line, &mut output) {
            saw_header = true;
            continue;
        }

        if line.starts_with('*') {
            if let Some(rest) = line.strip_prefix("* FROM CLIP NAME:") {
                match pending.as_mut() {
                    Some(clip) => clip.clip_name = Some(rest.trim().to_string()),
                    None => output.warnings.push(Warning::at_line(
                        line_no,
                        "clip name comment without a preceding event line",
                    )),
                }
            } else if let Some(rest) = line.strip_prefix("* COMMENT:") {
                if let Some(clip) = pending.as_mut() {
                    clip.comment = Some(rest.trim().to_string());
                }
            } else if let Some(caps) = loc_regex().captures(line) {
                let timecode = &caps[1];
                if is_frame_timecode(timecode) {
                    let label = caps.get(3).map_or("", |m| m.as_str()).trim();
                    output
                        .entries
                        .push(RawMarkerEntry::new(timecode, label, line_no));
                } else {
                    output.warnings.push(Warning::at_line(
                        line_no,
                        format!("locator has malformed timecode '{}'", timecode),
                    ));
                }
            }
            continue;
        }

        match parse_event_line(line, line_no) {
            EventLine::Event(event) => {
                saw_event = true;
                flush_clip(pending.take(), &mut output);
                pending = Some(PendingClip {
                    event,
                    clip_name: None,
                    comment: None,
                });
            }
            EventLine::Malformed(reason) => {
                saw_event = true;
                flush_clip(pending.take(), &mut output);
                output.warnings.push(Warning::at_line(line_no, reason));
            }
            EventLine::NotAnEvent => {}
        }
    }
    flush_clip(pending.take(), &mut output);

    output.entries.sort_by_key(|entry| entry.source_line);
    check_structure(&output, saw_header, saw_event)?;
    Ok(output)
}

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ChapterizeError, ParseError};

/// Common video framerates, for display in the CLI
pub const COMMON_FRAMERATES: &[f64] = &[23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0];

fn frame_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,3}):(\d{2}):(\d{2})([:;])(\d{1,3})$").expect("frame timecode regex")
    })
}

fn decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d{1,3}):)?(\d{1,3}):(\d{2})(?:[.,](\d{1,3}))?$")
            .expect("decimal timecode regex")
    })
}

/// A position on the timeline, stored in whole milliseconds from the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timecode(u64);

impl Timecode {
    pub const ZERO: Timecode = Timecode(0);

    pub const fn from_millis(ms: u64) -> Self {
        Timecode(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Timecode(secs * 1000)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Move by `offset_ms`, clamping at zero instead of going negative.
    pub fn shift(self, offset_ms: i64) -> Self {
        if offset_ms >= 0 {
            Timecode(self.0.saturating_add(offset_ms.unsigned_abs()))
        } else {
            Timecode(self.0.saturating_sub(offset_ms.unsigned_abs()))
        }
    }

    /// Format as `HH:MM:SS`, dropping the sub-second remainder.
    pub fn to_display_string(self) -> String {
        let total_secs = self.0 / 1000;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }

    /// Format as non-drop `HH:MM:SS:FF` at the given rate.
    pub fn to_frame_string(self, rate: FrameRate) -> String {
        let total_secs = self.0 / 1000;
        let frames = ((self.0 % 1000) as f64 * rate.fps() / 1000.0).floor() as u64;
        format!(
            "{:02}:{:02}:{:02}:{:02}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60,
            frames
        )
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.to_display_string(), self.0 % 1000)
    }
}

/// Frames per second used to read `HH:MM:SS:FF` timecodes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Used when neither the caller nor the input declares a rate.
    pub const DEFAULT: FrameRate = FrameRate(30.0);
    pub const NTSC: FrameRate = FrameRate(29.97);

    pub fn new(fps: f64) -> Result<Self, ChapterizeError> {
        if fps.is_finite() && fps > 0.0 {
            Ok(FrameRate(fps))
        } else {
            Err(ChapterizeError::InvalidFrameRate(fps))
        }
    }

    pub fn fps(self) -> f64 {
        self.0
    }

    /// Nominal rate for the NTSC rates that have a drop-frame count (29.97, 59.94).
    pub fn drop_frame_nominal(self) -> Option<u64> {
        if (self.0 - 29.97).abs() < 0.01 {
            Some(30)
        } else if (self.0 - 59.94).abs() < 0.01 {
            Some(60)
        } else {
            None
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.0)
    }
}

/// True for `HH:MM:SS:FF` / `HH:MM:SS;FF` shaped text (values not checked).
pub fn is_frame_timecode(text: &str) -> bool {
    frame_regex().is_match(text.trim())
}

/// True for anything `parse_any` might accept (values not checked).
pub fn looks_like_timecode(text: &str) -> bool {
    let text = text.trim();
    frame_regex().is_match(text) || decimal_regex().is_match(text)
}

fn field(caps: &regex::Captures, index: usize) -> u64 {
    // The regexes only capture ASCII digit runs of at most three characters.
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn check_clock(text: &str, minutes: u64, seconds: u64) -> Result<(), ParseError> {
    if minutes >= 60 {
        return Err(ParseError::timecode(text, format!("minutes out of range ({})", minutes)));
    }
    if seconds >= 60 {
        return Err(ParseError::timecode(text, format!("seconds out of range ({})", seconds)));
    }
    Ok(())
}

/// Parse `HH:MM:SS:FF` (or `HH:MM:SS;FF`) at the given frame rate.
///
/// A `;` separator at 29.97 or 59.94 fps is read as SMPTE drop-frame, so the
/// result is wall-clock time. At any other rate `;` reads the same as `:`.
pub fn parse_frame_timecode(text: &str, rate: FrameRate) -> Result<Timecode, ParseError> {
    let trimmed = text.trim();
    let caps = frame_regex()
        .captures(trimmed)
        .ok_or_else(|| ParseError::timecode(trimmed, "expected HH:MM:SS:FF"))?;

    let hours = field(&caps, 1);
    let minutes = field(&caps, 2);
    let seconds = field(&caps, 3);
    let drop_separator = &caps[4] == ";";
    let frames = field(&caps, 5);

    check_clock(trimmed, minutes, seconds)?;
    if frames as f64 >= rate.fps() {
        return Err(ParseError::timecode(
            trimmed,
            format!("frame {} out of range for {}", frames, rate),
        ));
    }

    let total_secs = hours * 3600 + minutes * 60 + seconds;

    if drop_separator {
        if let Some(nominal) = rate.drop_frame_nominal() {
            let dropped_per_minute = nominal / 15;
            let total_minutes = hours * 60 + minutes;
            if seconds == 0 && minutes % 10 != 0 && frames < dropped_per_minute {
                return Err(ParseError::timecode(
                    trimmed,
                    format!("frame {} does not exist in drop-frame timecode", frames),
                ));
            }
            let frame_number = total_secs * nominal + frames
                - dropped_per_minute * (total_minutes - total_minutes / 10);
            // 1001/1000 pulldown: ms = frames * 1001 / nominal, rounded.
            let ms = (frame_number * 1001 * 2 + nominal) / (2 * nominal);
            return Ok(Timecode(ms));
        }
    }

    let frame_ms = (frames as f64 * 1000.0 / rate.fps()).round() as u64;
    Ok(Timecode(total_secs * 1000 + frame_ms))
}

/// Parse `HH:MM:SS.mmm`, `HH:MM:SS`, or the short `MM:SS[.mmm]` form.
pub fn parse_decimal_timecode(text: &str) -> Result<Timecode, ParseError> {
    let trimmed = text.trim();
    let caps = decimal_regex()
        .captures(trimmed)
        .ok_or_else(|| ParseError::timecode(trimmed, "expected HH:MM:SS.mmm"))?;

    let has_hours = caps.get(1).is_some();
    let hours = field(&caps, 1);
    let minutes = field(&caps, 2);
    let seconds = field(&caps, 3);

    if has_hours {
        check_clock(trimmed, minutes, seconds)?;
    } else if seconds >= 60 {
        return Err(ParseError::timecode(trimmed, format!("seconds out of range ({})", seconds)));
    }

    let millis = match caps.get(4) {
        Some(m) => {
            let digits = m.as_str();
            let value: u64 = digits.parse().unwrap_or(0);
            value * 10u64.pow(3 - digits.len() as u32)
        }
        None => 0,
    };

    Ok(Timecode(
        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis,
    ))
}

/// Frame timecodes go through the frame parser, everything else through the decimal one.
pub fn parse_any(text: &str, rate: FrameRate) -> Result<Timecode, ParseError> {
    if is_frame_timecode(text) {
        parse_frame_timecode(text, rate)
    } else {
        parse_decimal_timecode(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fps(value: f64) -> FrameRate {
        FrameRate::new(value).unwrap()
    }

    #[test]
    fn test_frame_timecode_conversion() {
        assert_eq!(
            parse_frame_timecode("01:00:05:15", fps(30.0)).unwrap().as_millis(),
            3_605_500
        );
        assert_eq!(
            parse_frame_timecode("00:00:00:01", fps(24.0)).unwrap().as_millis(),
            42
        );
        // Non-drop ';' at a rate without drop-frame counting reads like ':'
        assert_eq!(
            parse_frame_timecode("00:00:10;12", fps(25.0)).unwrap(),
            parse_frame_timecode("00:00:10:12", fps(25.0)).unwrap()
        );
    }

    #[test]
    fn test_frame_out_of_range() {
        let err = parse_frame_timecode("00:00:01:30", fps(30.0)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTimecode { .. }));
        assert!(parse_frame_timecode("00:00:01:24", fps(23.976)).is_err());
        assert!(parse_frame_timecode("00:61:00:00", fps(30.0)).is_err());
        assert!(parse_frame_timecode("00:00:60:00", fps(30.0)).is_err());
        assert!(parse_frame_timecode("garbage", fps(30.0)).is_err());
    }

    #[test]
    fn test_drop_frame_counting() {
        // First minute boundary skips frames 0 and 1: 00:01:00;02 is frame 1800
        assert_eq!(
            parse_frame_timecode("00:01:00;02", FrameRate::NTSC).unwrap().as_millis(),
            60_060
        );
        // Tenth minutes keep every frame number
        assert!(parse_frame_timecode("00:10:00;00", FrameRate::NTSC).is_ok());
        assert!(parse_frame_timecode("00:01:00;00", FrameRate::NTSC).is_err());
        assert!(parse_frame_timecode("00:01:00;03", fps(59.94)).is_err());
    }

    #[test]
    fn test_decimal_timecode() {
        assert_eq!(parse_decimal_timecode("01:23:45.678").unwrap().as_millis(), 5_025_678);
        assert_eq!(parse_decimal_timecode("00:00:12").unwrap().as_millis(), 12_000);
        assert_eq!(parse_decimal_timecode("00:00:01.5").unwrap().as_millis(), 1_500);
        assert_eq!(parse_decimal_timecode("00:00:01,25").unwrap().as_millis(), 1_250);
        assert_eq!(parse_decimal_timecode("4:05").unwrap().as_millis(), 245_000);
        assert_eq!(parse_decimal_timecode("1:02:03").unwrap().as_millis(), 3_723_000);
        assert!(parse_decimal_timecode("00:00:61").is_err());
        assert!(parse_decimal_timecode("00:00:10:00").is_err());
    }

    #[test]
    fn test_parse_any_dispatch() {
        let rate = fps(25.0);
        assert_eq!(parse_any("00:00:02:05", rate).unwrap().as_millis(), 2_200);
        assert_eq!(parse_any("00:00:02.200", rate).unwrap().as_millis(), 2_200);
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Timecode::from_millis(5_999).to_display_string(), "00:00:05");
        assert_eq!(Timecode::from_millis(12_000).to_display_string(), "00:00:12");
        assert_eq!(Timecode::from_secs(3_723).to_display_string(), "01:02:03");
        assert_eq!(Timecode::from_secs(360_000).to_display_string(), "100:00:00");
        assert_eq!(Timecode::from_millis(1_500).to_string(), "00:00:01.500");
        assert_eq!(Timecode::from_millis(1_500).to_frame_string(fps(30.0)), "00:00:01:15");
    }

    #[test]
    fn test_shift_clamps_at_zero() {
        let tc = Timecode::from_millis(2_000);
        assert_eq!(tc.shift(-500).as_millis(), 1_500);
        assert_eq!(tc.shift(1_000).as_millis(), 3_000);
        assert_eq!(tc.shift(-5_000), Timecode::ZERO);
    }

    #[test]
    fn test_invalid_frame_rate() {
        assert!(FrameRate::new(0.0).is_err());
        assert!(FrameRate::new(f64::NAN).is_err());
        assert_eq!(FrameRate::default(), FrameRate::DEFAULT);
        assert_eq!(FrameRate::NTSC.drop_frame_nominal(), Some(30));
        assert_eq!(fps(25.0).drop_frame_nominal(), None);
    }
}

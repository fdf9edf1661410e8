//! Chapterize Core Library
//!
//! Turns marker exports from video editors (DaVinci Resolve and Premiere
//! EDLs, marker text, marker CSV) into a zero-based, strictly increasing
//! chapter list and renders it as `HH:MM:SS Label` lines for video
//! descriptions. Everything here is synchronous and performs no I/O.

pub mod chapter_list;
pub mod config;
pub mod error;
pub mod format_detector;
pub mod formatter;
pub mod marker_parser;
pub mod normalizer;
pub mod pipeline;
pub mod timecode;

// Re-export commonly used items at crate root
pub use chapter_list::{Chapter, ChapterId, ChapterList};
pub use config::PipelineConfig;
pub use error::{
    ChapterizeError, FormatError, NormalizationError, OperationError, ParseError, Result, Warning,
};
pub use format_detector::{detect_format, FormatKind};
pub use formatter::{lint, render, render_json};
pub use marker_parser::{parse_markers, ParseOutput, RawMarkerEntry};
pub use normalizer::{normalize, Normalized};
pub use pipeline::{convert, inspect, Conversion};
pub use timecode::{
    parse_decimal_timecode, parse_frame_timecode, FrameRate, Timecode, COMMON_FRAMERATES,
};

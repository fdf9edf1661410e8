use tracing::{debug, info, warn};

use crate::chapter_list::ChapterList;
use crate::config::PipelineConfig;
use crate::error::{Result, Warning};
use crate::format_detector::{detect_format, FormatKind};
use crate::marker_parser::{parse_markers, ParseOutput};
use crate::normalizer::normalize;
use crate::timecode::{FrameRate, Timecode};

/// Everything a caller needs after converting one export
#[derive(Debug, Clone)]
pub struct Conversion {
    pub format: FormatKind,
    pub title: Option<String>,
    pub frame_rate: FrameRate,
    pub chapters: ChapterList,
    pub warnings: Vec<Warning>,
    pub origin_offset: Timecode,
}

/// Detect (unless configured) and parse, without normalizing.
pub fn inspect(text: &str, config: &PipelineConfig) -> Result<(FormatKind, ParseOutput)> {
    let format = match config.format {
        Some(format) => format,
        None => detect_format(text)?,
    };
    let parsed = parse_markers(format, text)?;

    if config.debug {
        for entry in &parsed.entries {
            debug!(
                line = entry.source_line,
                timecode = %entry.timecode_text,
                label = %entry.label,
                "raw marker"
            );
        }
    }

    Ok((format, parsed))
}

/// Turn raw export text into a canonical chapter list.
pub fn convert(text: &str, config: &PipelineConfig) -> Result<Conversion> {
    let (format, parsed) = inspect(text, config)?;
    let frame_rate = config.effective_frame_rate(parsed.drop_frame);
    info!(format = %format, %frame_rate, markers = parsed.entries.len(), "parsed markers");

    let ParseOutput {
        entries,
        mut warnings,
        title,
        ..
    } = parsed;

    let normalized = normalize(entries, format, frame_rate)?;
    warnings.extend(normalized.warnings);

    for warning in &warnings {
        warn!("{}", warning);
    }
    if config.debug {
        for chapter in &normalized.chapters {
            debug!(id = %chapter.id, start = %chapter.start, label = %chapter.label, "chapter");
        }
    }
    info!(
        chapters = normalized.chapters.len(),
        warnings = warnings.len(),
        "normalized chapters"
    );

    Ok(Conversion {
        format,
        title,
        frame_rate,
        chapters: normalized.chapters,
        warnings,
        origin_offset: normalized.origin_offset,
    })
}

use serde::Serialize;

use crate::chapter_list::{Chapter, ChapterId, ChapterList};
use crate::error::{FormatError, Warning};

/// Video platforms ignore chapter lists with a chapter shorter than this
pub const MIN_CHAPTER_MS: u64 = 10_000;

/// Platforms need at least this many chapters before they show any
pub const MIN_CHAPTERS: usize = 2;

fn check_count(chapters: &ChapterList) -> Result<(), FormatError> {
    if chapters.len() < MIN_CHAPTERS {
        return Err(FormatError::TooFewChapters {
            count: chapters.len(),
        });
    }
    Ok(())
}

fn render_line(chapter: &Chapter) -> String {
    format!("{} {}", chapter.start.to_display_string(), chapter.label)
}

/// Render `HH:MM:SS Label` lines, ready to paste into a video description.
pub fn render(chapters: &ChapterList) -> Result<String, FormatError> {
    check_count(chapters)?;

    Ok(chapters
        .iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

#[derive(Serialize)]
struct ChapterView<'a> {
    id: ChapterId,
    start_ms: u64,
    timestamp: String,
    label: &'a str,
}

/// Render the list as a JSON array for tools that want structured output.
pub fn render_json(chapters: &ChapterList) -> Result<String, FormatError> {
    check_count(chapters)?;

    let views: Vec<ChapterView> = chapters
        .iter()
        .map(|c| ChapterView {
            id: c.id,
            start_ms: c.start.as_millis(),
            timestamp: c.start.to_display_string(),
            label: &c.label,
        })
        .collect();

    Ok(serde_json::to_string_pretty(&views)?)
}

/// Check platform rules that do not block rendering.
pub fn lint(chapters: &ChapterList) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in chapters.as_slice().windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let length = next.start.as_millis() - current.start.as_millis();

        if current.start.to_display_string() == next.start.to_display_string() {
            warnings.push(Warning::general(format!(
                "'{}' and '{}' both display as {}",
                current.label,
                next.label,
                current.start.to_display_string()
            )));
        } else if length < MIN_CHAPTER_MS {
            warnings.push(Warning::general(format!(
                "'{}' is only {:.1}s long; chapters must be at least {}s",
                current.label,
                length as f64 / 1000.0,
                MIN_CHAPTER_MS / 1000
            )));
        }
    }

    warnings
}

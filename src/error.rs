use std::fmt;

use thiserror::Error;

use crate::chapter_list::ChapterId;
use crate::timecode::Timecode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized marker format: no EDL, marker CSV or marker text structure found")]
    UnrecognizedFormat,

    #[error("Empty or structurally invalid input: {reason}")]
    EmptyOrStructurallyInvalid { reason: String },

    #[error("Invalid timecode '{text}': {reason}")]
    InvalidTimecode { text: String, reason: String },
}

impl ParseError {
    pub(crate) fn structural(reason: impl Into<String>) -> Self {
        ParseError::EmptyOrStructurallyInvalid {
            reason: reason.into(),
        }
    }

    pub(crate) fn timecode(text: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidTimecode {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("No valid chapters found in input")]
    NoValidChapters,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Chapter {0} not found")]
    NotFound(ChapterId),

    #[error("A chapter already starts at {0}")]
    DuplicateTime(Timecode),

    #[error("Position {index} is out of range for {len} chapters")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Chapter {0} is the last chapter and has nothing to merge with")]
    NothingToMerge(ChapterId),
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("At least 2 chapters are required to publish chapters, found {count}")]
    TooFewChapters { count: usize },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ChapterizeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Invalid frame rate: {0} (must be a positive number)")]
    InvalidFrameRate(f64),
}

pub type Result<T> = std::result::Result<T, ChapterizeError>;

/// A recoverable problem with a single record, collected instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: Option<usize>,
    pub message: String,
}

impl Warning {
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

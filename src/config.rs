use crate::format_detector::FormatKind;
use crate::timecode::FrameRate;

/// Settings for one conversion run, supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Rate for frame-based timecodes. `None` uses `FrameRate::DEFAULT`,
    /// or 29.97 when an EDL declares `FCM: DROP FRAME`.
    pub frame_rate: Option<FrameRate>,
    /// Skip detection and parse as this format
    pub format: Option<FormatKind>,
    /// Log every raw marker and resolved chapter at debug level
    pub debug: bool,
}

impl PipelineConfig {
    pub fn with_frame_rate(mut self, rate: FrameRate) -> Self {
        self.frame_rate = Some(rate);
        self
    }

    pub fn with_format(mut self, format: FormatKind) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Rate to use given what the input declared about drop frame.
    pub fn effective_frame_rate(&self, declared_drop_frame: Option<bool>) -> FrameRate {
        match (self.frame_rate, declared_drop_frame) {
            (Some(rate), _) => rate,
            (None, Some(true)) => FrameRate::NTSC,
            (None, _) => FrameRate::DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_frame_rate() {
        let config = PipelineConfig::default();
        assert_eq!(config.effective_frame_rate(None), FrameRate::DEFAULT);
        assert_eq!(config.effective_frame_rate(Some(false)), FrameRate::DEFAULT);
        assert_eq!(config.effective_frame_rate(Some(true)), FrameRate::NTSC);

        let rate = FrameRate::new(25.0).unwrap();
        let config = config.with_frame_rate(rate);
        assert_eq!(config.effective_frame_rate(Some(true)), rate);
    }
}

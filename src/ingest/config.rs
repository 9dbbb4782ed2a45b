//! Recorder configuration

use crate::media::muxer::MuxerConfig;

/// Stream recorder configuration options
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// FLV muxer settings
    pub muxer: MuxerConfig,

    /// Video frames counted locally before being reported to the registry
    pub frame_report_batch: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            muxer: MuxerConfig::default(),
            frame_report_batch: 30,
        }
    }
}

impl RecorderConfig {
    /// Set the muxer configuration
    pub fn muxer(mut self, muxer: MuxerConfig) -> Self {
        self.muxer = muxer;
        self
    }

    /// Set the frame report batch size (minimum 1)
    pub fn frame_report_batch(mut self, batch: u64) -> Self {
        self.frame_report_batch = batch.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::muxer::TimestampLayout;

    #[test]
    fn test_default_config() {
        let config = RecorderConfig::default();
        assert_eq!(config.frame_report_batch, 30);
        assert_eq!(config.muxer.timestamp_layout, TimestampLayout::Full32);
    }

    #[test]
    fn test_builder_frame_report_batch() {
        let config = RecorderConfig::default().frame_report_batch(5);
        assert_eq!(config.frame_report_batch, 5);
    }

    #[test]
    fn test_builder_frame_report_batch_floor() {
        let config = RecorderConfig::default().frame_report_batch(0);
        assert_eq!(config.frame_report_batch, 1);
    }

    #[test]
    fn test_builder_muxer() {
        let config = RecorderConfig::default()
            .muxer(MuxerConfig::default().timestamp_layout(TimestampLayout::Extended));
        assert_eq!(config.muxer.timestamp_layout, TimestampLayout::Extended);
    }
}

use std::time::Duration;

use crate::capture::CaptureConstraints;
use crate::session::{DEFAULT_MAX_DURATION_SECS, DEFAULT_MIME_TYPE};

/// Configuration for a recorder
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Tracks requested from the platform
    pub constraints: CaptureConstraints,

    /// Recording stops itself once this many ticks have elapsed
    /// Default: 180 (3 minutes)
    pub max_duration_secs: u64,

    /// Interval of the elapsed-time timer
    pub tick_interval: Duration,

    /// Mime type stamped on assembled artifacts
    pub mime_type: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            tick_interval: Duration::from_secs(1),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

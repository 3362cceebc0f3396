use serde::{Deserialize, Serialize};

use crate::session::Artifact;

/// Why a recording stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user asked for it
    Manual,
    /// Elapsed time reached the configured maximum
    MaxDuration,
    /// The platform closed the recording pipe (share ended)
    StreamEnded,
    /// The recorder itself was shut down
    Shutdown,
}

/// Events broadcast to observers of a recorder
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    /// Capture acquired and recording underway
    Started,
    /// Elapsed-time signal, once per tick
    Tick { elapsed_secs: u64 },
    /// Start failed because the platform refused capture
    CaptureDenied(String),
    /// Recording finalized
    Stopped {
        artifact: Artifact,
        reason: StopReason,
    },
}

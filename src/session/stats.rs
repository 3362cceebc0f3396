use serde::{Deserialize, Serialize};

use super::artifact::ArtifactSummary;
use super::state::SessionState;

/// Point-in-time view of a recording session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current lifecycle state
    pub state: SessionState,

    /// A start is waiting on the capture permission prompt
    pub starting: bool,

    /// Whole seconds since recording started (0 outside Recording)
    pub elapsed_secs: u64,

    /// Upper bound on elapsed seconds before the session stops itself
    pub max_duration_secs: u64,

    /// Number of fragments accumulated so far
    pub chunk_count: usize,

    /// Total bytes accumulated so far
    pub buffered_bytes: usize,

    /// Finalized recording, present only once Stopped
    pub artifact: Option<ArtifactSummary>,
}

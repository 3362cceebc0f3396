//! Recording session state machine
//!
//! This module provides the `Session` value that tracks one capture attempt:
//! - Lifecycle state (idle, recording, stopped)
//! - Ordered fragment accumulation
//! - Elapsed-time accounting against a maximum duration
//! - Assembly of the final immutable `Artifact`
//!
//! Transitions never perform I/O; they return the `Effect`s a driver must run.

mod artifact;
mod machine;
mod state;
mod stats;

pub use artifact::{Artifact, ArtifactSummary, DEFAULT_FILENAME, DEFAULT_MIME_TYPE};
pub use machine::{Effect, Session, SessionError, DEFAULT_MAX_DURATION_SECS};
pub use state::SessionState;
pub use stats::SessionSnapshot;

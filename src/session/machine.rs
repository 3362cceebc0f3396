use thiserror::Error;
use tracing::{debug, info};

use super::artifact::{Artifact, DEFAULT_MIME_TYPE};
use super::state::SessionState;
use super::stats::SessionSnapshot;
use crate::capture::Fragment;

/// Maximum recording length before the session stops itself
pub const DEFAULT_MAX_DURATION_SECS: u64 = 180;

/// Rejected session transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("a capture request is already pending")]
    StartPending,
}

/// Side effect a driver must perform after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the platform for a capture stream
    AcquireCapture,
    /// Open the recording pipe on the acquired stream
    OpenPipe,
    /// Start the one-second tick timer
    StartTimer,
    /// Halt the recording pipe and let it flush
    StopPipe,
    /// Stop and release every track of the owned stream
    ReleaseTracks,
    /// Cancel the tick timer
    CancelTimer,
    /// Hand the finalized recording to the caller
    Emit(Artifact),
}

/// One recording attempt
///
/// All mutation goes through the transition methods, which check the current
/// state first so late or duplicate events are harmless.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    chunks: Vec<Fragment>,
    elapsed_secs: u64,
    artifact: Option<Artifact>,
    max_duration_secs: u64,
    mime_type: String,
    acquiring: bool,
    stopping: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DURATION_SECS, DEFAULT_MIME_TYPE)
    }
}

impl Session {
    pub fn new(max_duration_secs: u64, mime_type: &str) -> Self {
        Self {
            state: SessionState::Idle,
            chunks: Vec::new(),
            elapsed_secs: 0,
            artifact: None,
            max_duration_secs,
            mime_type: mime_type.to_string(),
            acquiring: false,
            stopping: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn max_duration_secs(&self) -> u64 {
        self.max_duration_secs
    }

    pub fn chunks(&self) -> &[Fragment] {
        &self.chunks
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Whether a start is waiting on the capture permission prompt
    pub fn is_starting(&self) -> bool {
        self.acquiring
    }

    /// Whether a stop has been requested and the pipe is still flushing
    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// User asked to start recording
    pub fn request_start(&mut self) -> Result<Vec<Effect>, SessionError> {
        if self.state == SessionState::Recording {
            return Err(SessionError::AlreadyRecording);
        }
        if self.acquiring {
            return Err(SessionError::StartPending);
        }

        self.acquiring = true;
        Ok(vec![Effect::AcquireCapture])
    }

    /// Platform granted a capture stream
    ///
    /// Supersedes any previous Stopped session: its artifact is dropped here.
    pub fn capture_granted(&mut self) -> Vec<Effect> {
        if !self.acquiring {
            debug!("Ignoring capture grant without a pending start");
            return Vec::new();
        }

        self.acquiring = false;
        self.chunks.clear();
        self.elapsed_secs = 0;
        self.artifact = None;
        self.stopping = false;
        self.state = SessionState::Recording;

        vec![Effect::OpenPipe, Effect::StartTimer]
    }

    /// Platform refused the capture request; prior state is kept
    pub fn capture_denied(&mut self) -> Vec<Effect> {
        self.acquiring = false;
        Vec::new()
    }

    /// A fragment arrived from the recording pipe
    ///
    /// Returns whether the fragment was appended. Empty fragments and
    /// fragments arriving outside Recording are dropped.
    pub fn data_available(&mut self, fragment: Fragment) -> bool {
        if self.state != SessionState::Recording {
            debug!(
                "Dropping {} byte fragment while {}",
                fragment.len(),
                self.state
            );
            return false;
        }
        if fragment.is_empty() {
            return false;
        }

        self.chunks.push(fragment);
        true
    }

    /// One timer interval passed
    pub fn tick(&mut self) -> Vec<Effect> {
        if self.state != SessionState::Recording || self.stopping {
            return Vec::new();
        }

        self.elapsed_secs += 1;

        if self.elapsed_secs >= self.max_duration_secs {
            info!(
                "Maximum duration of {}s reached, stopping",
                self.max_duration_secs
            );
            return self.request_stop();
        }

        Vec::new()
    }

    /// Stop requested, manually or by the duration limit
    ///
    /// A no-op unless Recording and not already stopping.
    pub fn request_stop(&mut self) -> Vec<Effect> {
        if self.state != SessionState::Recording || self.stopping {
            return Vec::new();
        }

        self.stopping = true;
        vec![Effect::StopPipe, Effect::ReleaseTracks, Effect::CancelTimer]
    }

    /// The recording pipe reported closed after flushing
    ///
    /// A pipe that closes without a prior stop request (the platform ended
    /// the share) still releases the stream and cancels the timer.
    pub fn pipe_closed(&mut self) -> Vec<Effect> {
        if self.state != SessionState::Recording {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if !self.stopping {
            info!("Recording pipe closed by the platform, finalizing");
            effects.push(Effect::ReleaseTracks);
            effects.push(Effect::CancelTimer);
        }

        let chunks = std::mem::take(&mut self.chunks);
        let artifact = Artifact::assemble(&chunks, &self.mime_type);

        self.state = SessionState::Stopped;
        self.elapsed_secs = 0;
        self.stopping = false;
        self.artifact = Some(artifact.clone());

        effects.push(Effect::Emit(artifact));
        effects
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            starting: self.acquiring,
            elapsed_secs: self.elapsed_secs,
            max_duration_secs: self.max_duration_secs,
            chunk_count: self.chunks.len(),
            buffered_bytes: self.chunks.iter().map(|c| c.len()).sum(),
            artifact: self.artifact.as_ref().map(Artifact::summary),
        }
    }
}

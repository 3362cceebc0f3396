use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

use super::file::{FileCaptureBackend, FileCaptureConfig};

/// One encoded fragment delivered by the recording pipe
///
/// Fragments arrive in emission order. A fragment may be empty; the session
/// drops those without treating them as an error.
pub type Fragment = Bytes;

/// Errors raised while acquiring a capture stream
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Permission refused, prompt cancelled, or no capture surface available
    #[error("capture denied: {0}")]
    Denied(String),
}

/// What the caller asks the platform to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// Description of one track of a live capture stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Video or audio
    pub kind: TrackKind,
    /// Human readable label reported by the platform
    pub label: String,
    /// Whether the track is still producing media
    pub active: bool,
}

/// Capture acquisition trait
///
/// Implementations:
/// - File: replays an existing recording as if it were a live display share
/// - Tests: scripted fakes that deliver fragments on demand
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Request a live capture stream
    ///
    /// May suspend while the platform shows a permission prompt.
    async fn acquire(
        &mut self,
        constraints: CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// A live capture stream plus its recording pipe
pub trait CaptureStream: Send + Sync {
    /// Tracks carried by this stream
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Open the recording pipe
    ///
    /// Returns a channel receiver that yields fragments until the pipe closes.
    fn start_pipe(&mut self) -> mpsc::Receiver<Fragment>;

    /// Halt the recording pipe
    ///
    /// Buffered data is flushed as a final fragment, then the channel closes.
    fn stop_pipe(&mut self);

    /// Stop every track of the stream
    fn release(&mut self);

    /// Number of tracks still active
    fn active_tracks(&self) -> usize {
        self.tracks().iter().filter(|t| t.active).count()
    }
}

/// Where captured media comes from
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Replay a media file as a live stream
    File(PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source
    pub fn create(source: CaptureSource, config: FileCaptureConfig) -> Box<dyn CaptureBackend> {
        match source {
            CaptureSource::File(path) => Box::new(FileCaptureBackend::new(path, config)),
        }
    }
}

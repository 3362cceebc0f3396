//! Recording workflow as seen from the user interface
//!
//! Start/stop a recording, download or upload the result, and browse what
//! the backend already stores.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::recorder::{RecorderError, RecorderHandle};
use crate::session::Artifact;
use crate::transfer::{RemoteRecording, TransferClient, TransferError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("failed to export recording: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ScreenRecorderApp {
    recorder: RecorderHandle,
    transfer: TransferClient,
    filename: String,
    recordings: Vec<RemoteRecording>,
}

impl ScreenRecorderApp {
    pub fn new(recorder: RecorderHandle, transfer: TransferClient, filename: &str) -> Self {
        Self {
            recorder,
            transfer,
            filename: filename.to_string(),
            recordings: Vec::new(),
        }
    }

    pub fn recorder(&self) -> &RecorderHandle {
        &self.recorder
    }

    pub fn transfer(&self) -> &TransferClient {
        &self.transfer
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.recorder.start().await?;
        Ok(())
    }

    pub async fn stop(&self) -> Result<Option<Artifact>, AppError> {
        Ok(self.recorder.stop().await?)
    }

    /// Write the finalized recording into `dir`
    ///
    /// Without a finalized recording this does nothing and returns `None`.
    pub async fn download(&self, dir: &Path) -> Result<Option<PathBuf>, AppError> {
        let Some(artifact) = self.recorder.artifact().await? else {
            info!("Nothing to download");
            return Ok(None);
        };

        let path = artifact.export(dir, &self.filename).await?;
        Ok(Some(path))
    }

    /// Upload the finalized recording, then refresh the remote listing
    ///
    /// Without a non-empty finalized recording no request is made. The
    /// upload works on its own snapshot of the artifact, so a session started
    /// meanwhile cannot change what gets sent.
    pub async fn upload(&mut self) -> Result<Option<RemoteRecording>, AppError> {
        let artifact = match self.recorder.artifact().await? {
            Some(artifact) if !artifact.is_empty() => artifact,
            _ => {
                info!("Nothing to upload");
                return Ok(None);
            }
        };

        let recording = self.transfer.upload(&artifact, &self.filename).await?;

        if let Err(e) = self.refresh().await {
            warn!("Failed to refresh recordings after upload: {}", e);
        }

        Ok(Some(recording))
    }

    /// Fetch the remote listing
    pub async fn refresh(&mut self) -> Result<&[RemoteRecording], AppError> {
        self.recordings = self.transfer.list().await?;
        Ok(&self.recordings)
    }

    /// Last fetched remote listing
    pub fn recordings(&self) -> &[RemoteRecording] {
        &self.recordings
    }

    pub fn playback_url(&self, recording: &RemoteRecording) -> String {
        self.transfer.playback_url(&recording.id)
    }
}

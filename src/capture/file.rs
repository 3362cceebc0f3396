use bytes::Bytes;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::backend::{
    CaptureBackend, CaptureConstraints, CaptureError, CaptureStream, Fragment, TrackInfo, TrackKind,
};

/// Pacing of a replayed capture
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileCaptureConfig {
    /// Interval between emitted fragments (encoder timeslice)
    pub timeslice_ms: u64,
    /// Bytes emitted per full timeslice
    pub fragment_size: usize,
}

impl Default for FileCaptureConfig {
    fn default() -> Self {
        Self {
            timeslice_ms: 1000,
            fragment_size: 64 * 1024,
        }
    }
}

/// Capture backend that replays an existing media file as a live share
///
/// A missing or unreadable file behaves like a refused permission prompt.
pub struct FileCaptureBackend {
    path: PathBuf,
    config: FileCaptureConfig,
}

impl FileCaptureBackend {
    pub fn new(path: PathBuf, config: FileCaptureConfig) -> Self {
        Self { path, config }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCaptureBackend {
    async fn acquire(
        &mut self,
        constraints: CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        if !constraints.video && !constraints.audio {
            return Err(CaptureError::Denied(
                "no video or audio track requested".to_string(),
            ));
        }

        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            CaptureError::Denied(format!("cannot open {}: {}", self.path.display(), e))
        })?;

        let label = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "capture".to_string());

        let mut tracks = Vec::new();
        if constraints.video {
            tracks.push(TrackInfo {
                kind: TrackKind::Video,
                label: format!("{} (video)", label),
                active: true,
            });
        }
        if constraints.audio {
            tracks.push(TrackInfo {
                kind: TrackKind::Audio,
                label: format!("{} (audio)", label),
                active: true,
            });
        }

        info!(
            "Acquired file capture: {} ({} bytes, {} tracks)",
            self.path.display(),
            data.len(),
            tracks.len()
        );

        Ok(Box::new(FileCaptureStream {
            source: Bytes::from(data),
            config: self.config.clone(),
            tracks,
            stop_tx: None,
        }))
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Live stream over an in-memory copy of the source file
struct FileCaptureStream {
    source: Bytes,
    config: FileCaptureConfig,
    tracks: Vec<TrackInfo>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl CaptureStream for FileCaptureStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    fn start_pipe(&mut self) -> mpsc::Receiver<Fragment> {
        let (tx, rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::spawn(replay(self.source.clone(), self.config.clone(), tx, stop_rx));

        rx
    }

    fn stop_pipe(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The replay task may already have finished on its own
            let _ = stop_tx.send(());
        }
    }

    fn release(&mut self) {
        for track in &mut self.tracks {
            track.active = false;
        }
    }
}

/// Emit one fragment per timeslice until stopped or the source runs dry
///
/// On stop, whatever accumulated since the last timeslice is flushed as a
/// final (possibly empty) fragment before the channel closes.
async fn replay(
    source: Bytes,
    config: FileCaptureConfig,
    tx: mpsc::Sender<Fragment>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let timeslice = Duration::from_millis(config.timeslice_ms.max(1));
    let fragment_size = config.fragment_size.max(1);

    let mut ticker = interval(timeslice);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    let mut offset = 0usize;
    let mut last_emit = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let end = (offset + fragment_size).min(source.len());
                let fragment = source.slice(offset..end);
                offset = end;
                last_emit = Instant::now();

                if tx.send(fragment).await.is_err() {
                    return;
                }

                if offset >= source.len() {
                    debug!("Capture source exhausted after {} bytes", offset);
                    return;
                }
            }
            _ = &mut stop_rx => {
                let since_last = last_emit.elapsed().as_millis();
                let buffered = (fragment_size as u128 * since_last / timeslice.as_millis()) as usize;
                let end = (offset + buffered.min(fragment_size)).min(source.len());

                debug!("Flushing final fragment of {} bytes", end - offset);
                let _ = tx.send(source.slice(offset..end)).await;
                return;
            }
        }
    }
}

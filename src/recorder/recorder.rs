use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::config::RecorderConfig;
use super::events::{RecorderEvent, StopReason};
use crate::capture::{CaptureBackend, CaptureConstraints, CaptureError, CaptureStream, Fragment};
use crate::session::{Artifact, Effect, Session, SessionError, SessionSnapshot, SessionState};

/// Errors surfaced to recorder callers
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("capture backend is unavailable")]
    BackendUnavailable,

    #[error("recorder task is no longer running")]
    Closed,
}

type CaptureResult = Result<Box<dyn CaptureStream>, CaptureError>;

/// Outcome of a capture request running off the recorder task
///
/// The backend travels with the request and comes back with its result.
type Acquisition = JoinHandle<(Box<dyn CaptureBackend>, CaptureResult)>;

enum Command {
    Start {
        reply: oneshot::Sender<Result<(), RecorderError>>,
    },
    Stop {
        reply: oneshot::Sender<Option<Artifact>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Artifact {
        reply: oneshot::Sender<Option<Artifact>>,
    },
}

/// Cloneable handle to a running recorder
///
/// The recorder task shuts down (stopping any live recording) once every
/// handle has been dropped.
#[derive(Clone)]
pub struct RecorderHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<RecorderEvent>,
}

impl RecorderHandle {
    /// Acquire capture and start recording
    pub async fn start(&self) -> Result<(), RecorderError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { reply }).await?;
        rx.await.map_err(|_| RecorderError::Closed)?
    }

    /// Stop recording and return the finalized artifact
    ///
    /// Idempotent: once stopped, returns the same artifact again. Returns
    /// `None` if nothing was ever recorded.
    pub async fn stop(&self) -> Result<Option<Artifact>, RecorderError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stop { reply }).await?;
        rx.await.map_err(|_| RecorderError::Closed)
    }

    /// Get current session state
    pub async fn snapshot(&self) -> Result<SessionSnapshot, RecorderError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| RecorderError::Closed)
    }

    /// Finalized artifact of the current session, without stopping it
    pub async fn artifact(&self) -> Result<Option<Artifact>, RecorderError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Artifact { reply }).await?;
        rx.await.map_err(|_| RecorderError::Closed)
    }

    /// Subscribe to recorder events
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: Command) -> Result<(), RecorderError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RecorderError::Closed)
    }
}

/// Owner of one recording session and every resource it holds
///
/// Commands, fragments, timer ticks and capture results are processed one at
/// a time on a single task. A pending permission prompt runs on its own task
/// so the recorder keeps answering in the meantime.
pub struct Recorder {
    config: RecorderConfig,
    session: Session,
    backend: Option<Box<dyn CaptureBackend>>,
    acquisition: Option<Acquisition>,
    start_reply: Option<oneshot::Sender<Result<(), RecorderError>>>,
    stream: Option<Box<dyn CaptureStream>>,
    fragments: Option<mpsc::Receiver<Fragment>>,
    ticker: Option<Interval>,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<RecorderEvent>,
}

impl Recorder {
    /// Spawn a recorder task on the current runtime
    pub fn spawn(backend: Box<dyn CaptureBackend>, config: RecorderConfig) -> RecorderHandle {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, _) = broadcast::channel(512);

        let recorder = Self {
            session: Session::new(config.max_duration_secs, &config.mime_type),
            config,
            backend: Some(backend),
            acquisition: None,
            start_reply: None,
            stream: None,
            fragments: None,
            ticker: None,
            commands: command_rx,
            events: event_tx.clone(),
        };

        tokio::spawn(recorder.run());

        RecorderHandle {
            commands: command_tx,
            events: event_tx,
        }
    }

    async fn run(mut self) {
        let backend_name = self
            .backend
            .as_ref()
            .map(|b| b.name().to_string())
            .unwrap_or_default();
        info!("Recorder task started ({} backend)", backend_name);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                acquired = next_acquisition(&mut self.acquisition), if self.acquisition.is_some() => {
                    self.acquisition = None;
                    self.on_acquired(acquired);
                },
                fragment = next_fragment(&mut self.fragments), if self.fragments.is_some() => {
                    match fragment {
                        Some(fragment) => {
                            self.session.data_available(fragment);
                        }
                        None => {
                            self.fragments = None;
                            let effects = self.session.pipe_closed();
                            self.apply(effects, StopReason::StreamEnded);
                        }
                    }
                },
                _ = next_tick(&mut self.ticker), if self.ticker.is_some() => self.on_tick().await,
            }
        }

        // A prompt still open at shutdown must not leak the stream it grants
        if let Some(acquisition) = self.acquisition.take() {
            let acquired = acquisition.await;
            self.on_acquired(acquired);
        }

        self.stop(StopReason::Shutdown).await;
        info!("Recorder task stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { reply } => self.start(reply),
            Command::Stop { reply } => {
                let artifact = self.stop(StopReason::Manual).await;
                let _ = reply.send(artifact);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Artifact { reply } => {
                let _ = reply.send(self.session.artifact().cloned());
            }
        }
    }

    /// Begin a start; the reply is sent once the platform answers
    fn start(&mut self, reply: oneshot::Sender<Result<(), RecorderError>>) {
        if self.backend.is_none() && self.acquisition.is_none() {
            let _ = reply.send(Err(RecorderError::BackendUnavailable));
            return;
        }

        match self.session.request_start() {
            Ok(effects) => {
                self.start_reply = Some(reply);
                self.apply(effects, StopReason::Manual);
            }
            Err(e) => {
                debug!("Start rejected: {}", e);
                let _ = reply.send(Err(e.into()));
            }
        }
    }

    fn on_acquired(
        &mut self,
        acquired: Result<(Box<dyn CaptureBackend>, CaptureResult), JoinError>,
    ) {
        let result = match acquired {
            Ok((backend, result)) => {
                self.backend = Some(backend);
                result
            }
            Err(e) => {
                error!("Capture request task failed: {}", e);
                Err(CaptureError::Denied("capture request failed".to_string()))
            }
        };

        let outcome = match result {
            Ok(stream) => {
                info!("Capture acquired with {} tracks", stream.tracks().len());
                self.stream = Some(stream);
                let effects = self.session.capture_granted();
                self.apply(effects, StopReason::Manual);

                info!("Recording started");
                self.emit(RecorderEvent::Started);
                Ok(())
            }
            Err(e) => {
                warn!("Capture request failed: {}", e);
                self.session.capture_denied();
                self.emit(RecorderEvent::CaptureDenied(e.to_string()));
                Err(e.into())
            }
        };

        if let Some(reply) = self.start_reply.take() {
            let _ = reply.send(outcome);
        }
    }

    /// Stop the live recording
    ///
    /// While a start is still waiting on the platform this is a no-op that
    /// returns the current artifact; the pending start is not cancelled.
    async fn stop(&mut self, reason: StopReason) -> Option<Artifact> {
        let effects = self.session.request_stop();
        if effects.is_empty() {
            debug!("Stop ignored while {}", self.session.state());
            return self.session.artifact().cloned();
        }

        info!("Stopping recording ({:?})", reason);
        self.halt(effects, reason).await;
        self.session.artifact().cloned()
    }

    async fn on_tick(&mut self) {
        let effects = self.session.tick();

        if self.session.state() == SessionState::Recording {
            self.emit(RecorderEvent::Tick {
                elapsed_secs: self.session.elapsed_secs(),
            });
        }

        if !effects.is_empty() {
            self.halt(effects, StopReason::MaxDuration).await;
        }
    }

    /// Run the stop effects, drain the flushing pipe, then finalize
    async fn halt(&mut self, effects: Vec<Effect>, reason: StopReason) {
        self.apply(effects, reason);

        if let Some(mut fragments) = self.fragments.take() {
            while let Some(fragment) = fragments.recv().await {
                self.session.data_available(fragment);
            }
        }

        let effects = self.session.pipe_closed();
        self.apply(effects, reason);
    }

    fn apply(&mut self, effects: Vec<Effect>, reason: StopReason) {
        for effect in effects {
            match effect {
                Effect::AcquireCapture => {
                    if let Some(backend) = self.backend.take() {
                        self.acquisition =
                            Some(spawn_acquisition(backend, self.config.constraints));
                    }
                }
                Effect::OpenPipe => {
                    if let Some(stream) = self.stream.as_mut() {
                        self.fragments = Some(stream.start_pipe());
                    }
                }
                Effect::StartTimer => {
                    let period = self.config.tick_interval;
                    let mut ticker = interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.ticker = Some(ticker);
                }
                Effect::StopPipe => {
                    if let Some(stream) = self.stream.as_mut() {
                        stream.stop_pipe();
                    }
                }
                Effect::ReleaseTracks => {
                    if let Some(mut stream) = self.stream.take() {
                        let tracks = stream.tracks().len();
                        stream.release();
                        info!("Released {} capture tracks", tracks);
                    }
                }
                Effect::CancelTimer => {
                    self.ticker = None;
                }
                Effect::Emit(artifact) => {
                    info!(
                        "Recording finalized: {} bytes in {} fragments ({})",
                        artifact.len(),
                        artifact.fragment_count(),
                        artifact.object_url()
                    );
                    self.emit(RecorderEvent::Stopped { artifact, reason });
                }
            }
        }
    }

    fn emit(&self, event: RecorderEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Ask the platform for capture without holding up the recorder task
fn spawn_acquisition(
    mut backend: Box<dyn CaptureBackend>,
    constraints: CaptureConstraints,
) -> Acquisition {
    tokio::spawn(async move {
        let result = backend.acquire(constraints).await;
        (backend, result)
    })
}

async fn next_acquisition(
    acquisition: &mut Option<Acquisition>,
) -> Result<(Box<dyn CaptureBackend>, CaptureResult), JoinError> {
    match acquisition {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn next_fragment(fragments: &mut Option<mpsc::Receiver<Fragment>>) -> Option<Fragment> {
    match fragments {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

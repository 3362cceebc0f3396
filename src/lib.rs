pub mod app;
pub mod capture;
pub mod config;
pub mod recorder;
pub mod session;
pub mod transfer;

pub use app::{AppError, ScreenRecorderApp};
pub use capture::{
    CaptureBackend, CaptureBackendFactory, CaptureConstraints, CaptureError, CaptureSource,
    CaptureStream, FileCaptureBackend, FileCaptureConfig, Fragment, TrackInfo, TrackKind,
};
pub use crate::config::Config;
pub use recorder::{Recorder, RecorderConfig, RecorderError, RecorderEvent, RecorderHandle, StopReason};
pub use session::{Artifact, Session, SessionError, SessionSnapshot, SessionState};
pub use transfer::{RemoteRecording, TransferClient, TransferError};

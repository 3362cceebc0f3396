pub mod backend;
pub mod file;

pub use backend::{
    CaptureBackend, CaptureBackendFactory, CaptureConstraints, CaptureError, CaptureSource,
    CaptureStream, Fragment, TrackInfo, TrackKind,
};
pub use file::{FileCaptureBackend, FileCaptureConfig};

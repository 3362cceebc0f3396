//! Transfer client for the recordings backend
//!
//! - GET /api/recordings - List stored recordings
//! - POST /api/recordings - Upload a recording (multipart field `video`)
//! - GET /api/recordings/:id - Playback/download location

mod client;
mod models;

pub use client::{TransferClient, TransferError, UPLOAD_FIELD, UPLOAD_MIME_TYPE};
pub use models::RemoteRecording;

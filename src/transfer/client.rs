use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::models::RemoteRecording;
use crate::session::Artifact;

/// Multipart field carrying the video payload
pub const UPLOAD_FIELD: &str = "video";

/// Content type of the uploaded part
pub const UPLOAD_MIME_TYPE: &str = "video/webm";

/// Errors talking to the recordings backend
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid backend url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid upload content type {mime}: {source}")]
    InvalidMimeType {
        mime: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Stateless client for the recordings REST endpoint
///
/// Every call is a single request: no retries, no chunking, no progress.
#[derive(Debug, Clone)]
pub struct TransferClient {
    http: reqwest::Client,
    base_url: String,
    upload_mime_type: String,
}

impl TransferClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransferError> {
        Url::parse(base_url).map_err(|e| TransferError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransferError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_mime_type: UPLOAD_MIME_TYPE.to_string(),
        })
    }

    /// Content type sent with the uploaded part (default `video/webm`)
    pub fn with_upload_mime_type(mut self, mime: &str) -> Self {
        self.upload_mime_type = mime.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /api/recordings
    pub async fn list(&self) -> Result<Vec<RemoteRecording>, TransferError> {
        let url = self.recordings_url();
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| TransferError::Request {
                url: url.clone(),
                source,
            })?;

        let recordings: Vec<RemoteRecording> = check_status(&url, response)?
            .json()
            .await
            .map_err(|source| TransferError::Decode { url, source })?;

        info!("Listed {} remote recordings", recordings.len());
        Ok(recordings)
    }

    /// POST /api/recordings with the artifact as multipart field `video`
    pub async fn upload(
        &self,
        artifact: &Artifact,
        filename: &str,
    ) -> Result<RemoteRecording, TransferError> {
        let url = self.recordings_url();
        debug!("POST {} ({} bytes as {})", url, artifact.len(), filename);

        let part = Part::stream(artifact.data().clone())
            .file_name(filename.to_string())
            .mime_str(&self.upload_mime_type)
            .map_err(|source| TransferError::InvalidMimeType {
                mime: self.upload_mime_type.clone(),
                source,
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| TransferError::Request {
                url: url.clone(),
                source,
            })?;

        let recording: RemoteRecording = check_status(&url, response)?
            .json()
            .await
            .map_err(|source| TransferError::Decode { url, source })?;

        info!(
            "Uploaded {} bytes as {} (id {})",
            artifact.len(),
            recording.filename,
            recording.id
        );
        Ok(recording)
    }

    /// Playback/download location of a stored recording; no I/O
    pub fn playback_url(&self, id: &str) -> String {
        format!("{}/{}", self.recordings_url(), id)
    }

    fn recordings_url(&self) -> String {
        format!("{}/api/recordings", self.base_url)
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, TransferError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_url_is_deterministic() {
        let client = TransferClient::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();

        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.playback_url("abc"),
            "http://localhost:5000/api/recordings/abc"
        );
        assert_eq!(client.playback_url("abc"), client.playback_url("abc"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = TransferClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(TransferError::InvalidUrl { .. })));
    }
}

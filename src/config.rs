use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::capture::{CaptureConstraints, FileCaptureConfig};
use crate::recorder::RecorderConfig;
use crate::session::{DEFAULT_FILENAME, DEFAULT_MAX_DURATION_SECS, DEFAULT_MIME_TYPE};
use crate::transfer::UPLOAD_MIME_TYPE;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub recording: RecordingConfig,
    pub capture: FileCaptureConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "screen-recorder".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub upload_mime_type: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            upload_mime_type: UPLOAD_MIME_TYPE.to_string(),
        }
    }
}

impl BackendConfig {
    /// Per-request timeout; zero is clamped to one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub max_duration_secs: u64,
    pub tick_interval_ms: u64,
    pub filename: String,
    pub mime_type: String,
    pub video: bool,
    pub audio: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            tick_interval_ms: 1000,
            filename: DEFAULT_FILENAME.to_string(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            video: true,
            audio: true,
        }
    }
}

impl RecordingConfig {
    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            constraints: CaptureConstraints {
                video: self.video,
                audio: self.audio,
            },
            max_duration_secs: self.max_duration_secs,
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl Config {
    /// Load configuration from `path` (extension optional)
    ///
    /// A missing file yields the built-in defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid config {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_is_clamped() {
        let backend = BackendConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(backend.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_timeout_uses_configured_seconds() {
        assert_eq!(BackendConfig::default().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_tick_interval_is_clamped() {
        let recording = RecordingConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            recording.recorder_config().tick_interval,
            Duration::from_millis(1)
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let cfg = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.backend.base_url, "http://localhost:5000");
        assert_eq!(cfg.backend.upload_mime_type, UPLOAD_MIME_TYPE);
    }
}

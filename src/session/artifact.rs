use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::capture::Fragment;

/// Default container/codec description of an assembled recording
pub const DEFAULT_MIME_TYPE: &str = "video/webm; codecs=vp8,opus";

/// Default file name used for downloads and uploads
pub const DEFAULT_FILENAME: &str = "recording.webm";

/// A finalized recording
///
/// Built once, when a session stops, and never mutated afterwards. Cloning
/// shares the underlying buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    id: Uuid,
    data: Bytes,
    mime_type: String,
    fragment_count: usize,
    created_at: DateTime<Utc>,
}

impl Artifact {
    /// Concatenate fragments in delivery order
    pub fn assemble(fragments: &[Fragment], mime_type: &str) -> Self {
        let total: usize = fragments.iter().map(|f| f.len()).sum();
        let mut buf = BytesMut::with_capacity(total);
        for fragment in fragments {
            buf.extend_from_slice(fragment);
        }

        Self {
            id: Uuid::new_v4(),
            data: buf.freeze(),
            mime_type: mime_type.to_string(),
            fragment_count: fragments.len(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Locally scoped playable reference
    pub fn object_url(&self) -> String {
        format!("blob:{}", self.id)
    }

    /// Write the recording into `dir` as `filename` (the local download)
    pub async fn export(&self, dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, &self.data).await?;

        info!("Exported {} bytes to {}", self.data.len(), path.display());

        Ok(path)
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            id: self.id,
            object_url: self.object_url(),
            bytes: self.data.len(),
            fragment_count: self.fragment_count,
            mime_type: self.mime_type.clone(),
            created_at: self.created_at,
        }
    }
}

/// Serializable description of an artifact, without its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub id: Uuid,
    pub object_url: String,
    pub bytes: usize,
    pub fragment_count: usize,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

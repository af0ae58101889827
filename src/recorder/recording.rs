//! Saved session recordings (pretty JSON on disk)

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capture::FrameInput;
use crate::recorder::RecordingResult;

/// A captured run of frame inputs, stored as pretty-printed JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecording {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub frames: Vec<FrameInput>,
}

impl SessionRecording {
    pub fn new(frames: Vec<FrameInput>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            frames,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> RecordingResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, data)?;

        tracing::info!("Saved recording {} ({} frames) to {}", self.id, self.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> RecordingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let recording: Self = serde_json::from_str(&content)?;

        tracing::info!("Loaded recording {} ({} frames)", recording.id, recording.len());
        Ok(recording)
    }

    /// Last frame at or before `offset` seconds from the first frame
    pub fn frame_at(&self, offset: f64) -> Option<&FrameInput> {
        let start = self.frames.first()?.timestamp;
        let target = start + offset;
        let idx = self.frames.partition_point(|f| f.timestamp <= target);
        idx.checked_sub(1).map(|i| &self.frames[i])
    }

    /// Seconds between the first and last frame
    pub fn duration(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

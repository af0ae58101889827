//! Frame recording
//!
//! Captures the frame inputs fed to a session so a run can be replayed
//! deterministically later.

pub mod frames;
pub mod recording;

use thiserror::Error;

pub use frames::{FrameRecorder, RecorderState};
pub use recording::SessionRecording;

/// Errors that can occur during recording
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Recording has no frames")]
    EmptyRecording,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;

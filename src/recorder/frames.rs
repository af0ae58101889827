//! Frame recorder
//!
//! Collects hand frames while recording, with pause/resume and an optional
//! minimum spacing between kept frames.

use crate::capture::FrameInput;
use crate::recorder::recording::SessionRecording;
use crate::recorder::{RecordingError, RecordingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "idle"),
            RecorderState::Recording => write!(f, "recording"),
            RecorderState::Paused => write!(f, "paused"),
        }
    }
}

/// Buffers frame inputs between `start` and `stop`
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    state: RecorderState,
    frames: Vec<FrameInput>,
    /// Frames closer than this (seconds) to the last kept one are dropped
    min_interval: Option<f64>,
    last_timestamp: Option<f64>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            frames: Vec::new(),
            min_interval: None,
            last_timestamp: None,
        }
    }

    /// Keep at most one frame per `interval` seconds
    pub fn with_min_interval(mut self, interval: f64) -> Self {
        self.min_interval = Some(interval.max(0.0));
        self
    }

    pub fn start(&mut self) -> RecordingResult<()> {
        if self.state != RecorderState::Idle {
            return Err(RecordingError::AlreadyRecording);
        }

        self.frames.clear();
        self.last_timestamp = None;
        self.state = RecorderState::Recording;

        tracing::info!("Frame recording started");
        Ok(())
    }

    /// Returns true when the frame was kept
    pub fn record(&mut self, frame: &FrameInput) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }

        if let (Some(interval), Some(last)) = (self.min_interval, self.last_timestamp) {
            if frame.timestamp - last < interval {
                return false;
            }
        }

        self.last_timestamp = Some(frame.timestamp);
        self.frames.push(frame.clone());
        true
    }

    pub fn pause(&mut self) -> RecordingResult<()> {
        if self.state != RecorderState::Recording {
            return Err(RecordingError::NotRecording);
        }
        self.state = RecorderState::Paused;
        tracing::debug!("Frame recording paused ({} frames)", self.frames.len());
        Ok(())
    }

    pub fn resume(&mut self) -> RecordingResult<()> {
        if self.state != RecorderState::Paused {
            return Err(RecordingError::NotRecording);
        }
        self.state = RecorderState::Recording;
        tracing::debug!("Frame recording resumed");
        Ok(())
    }

    /// Finish and hand back the buffered frames. The recorder returns to idle
    /// even when nothing was captured.
    pub fn stop(&mut self) -> RecordingResult<SessionRecording> {
        if self.state == RecorderState::Idle {
            return Err(RecordingError::NotRecording);
        }

        self.state = RecorderState::Idle;
        self.last_timestamp = None;
        let frames = std::mem::take(&mut self.frames);

        if frames.is_empty() {
            return Err(RecordingError::EmptyRecording);
        }

        let recording = SessionRecording::new(frames);
        tracing::info!(
            "Frame recording stopped (id={}, frames={}, duration={:.2}s)",
            recording.id,
            recording.len(),
            recording.duration()
        );
        Ok(recording)
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut recorder = FrameRecorder::new();
        assert!(!recorder.record(&FrameInput::empty(0.0)), "idle recorder drops frames");
        assert!(matches!(recorder.stop(), Err(RecordingError::NotRecording)));

        recorder.start().unwrap();
        assert!(matches!(recorder.start(), Err(RecordingError::AlreadyRecording)));
        assert!(recorder.record(&FrameInput::empty(0.0)));

        recorder.pause().unwrap();
        assert!(!recorder.record(&FrameInput::empty(0.1)));
        assert_eq!(recorder.state(), RecorderState::Paused);

        recorder.resume().unwrap();
        assert!(recorder.record(&FrameInput::empty(0.2)));

        let recording = recorder.stop().unwrap();
        assert_eq!(recording.len(), 2);
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(recorder.frame_count(), 0);
    }

    #[test]
    fn test_min_interval_drops_dense_frames() {
        let mut recorder = FrameRecorder::new().with_min_interval(0.05);
        recorder.start().unwrap();

        let kept = (0..10)
            .filter(|i| recorder.record(&FrameInput::empty(*i as f64 * 0.02)))
            .count();

        // 0.00, 0.06, 0.12, 0.18
        assert_eq!(kept, 4);
    }

    #[test]
    fn test_empty_stop_is_an_error() {
        let mut recorder = FrameRecorder::new();
        recorder.start().unwrap();
        assert!(matches!(recorder.stop(), Err(RecordingError::EmptyRecording)));
        assert_eq!(recorder.state(), RecorderState::Idle);
    }
}

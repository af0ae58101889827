//! Offline replay of recorded sessions
//!
//! Feeds a saved recording through a fresh session and hands the planned
//! pointer commands to a driver, by default one printing JSON lines.

use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::config::PointerConfig;
use crate::control::{PointerCommand, PointerDriver};
use crate::recorder::SessionRecording;
use crate::session::{FrameOutput, Session};

/// Writes each command as one JSON object per line
pub struct JsonLinesDriver<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesDriver<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PointerDriver for JsonLinesDriver<W> {
    fn execute(&mut self, command: &PointerCommand) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, command)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

/// Run every frame of `recording` through a new session
pub fn replay(
    recording: &SessionRecording,
    config: &PointerConfig,
    driver: &mut dyn PointerDriver,
) -> Vec<FrameOutput> {
    tracing::info!(
        "Replaying recording {} ({} frames, {:.2}s)",
        recording.id,
        recording.len(),
        recording.duration()
    );

    let mut session = Session::new(config);
    let outputs: Vec<FrameOutput> = recording
        .frames
        .iter()
        .map(|frame| session.dispatch(frame, &mut *driver))
        .collect();

    let commands: usize = outputs.iter().map(|o| o.commands.len()).sum();
    tracing::info!("Replay finished: {} frames, {} commands", outputs.len(), commands);

    outputs
}

/// Load a recording (and optional config) from disk and replay it
pub fn replay_file(
    recording_path: &Path,
    config_path: Option<&Path>,
    driver: &mut dyn PointerDriver,
) -> anyhow::Result<Vec<FrameOutput>> {
    let config = match config_path {
        Some(path) => PointerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PointerConfig::default(),
    };

    let recording = SessionRecording::load(recording_path)
        .with_context(|| format!("Failed to load recording {}", recording_path.display()))?;

    Ok(replay(&recording, &config, driver))
}

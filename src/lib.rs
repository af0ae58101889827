//! Lyra Pointer - control the mouse pointer with hand gestures.
//!
//! The library turns per-frame hand landmarks into pointer commands:
//! coordinate smoothing, gesture classification, control-zone mapping and
//! a control state machine, tied together by [`session::Session`]. Hand
//! detection and OS mouse injection live outside this crate.

pub mod capture;
pub mod commands;
pub mod config;
pub mod control;
pub mod gestures;
pub mod processing;
pub mod recorder;
pub mod session;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::PointerConfig;
pub use session::{FrameOutput, Session, SharedSession};

/// Replay a recorded session and print the planned pointer commands
#[derive(Parser, Debug)]
#[command(name = "lyra-pointer")]
#[command(version, about = "Replay recorded hand frames through the gesture pipeline")]
pub struct Cli {
    /// Recording JSON produced by the frame recorder
    pub recording: PathBuf,

    /// Optional config JSON (camelCase keys)
    pub config: Option<PathBuf>,
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays JSON.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyra_pointer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Binary entry point
pub fn run() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    tracing::info!("Starting Lyra Pointer v{}", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    let mut driver = commands::JsonLinesDriver::new(stdout.lock());
    let outputs = commands::replay_file(&cli.recording, cli.config.as_deref(), &mut driver)?;

    tracing::info!(
        "Processed {} frames, wrote {} commands",
        outputs.len(),
        driver.written()
    );
    Ok(())
}

//! Command-line entry points
//!
//! Operations the binary exposes on top of the library.

pub mod replay;

pub use replay::{replay, replay_file, JsonLinesDriver};

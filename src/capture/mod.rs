//! Hand landmark input
//!
//! Data shapes handed to the pipeline by the external hand-pose provider.
//! Detection itself happens elsewhere; this module only describes frames.

pub mod landmarks;
pub mod types;

pub use landmarks::{Finger, LANDMARK_COUNT};
pub use types::{FrameInput, HandFrame, Handedness, LandmarkPoint};

//! Pointer coordinate processing
//!
//! Jitter removal for the pointer landmark and the camera-to-screen
//! remapping applied before coordinates reach the action dispatcher.

pub mod one_euro;
pub mod pointer_smoothing;
pub mod zone;

pub use one_euro::{CoordinateSmoother, SmoothingState};
pub use pointer_smoothing::{FilterParams, PointerSmoother, SmoothedPoint};
pub use zone::{ControlZone, ScreenRect, ZoneMapper};

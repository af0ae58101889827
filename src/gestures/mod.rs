//! Gesture recognition
//!
//! Turns raw hand frames into debounced, discrete gestures and maps those
//! gestures onto pointer actions.

pub mod actions;
pub mod classifier;
pub mod features;
pub mod types;

pub use actions::{ActionMap, ActionType};
pub use classifier::{ClassifierConfig, GestureClassifier};
pub use types::{ClickState, FingerStates, GestureSample, GestureType, PinchDistances, PinchEngagement};

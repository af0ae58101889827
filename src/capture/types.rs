//! Hand landmark input types
//!
//! Serialized camelCase so recordings stay readable.

use serde::{Deserialize, Serialize};

use crate::capture::landmarks::{Finger, LANDMARK_COUNT, WRIST};

/// One landmark in normalized image space.
///
/// `x` and `y` are in `[0, 1]` with the origin at the top-left of the captured
/// image. `z` is relative depth and is not reliable enough to drive decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar distance, ignoring depth
    pub fn distance_2d(&self, other: &LandmarkPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
        }
    }
}

/// A single detected hand, as produced by the hand-pose provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandFrame {
    pub landmarks: [LandmarkPoint; LANDMARK_COUNT],
    pub handedness: Handedness,
    pub confidence: f64,
}

impl HandFrame {
    pub fn new(
        landmarks: [LandmarkPoint; LANDMARK_COUNT],
        handedness: Handedness,
        confidence: f64,
    ) -> Self {
        Self {
            landmarks,
            handedness,
            confidence,
        }
    }

    pub fn wrist(&self) -> &LandmarkPoint {
        &self.landmarks[WRIST]
    }

    pub fn tip(&self, finger: Finger) -> &LandmarkPoint {
        &self.landmarks[finger.tip()]
    }

    pub fn pip(&self, finger: Finger) -> &LandmarkPoint {
        &self.landmarks[finger.pip()]
    }

    pub fn mcp(&self, finger: Finger) -> &LandmarkPoint {
        &self.landmarks[finger.mcp()]
    }
}

/// One processed camera tick: zero or one hand plus the capture timestamp
/// in seconds on a monotonic clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInput {
    pub timestamp: f64,
    #[serde(default)]
    pub hand: Option<HandFrame>,
}

impl FrameInput {
    pub fn with_hand(timestamp: f64, hand: HandFrame) -> Self {
        Self {
            timestamp,
            hand: Some(hand),
        }
    }

    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            hand: None,
        }
    }
}

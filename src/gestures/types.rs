//! Gesture vocabulary and per-frame classifier output

use serde::{Deserialize, Serialize};

use crate::capture::Finger;

/// Discrete gesture classified from one hand frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureType {
    #[default]
    None,
    Fist,
    Palm,
    Pointer,
    Click,
    ClickHold,
    RightClick,
    DoubleClick,
    Scroll,
    ScrollUp,
    ScrollDown,
}

impl GestureType {
    pub const ALL: [GestureType; 11] = [
        GestureType::None,
        GestureType::Fist,
        GestureType::Palm,
        GestureType::Pointer,
        GestureType::Click,
        GestureType::ClickHold,
        GestureType::RightClick,
        GestureType::DoubleClick,
        GestureType::Scroll,
        GestureType::ScrollUp,
        GestureType::ScrollDown,
    ];

    pub fn is_scroll_family(self) -> bool {
        matches!(
            self,
            GestureType::Scroll | GestureType::ScrollUp | GestureType::ScrollDown
        )
    }
}

impl std::fmt::Display for GestureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GestureType::None => "none",
            GestureType::Fist => "fist",
            GestureType::Palm => "palm",
            GestureType::Pointer => "pointer",
            GestureType::Click => "click",
            GestureType::ClickHold => "click-hold",
            GestureType::RightClick => "right-click",
            GestureType::DoubleClick => "double-click",
            GestureType::Scroll => "scroll",
            GestureType::ScrollUp => "scroll-up",
            GestureType::ScrollDown => "scroll-down",
        };
        write!(f, "{}", name)
    }
}

/// Per-finger extension result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn is_extended(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    pub fn set(&mut self, finger: Finger, extended: bool) {
        match finger {
            Finger::Thumb => self.thumb = extended,
            Finger::Index => self.index = extended,
            Finger::Middle => self.middle = extended,
            Finger::Ring => self.ring = extended,
            Finger::Pinky => self.pinky = extended,
        }
    }

    pub fn all_extended(&self) -> bool {
        Finger::ALL.iter().all(|f| self.is_extended(*f))
    }

    /// True when none of index, middle, ring, pinky is extended
    pub fn long_fingers_folded(&self) -> bool {
        Finger::LONG.iter().all(|f| !self.is_extended(*f))
    }

    pub fn count(&self) -> usize {
        Finger::ALL.iter().filter(|f| self.is_extended(**f)).count()
    }
}

/// Planar fingertip distances used for pinch detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinchDistances {
    pub thumb_index: f64,
    pub thumb_middle: f64,
}

/// Pinch engagement after hysteresis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinchEngagement {
    pub thumb_index: bool,
    pub thumb_middle: bool,
}

/// Click sub-state owned by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickState {
    #[default]
    Idle,
    Pinching,
    Holding,
}

/// Classified gesture plus the features it was derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureSample {
    pub gesture: GestureType,
    /// Consecutive frames this gesture type has been emitted, starting at 1
    pub frames: u32,
    pub fingers: FingerStates,
    pub pinch: PinchDistances,
    pub engaged: PinchEngagement,
    /// Index fingertip in normalized camera space
    pub pointer: (f64, f64),
    pub timestamp: f64,
}

impl GestureSample {
    /// First frame of the current gesture type
    pub fn is_onset(&self) -> bool {
        self.frames == 1
    }
}

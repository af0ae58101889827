//! Gesture classification with temporal debouncing
//!
//! Each frame is reduced to finger-extension flags and pinch distances, then
//! matched against a fixed priority list (first match wins):
//!
//! 1. all five fingers extended → Palm
//! 2. index, middle, ring, pinky folded → Fist
//! 3. index + middle extended, ring + pinky folded, no thumb–index pinch → Scroll
//! 4. thumb–middle pinch without thumb–index pinch → RightClick
//! 5. thumb–index pinch → Click / ClickHold / DoubleClick
//! 6. only index extended among the long fingers → Pointer
//! 7. otherwise → None
//!
//! The order matters: several poses satisfy more than one rule.

use serde::{Deserialize, Serialize};

use crate::capture::{Finger, HandFrame};
use crate::gestures::features::{finger_states, pinch_distances};
use crate::gestures::types::{
    ClickState, FingerStates, GestureSample, GestureType, PinchDistances, PinchEngagement,
};

/// Thresholds and timings for the classifier. Durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Pinch engages below this distance
    pub pinch_threshold: f64,
    /// An engaged pinch releases at or above this distance
    pub pinch_release_threshold: f64,
    /// Pinch frames after which Click becomes ClickHold
    pub click_hold_frames: u32,
    /// Pinch duration after which Click becomes ClickHold
    pub click_hold_duration: f64,
    /// Longest pinch that still counts as a click on release
    pub click_max_duration: f64,
    pub double_click_interval: f64,
    /// Accumulated index-tip travel (normalized y) that emits one scroll step
    pub scroll_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.05,
            pinch_release_threshold: 0.07,
            click_hold_frames: 3,
            click_hold_duration: 0.25,
            click_max_duration: 0.3,
            double_click_interval: 0.35,
            scroll_threshold: 0.05,
        }
    }
}

/// Stateful classifier. Call [`GestureClassifier::reset`] when the hand is lost.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: ClassifierConfig,

    engaged: PinchEngagement,

    click_state: ClickState,
    pinch_started_at: f64,
    pinch_frames: u32,
    last_click_at: Option<f64>,

    scroll_ref_y: Option<f64>,
    scroll_accum: f64,

    last_gesture: Option<GestureType>,
    frames: u32,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            engaged: PinchEngagement::default(),
            click_state: ClickState::Idle,
            pinch_started_at: 0.0,
            pinch_frames: 0,
            last_click_at: None,
            scroll_ref_y: None,
            scroll_accum: 0.0,
            last_gesture: None,
            frames: 0,
        }
    }

    /// Classify one hand frame captured at `timestamp` (seconds).
    ///
    /// Never fails: frames with non-finite landmarks classify as None.
    pub fn detect(&mut self, hand: &HandFrame, timestamp: f64) -> GestureSample {
        let index_tip = *hand.tip(Finger::Index);
        let pointer = (index_tip.x, index_tip.y);

        let (fingers, pinch, base) = if landmarks_finite(hand) {
            let fingers = finger_states(hand);
            let pinch = pinch_distances(hand);
            self.update_engagement(&pinch);
            let base = self.classify(&fingers);
            (fingers, pinch, base)
        } else {
            // Undecidable frame: drop the pinch without completing a click
            self.engaged = PinchEngagement::default();
            self.click_state = ClickState::Idle;
            self.pinch_frames = 0;
            (FingerStates::default(), PinchDistances::default(), GestureType::None)
        };

        let base = self.apply_scroll(base, index_tip.y);
        let gesture = self.apply_click(base, timestamp);

        if self.last_gesture == Some(gesture) {
            self.frames = self.frames.saturating_add(1);
        } else {
            self.frames = 1;
        }
        self.last_gesture = Some(gesture);

        GestureSample {
            gesture,
            frames: self.frames,
            fingers,
            pinch,
            engaged: self.engaged,
            pointer,
            timestamp,
        }
    }

    /// Priority-ordered rule match. Rule 5 yields `Click` as a placeholder that
    /// the click sub-machine refines.
    fn classify(&self, fingers: &FingerStates) -> GestureType {
        if fingers.all_extended() {
            GestureType::Palm
        } else if fingers.long_fingers_folded() {
            GestureType::Fist
        } else if fingers.index
            && fingers.middle
            && !fingers.ring
            && !fingers.pinky
            && !self.engaged.thumb_index
        {
            GestureType::Scroll
        } else if self.engaged.thumb_middle && !self.engaged.thumb_index {
            GestureType::RightClick
        } else if self.engaged.thumb_index {
            GestureType::Click
        } else if fingers.index && !fingers.middle && !fingers.ring && !fingers.pinky {
            GestureType::Pointer
        } else {
            GestureType::None
        }
    }

    fn update_engagement(&mut self, pinch: &PinchDistances) {
        let engage = self.config.pinch_threshold;
        let release = self.config.pinch_release_threshold;

        self.engaged.thumb_index =
            hysteresis(self.engaged.thumb_index, pinch.thumb_index, engage, release);
        self.engaged.thumb_middle =
            hysteresis(self.engaged.thumb_middle, pinch.thumb_middle, engage, release);
    }

    fn apply_scroll(&mut self, base: GestureType, index_y: f64) -> GestureType {
        if !base.is_scroll_family() {
            self.scroll_ref_y = None;
            self.scroll_accum = 0.0;
            return base;
        }

        let Some(ref_y) = self.scroll_ref_y else {
            self.scroll_ref_y = Some(index_y);
            self.scroll_accum = 0.0;
            return GestureType::Scroll;
        };

        self.scroll_accum += index_y - ref_y;
        self.scroll_ref_y = Some(index_y);

        let threshold = self.config.scroll_threshold;
        if self.scroll_accum > threshold {
            self.scroll_accum = 0.0;
            GestureType::ScrollDown
        } else if self.scroll_accum < -threshold {
            self.scroll_accum = 0.0;
            GestureType::ScrollUp
        } else {
            GestureType::Scroll
        }
    }

    /// Click sub-machine: Idle → Pinching → Holding, plus double-click pairing on release
    fn apply_click(&mut self, base: GestureType, timestamp: f64) -> GestureType {
        if base == GestureType::Click {
            return match self.click_state {
                ClickState::Idle => {
                    self.click_state = ClickState::Pinching;
                    self.pinch_started_at = timestamp;
                    self.pinch_frames = 1;
                    GestureType::Click
                }
                ClickState::Pinching => {
                    self.pinch_frames += 1;
                    let elapsed = timestamp - self.pinch_started_at;
                    if elapsed >= self.config.click_hold_duration
                        || self.pinch_frames > self.config.click_hold_frames
                    {
                        self.click_state = ClickState::Holding;
                        GestureType::ClickHold
                    } else {
                        GestureType::Click
                    }
                }
                ClickState::Holding => {
                    self.pinch_frames += 1;
                    GestureType::ClickHold
                }
            };
        }

        if self.click_state == ClickState::Idle {
            return base;
        }

        let released = !self.engaged.thumb_index;
        self.click_state = ClickState::Idle;
        self.pinch_frames = 0;

        if released && self.complete_pinch(timestamp) {
            GestureType::DoubleClick
        } else {
            base
        }
    }

    /// Returns true when this release completes a double click
    fn complete_pinch(&mut self, timestamp: f64) -> bool {
        let duration = timestamp - self.pinch_started_at;
        if duration >= self.config.click_max_duration {
            self.last_click_at = None;
            return false;
        }

        match self.last_click_at {
            Some(previous) if timestamp - previous < self.config.double_click_interval => {
                self.last_click_at = None;
                true
            }
            _ => {
                self.last_click_at = Some(timestamp);
                false
            }
        }
    }

    /// Drop all temporal state (pinch, click timers, scroll, frame counter)
    pub fn reset(&mut self) {
        let config = self.config;
        *self = Self::new(config);
    }

    pub fn click_state(&self) -> ClickState {
        self.click_state
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClassifierConfig) {
        self.config = config;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

fn hysteresis(engaged: bool, distance: f64, engage: f64, release: f64) -> bool {
    if engaged {
        distance < release
    } else {
        distance < engage
    }
}

fn landmarks_finite(hand: &HandFrame) -> bool {
    hand.landmarks
        .iter()
        .all(|p| p.x.is_finite() && p.y.is_finite())
}

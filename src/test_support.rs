//! Synthetic hands for unit tests
//!
//! Builds right- or left-handed 21-point hands in a fixed upright pose where
//! every finger is cleanly extended or folded under all extension tests.

use crate::capture::landmarks::*;
use crate::capture::{Finger, FrameInput, HandFrame, Handedness, LandmarkPoint, LANDMARK_COUNT};
use crate::gestures::types::FingerStates;

const WRIST_POS: (f64, f64) = (0.5, 0.9);

fn column(finger: Finger) -> f64 {
    match finger {
        Finger::Thumb => 0.63,
        Finger::Index => 0.40,
        Finger::Middle => 0.47,
        Finger::Ring => 0.54,
        Finger::Pinky => 0.61,
    }
}

#[derive(Debug, Clone)]
pub struct HandBuilder {
    handedness: Handedness,
    extended: FingerStates,
    pinch: Option<(Finger, f64)>,
    shift: (f64, f64),
    confidence: f64,
}

impl HandBuilder {
    pub fn right() -> Self {
        Self {
            handedness: Handedness::Right,
            extended: FingerStates::default(),
            pinch: None,
            shift: (0.0, 0.0),
            confidence: 0.95,
        }
    }

    pub fn left() -> Self {
        Self {
            handedness: Handedness::Left,
            ..Self::right()
        }
    }

    pub fn extend(mut self, finger: Finger) -> Self {
        self.extended.set(finger, true);
        self
    }

    pub fn extend_all(mut self) -> Self {
        for finger in Finger::ALL {
            self.extended.set(finger, true);
        }
        self
    }

    /// Index only
    pub fn pointer() -> Self {
        Self::right().extend(Finger::Index)
    }

    /// Place the thumb tip `distance` away from the given fingertip
    pub fn pinch(mut self, finger: Finger, distance: f64) -> Self {
        self.pinch = Some((finger, distance));
        self
    }

    /// Translate the whole hand
    pub fn shift(mut self, dx: f64, dy: f64) -> Self {
        self.shift = (dx, dy);
        self
    }

    pub fn build(&self) -> HandFrame {
        let mut points = [LandmarkPoint::default(); LANDMARK_COUNT];
        points[WRIST] = LandmarkPoint::new(WRIST_POS.0, WRIST_POS.1, 0.0);

        for finger in Finger::LONG {
            let x = column(finger);
            let base = finger.mcp();
            let ys: [f64; 4] = if self.extended.is_extended(finger) {
                [0.7, 0.6, 0.55, 0.5]
            } else {
                [0.7, 0.62, 0.66, 0.74]
            };
            for (offset, y) in ys.iter().enumerate() {
                points[base + offset] = LandmarkPoint::new(x, *y, 0.0);
            }
        }

        points[THUMB_CMC] = LandmarkPoint::new(0.58, 0.85, 0.0);
        points[THUMB_MCP] = LandmarkPoint::new(column(Finger::Thumb), 0.8, 0.0);
        points[THUMB_IP] = LandmarkPoint::new(0.6, 0.75, 0.0);
        points[THUMB_TIP] = if self.extended.thumb {
            LandmarkPoint::new(0.55, 0.72, 0.0)
        } else {
            LandmarkPoint::new(0.68, 0.78, 0.0)
        };

        // Thumb sits on the +x side of a right hand in this pose
        if let Some((finger, distance)) = self.pinch {
            let target = points[finger.tip()];
            points[THUMB_TIP] = LandmarkPoint::new(target.x + distance, target.y, 0.0);
        }

        let mirror = self.handedness == Handedness::Left;
        for p in points.iter_mut() {
            if mirror {
                p.x = 1.0 - p.x;
            }
            p.x += self.shift.0;
            p.y += self.shift.1;
        }

        HandFrame::new(points, self.handedness, self.confidence)
    }

    pub fn at(&self, timestamp: f64) -> FrameInput {
        FrameInput::with_hand(timestamp, self.build())
    }
}

//! Per-frame hand features
//!
//! Finger extension is decided by a 2-of-3 vote over independent geometric
//! tests so that one test fooled by depth noise does not flip the result.

use crate::capture::{Finger, HandFrame, Handedness, LandmarkPoint};
use crate::gestures::types::{FingerStates, PinchDistances};

/// Bone segments MCP→PIP and PIP→tip must bend less than 60°
pub const STRAIGHTNESS_MIN_COS: f64 = 0.5;

/// Fingertip must be this much farther from the wrist than the MCP joint
pub const REACH_RATIO: f64 = 1.2;

const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Votes needed out of three
const EXTENSION_QUORUM: usize = 2;

/// Tip above the middle joint in image space (y grows downward)
fn tip_above_pip(tip: &LandmarkPoint, pip: &LandmarkPoint) -> bool {
    tip.y < pip.y
}

/// Angle between the two bone segments is under 60°
fn segments_straight(mcp: &LandmarkPoint, pip: &LandmarkPoint, tip: &LandmarkPoint) -> bool {
    let (ax, ay) = (pip.x - mcp.x, pip.y - mcp.y);
    let (bx, by) = (tip.x - pip.x, tip.y - pip.y);

    let len_a = (ax * ax + ay * ay).sqrt();
    let len_b = (bx * bx + by * by).sqrt();
    if len_a < MIN_SEGMENT_LENGTH || len_b < MIN_SEGMENT_LENGTH {
        return false;
    }

    let cos = (ax * bx + ay * by) / (len_a * len_b);
    cos > STRAIGHTNESS_MIN_COS
}

fn tip_reaches_past_mcp(wrist: &LandmarkPoint, mcp: &LandmarkPoint, tip: &LandmarkPoint) -> bool {
    tip.distance_2d(wrist) > mcp.distance_2d(wrist) * REACH_RATIO
}

/// Majority vote for index, middle, ring or pinky
pub fn is_finger_extended(hand: &HandFrame, finger: Finger) -> bool {
    if finger == Finger::Thumb {
        return is_thumb_extended(hand);
    }

    let tip = hand.tip(finger);
    let pip = hand.pip(finger);
    let mcp = hand.mcp(finger);

    let votes = [
        tip_above_pip(tip, pip),
        segments_straight(mcp, pip, tip),
        tip_reaches_past_mcp(hand.wrist(), mcp, tip),
    ];

    votes.iter().filter(|v| **v).count() >= EXTENSION_QUORUM
}

/// Lateral test: the thumb tip sits outside its MCP joint on the x axis.
/// The outward direction depends on which hand it is.
pub fn is_thumb_extended(hand: &HandFrame) -> bool {
    let tip = hand.tip(Finger::Thumb);
    let mcp = hand.mcp(Finger::Thumb);

    match hand.handedness {
        Handedness::Right => tip.x < mcp.x,
        Handedness::Left => tip.x > mcp.x,
    }
}

pub fn finger_states(hand: &HandFrame) -> FingerStates {
    let mut states = FingerStates::default();
    for finger in Finger::ALL {
        states.set(finger, is_finger_extended(hand, finger));
    }
    states
}

/// Fingertip distance in the image plane; depth is too noisy to include
pub fn pinch_distance(hand: &HandFrame, a: Finger, b: Finger) -> f64 {
    hand.tip(a).distance_2d(hand.tip(b))
}

pub fn pinch_distances(hand: &HandFrame) -> PinchDistances {
    PinchDistances {
        thumb_index: pinch_distance(hand, Finger::Thumb, Finger::Index),
        thumb_middle: pinch_distance(hand, Finger::Thumb, Finger::Middle),
    }
}

//! Per-frame pipeline
//!
//! A [`Session`] owns one instance of every component and runs them in order
//! for each camera frame: classify → zone test → smooth → map → state machine
//! → action planning.
//!
//! Sessions are single-threaded. Wrap one in a [`SharedSession`] to drive it
//! from more than one thread.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::capture::{FrameInput, HandFrame};
use crate::config::PointerConfig;
use crate::control::{
    ActionPlanner, ControlState, ControlStateMachine, PointerCommand, PointerDriver, Transition,
};
use crate::gestures::{ActionMap, GestureClassifier, GestureSample, GestureType};
use crate::processing::{PointerSmoother, SmoothedPoint, ZoneMapper};

pub type SharedSession = Arc<Mutex<Session>>;

/// Everything produced for one input frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOutput {
    pub timestamp: f64,
    /// `None` when no hand was visible
    pub sample: Option<GestureSample>,
    /// Smoothed pointer, only when the index tip was inside the control zone
    pub pointer: Option<SmoothedPoint>,
    pub screen: Option<(i32, i32)>,
    pub state: ControlState,
    pub transition: Transition,
    pub commands: Vec<PointerCommand>,
}

#[derive(Debug)]
pub struct Session {
    classifier: GestureClassifier,
    smoother: PointerSmoother,
    mapper: ZoneMapper,
    machine: ControlStateMachine,
    planner: ActionPlanner,
    pause_hold_frames: u32,
    hand_present: bool,
    frames_processed: u64,
}

impl Session {
    pub fn new(config: &PointerConfig) -> Self {
        let mut smoother = PointerSmoother::new(config.filter_params());
        smoother.set_enabled(config.smoothing_enabled);
        let mut planner = ActionPlanner::new(ActionMap::default(), config.scroll_speed);
        planner.set_double_click_window(double_click_window(config));

        Self {
            classifier: GestureClassifier::new(config.classifier()),
            smoother,
            mapper: config.zone_mapper(),
            machine: ControlStateMachine::new(ControlState::Idle, 0.0),
            planner,
            pause_hold_frames: config.pause_hold_frames,
            hand_present: false,
            frames_processed: 0,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Run one tick of the pipeline
    pub fn process(&mut self, input: &FrameInput) -> FrameOutput {
        self.frames_processed += 1;

        match &input.hand {
            Some(hand) => self.process_hand(hand, input.timestamp),
            None => self.process_lost(input.timestamp),
        }
    }

    fn process_hand(&mut self, hand: &HandFrame, now: f64) -> FrameOutput {
        if !self.hand_present {
            tracing::info!("Hand found ({}, confidence {:.2})", hand.handedness, hand.confidence);
            self.hand_present = true;
        }

        let sample = self.classifier.detect(hand, now);
        let (px, py) = sample.pointer;

        let (pointer, screen) = if self.mapper.is_in_control_zone(px, py) {
            let smoothed = self.smoother.smooth(px, py, now);
            let screen = self.mapper.camera_to_screen(smoothed.x, smoothed.y);
            (Some(smoothed), Some(screen))
        } else {
            (None, None)
        };

        // Palm only toggles pause once it has been held long enough
        let transition = if sample.gesture == GestureType::Palm
            && sample.frames != self.pause_hold_frames
        {
            Transition::unchanged(self.machine.state())
        } else {
            self.machine.process_gesture(sample.gesture, now)
        };

        let state = self.machine.state();
        let commands = self.planner.plan(state, Some(&sample), screen);

        FrameOutput {
            timestamp: now,
            sample: Some(sample),
            pointer,
            screen,
            state,
            transition,
            commands,
        }
    }

    fn process_lost(&mut self, now: f64) -> FrameOutput {
        if self.hand_present {
            tracing::info!("Hand lost, resetting smoother and classifier");
            self.hand_present = false;
        }
        self.smoother.reset();
        self.classifier.reset();

        let transition = self.machine.force_state(ControlState::Idle, None, now);
        let commands = self.planner.plan(ControlState::Idle, None, None);

        FrameOutput {
            timestamp: now,
            sample: None,
            pointer: None,
            screen: None,
            state: ControlState::Idle,
            transition,
            commands,
        }
    }

    /// Process a frame and hand its commands to `driver`.
    ///
    /// Driver failures are logged and do not stop the remaining commands.
    pub fn dispatch(&mut self, input: &FrameInput, driver: &mut dyn PointerDriver) -> FrameOutput {
        let output = self.process(input);

        for command in &output.commands {
            if let Err(e) = driver.execute(command) {
                tracing::warn!("Pointer driver failed on {:?}: {:#}", command, e);
            }
        }

        output
    }

    /// Update thresholds, zone, sensitivity and filter parameters in place.
    /// Temporal state (click timers, filter history, control state) is kept.
    pub fn apply_config(&mut self, config: &PointerConfig) {
        self.classifier.set_config(config.classifier());
        self.smoother.set_params(config.filter_params());
        self.smoother.set_enabled(config.smoothing_enabled);
        self.mapper.set_zone(config.control_zone);
        self.mapper.set_sensitivity(config.sensitivity);
        self.mapper.set_screen(config.screen);
        self.planner.set_scroll_speed(config.scroll_speed);
        self.planner
            .set_double_click_window(double_click_window(config));
        self.pause_hold_frames = config.pause_hold_frames;

        tracing::debug!("Applied config to session");
    }

    pub fn state(&self) -> ControlState {
        self.machine.state()
    }

    pub fn state_machine(&self) -> &ControlStateMachine {
        &self.machine
    }

    /// For registering callbacks or editing transitions
    pub fn state_machine_mut(&mut self) -> &mut ControlStateMachine {
        &mut self.machine
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn mapper(&self) -> &ZoneMapper {
        &self.mapper
    }

    pub fn actions_mut(&mut self) -> &mut ActionMap {
        self.planner.actions_mut()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&PointerConfig::default())
    }
}

/// Time from the first click's onset to the release that pairs it
fn double_click_window(config: &PointerConfig) -> f64 {
    let classifier = config.classifier();
    classifier.double_click_interval + classifier.click_max_duration
}

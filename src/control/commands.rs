//! Pointer commands and action planning
//!
//! The planner turns the current control state and gesture sample into the
//! concrete mouse operations an OS layer should perform. Nothing here touches
//! the OS; drivers implement [`PointerDriver`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::control::state_machine::ControlState;
use crate::gestures::{ActionMap, ActionType, GestureSample};

pub const DEFAULT_SCROLL_SPEED: i32 = 5;

/// Double-click interval plus the longest click, in seconds
pub const DEFAULT_DOUBLE_CLICK_WINDOW: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Button {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerCommand {
    /// Absolute screen position in pixels
    MoveTo { x: i32, y: i32 },
    Click { button: Button },
    DoubleClick { button: Button },
    ButtonDown { button: Button },
    ButtonUp { button: Button },
    /// Positive amounts scroll up / right
    Scroll { amount: i32, axis: ScrollAxis },
}

/// Implemented by whatever actually moves the OS pointer
pub trait PointerDriver {
    fn execute(&mut self, command: &PointerCommand) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct ActionPlanner {
    actions: ActionMap,
    scroll_speed: i32,
    button_down: bool,
    /// Onset times of the last two left clicks sent
    recent_clicks: VecDeque<f64>,
    double_click_window: f64,
}

impl ActionPlanner {
    pub fn new(actions: ActionMap, scroll_speed: i32) -> Self {
        Self {
            actions,
            scroll_speed,
            button_down: false,
            recent_clicks: VecDeque::with_capacity(2),
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
        }
    }

    /// Plan this frame's commands. `sample` is `None` when no hand is visible.
    pub fn plan(
        &mut self,
        state: ControlState,
        sample: Option<&GestureSample>,
        position: Option<(i32, i32)>,
    ) -> Vec<PointerCommand> {
        let mut commands = Vec::new();

        if self.button_down && state != ControlState::Dragging {
            commands.push(PointerCommand::ButtonUp {
                button: Button::Left,
            });
            self.button_down = false;
        }

        let Some(sample) = sample else {
            return commands;
        };
        if matches!(
            state,
            ControlState::Paused | ControlState::Calibrating | ControlState::Tutorial
        ) {
            return commands;
        }

        let move_to = position.map(|(x, y)| PointerCommand::MoveTo { x, y });
        let first_frame = sample.is_onset();

        match self.actions.get(sample.gesture) {
            ActionType::MoveCursor => {
                if matches!(state, ControlState::Pointing | ControlState::Dragging) {
                    commands.extend(move_to);
                }
            }
            ActionType::LeftClick => {
                if state == ControlState::Clicking && first_frame {
                    commands.push(PointerCommand::Click {
                        button: Button::Left,
                    });
                    if self.recent_clicks.len() == 2 {
                        self.recent_clicks.pop_front();
                    }
                    self.recent_clicks.push_back(sample.timestamp);
                }
            }
            ActionType::RightClick => {
                if state == ControlState::Clicking && first_frame {
                    commands.push(PointerCommand::Click {
                        button: Button::Right,
                    });
                }
            }
            ActionType::MiddleClick => {
                if state == ControlState::Clicking && first_frame {
                    commands.push(PointerCommand::Click {
                        button: Button::Middle,
                    });
                }
            }
            ActionType::LeftHold => {
                if state == ControlState::Dragging {
                    if !self.button_down {
                        commands.push(PointerCommand::ButtonDown {
                            button: Button::Left,
                        });
                        self.button_down = true;
                    }
                    commands.extend(move_to);
                }
            }
            ActionType::LeftDoubleClick => {
                // Both halves already went out as clicks; the OS pairs them
                if !self.pair_already_sent(sample.timestamp) {
                    commands.push(PointerCommand::DoubleClick {
                        button: Button::Left,
                    });
                }
                self.recent_clicks.clear();
            }
            ActionType::ScrollUp => {
                if state == ControlState::Scrolling {
                    commands.push(PointerCommand::Scroll {
                        amount: self.scroll_speed,
                        axis: ScrollAxis::Vertical,
                    });
                }
            }
            ActionType::ScrollDown => {
                if state == ControlState::Scrolling {
                    commands.push(PointerCommand::Scroll {
                        amount: -self.scroll_speed,
                        axis: ScrollAxis::Vertical,
                    });
                }
            }
            ActionType::ScrollMode | ActionType::TogglePause | ActionType::None => {}
        }

        commands
    }

    fn pair_already_sent(&self, now: f64) -> bool {
        self.recent_clicks.len() == 2
            && self
                .recent_clicks
                .front()
                .is_some_and(|first| now - first <= self.double_click_window)
    }

    /// Forget the held button without emitting a release
    pub fn reset(&mut self) {
        self.button_down = false;
        self.recent_clicks.clear();
    }

    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionMap {
        &mut self.actions
    }

    pub fn scroll_speed(&self) -> i32 {
        self.scroll_speed
    }

    pub fn set_scroll_speed(&mut self, speed: i32) {
        self.scroll_speed = speed;
    }

    pub fn set_double_click_window(&mut self, seconds: f64) {
        self.double_click_window = seconds;
    }
}

impl Default for ActionPlanner {
    fn default() -> Self {
        Self::new(ActionMap::default(), DEFAULT_SCROLL_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestures::GestureType;

    fn sample(gesture: GestureType, frames: u32) -> GestureSample {
        GestureSample {
            gesture,
            frames,
            ..GestureSample::default()
        }
    }

    #[test]
    fn test_move_only_in_pointing_or_dragging() {
        let mut planner = ActionPlanner::default();
        let s = sample(GestureType::Pointer, 4);

        assert_eq!(
            planner.plan(ControlState::Pointing, Some(&s), Some((10, 20))),
            vec![PointerCommand::MoveTo { x: 10, y: 20 }]
        );
        assert!(planner.plan(ControlState::Idle, Some(&s), Some((10, 20))).is_empty());
        assert!(
            planner.plan(ControlState::Pointing, Some(&s), None).is_empty(),
            "no move without a mapped position"
        );
    }

    #[test]
    fn test_click_is_edge_triggered() {
        let mut planner = ActionPlanner::default();

        let first = planner.plan(ControlState::Clicking, Some(&sample(GestureType::Click, 1)), None);
        let second = planner.plan(ControlState::Clicking, Some(&sample(GestureType::Click, 2)), None);
        let right = planner.plan(
            ControlState::Clicking,
            Some(&sample(GestureType::RightClick, 1)),
            None,
        );

        assert_eq!(first, vec![PointerCommand::Click { button: Button::Left }]);
        assert!(second.is_empty());
        assert_eq!(right, vec![PointerCommand::Click { button: Button::Right }]);
    }

    #[test]
    fn test_drag_press_move_release() {
        let mut planner = ActionPlanner::default();
        let hold = sample(GestureType::ClickHold, 4);

        let first = planner.plan(ControlState::Dragging, Some(&hold), Some((1, 1)));
        let second = planner.plan(ControlState::Dragging, Some(&hold), Some((2, 2)));
        let release = planner.plan(
            ControlState::Pointing,
            Some(&sample(GestureType::Pointer, 1)),
            Some((3, 3)),
        );

        assert_eq!(
            first,
            vec![
                PointerCommand::ButtonDown { button: Button::Left },
                PointerCommand::MoveTo { x: 1, y: 1 },
            ]
        );
        assert_eq!(second, vec![PointerCommand::MoveTo { x: 2, y: 2 }]);
        assert_eq!(
            release,
            vec![
                PointerCommand::ButtonUp { button: Button::Left },
                PointerCommand::MoveTo { x: 3, y: 3 },
            ]
        );
        assert!(!planner.is_button_down());
    }

    #[test]
    fn test_hand_lost_releases_button() {
        let mut planner = ActionPlanner::default();
        planner.plan(ControlState::Dragging, Some(&sample(GestureType::ClickHold, 5)), None);
        assert!(planner.is_button_down());

        assert_eq!(
            planner.plan(ControlState::Idle, None, None),
            vec![PointerCommand::ButtonUp { button: Button::Left }]
        );
        assert!(planner.plan(ControlState::Idle, None, None).is_empty());
    }

    #[test]
    fn test_scroll_direction_and_speed() {
        let mut planner = ActionPlanner::new(ActionMap::default(), 8);

        let up = planner.plan(ControlState::Scrolling, Some(&sample(GestureType::ScrollUp, 1)), None);
        let down = planner.plan(ControlState::Scrolling, Some(&sample(GestureType::ScrollDown, 1)), None);
        let idle = planner.plan(ControlState::Scrolling, Some(&sample(GestureType::Scroll, 3)), None);

        assert_eq!(up, vec![PointerCommand::Scroll { amount: 8, axis: ScrollAxis::Vertical }]);
        assert_eq!(down, vec![PointerCommand::Scroll { amount: -8, axis: ScrollAxis::Vertical }]);
        assert!(idle.is_empty());
    }

    #[test]
    fn test_paused_is_silent() {
        let mut planner = ActionPlanner::default();
        for gesture in GestureType::ALL {
            let commands = planner.plan(ControlState::Paused, Some(&sample(gesture, 1)), Some((5, 5)));
            assert!(commands.is_empty(), "{} produced {:?}", gesture, commands);
        }
    }

    fn at(gesture: GestureType, frames: u32, timestamp: f64) -> GestureSample {
        GestureSample {
            timestamp,
            ..sample(gesture, frames)
        }
    }

    #[test]
    fn test_double_click_completes_sent_pair() {
        let mut planner = ActionPlanner::default();
        let click = PointerCommand::Click { button: Button::Left };

        assert_eq!(
            planner.plan(ControlState::Clicking, Some(&at(GestureType::Click, 1, 0.0)), None),
            vec![click]
        );
        assert_eq!(
            planner.plan(ControlState::Clicking, Some(&at(GestureType::Click, 1, 0.2)), None),
            vec![click]
        );
        assert!(planner
            .plan(ControlState::Pointing, Some(&at(GestureType::DoubleClick, 1, 0.3)), None)
            .is_empty());
    }

    #[test]
    fn test_double_click_without_sent_pair() {
        let mut planner = ActionPlanner::default();
        let double = vec![PointerCommand::DoubleClick { button: Button::Left }];

        assert_eq!(
            planner.plan(ControlState::Pointing, Some(&at(GestureType::DoubleClick, 1, 1.0)), None),
            double
        );

        // A stale pair does not count
        planner.plan(ControlState::Clicking, Some(&at(GestureType::Click, 1, 2.0)), None);
        planner.plan(ControlState::Clicking, Some(&at(GestureType::Click, 1, 2.2)), None);
        assert_eq!(
            planner.plan(ControlState::Pointing, Some(&at(GestureType::DoubleClick, 1, 3.0)), None),
            double
        );
    }

    #[test]
    fn test_rebound_click_goes_right() {
        let mut planner = ActionPlanner::default();
        planner.actions_mut().set(GestureType::Click, ActionType::RightClick);

        let commands = planner.plan(ControlState::Clicking, Some(&sample(GestureType::Click, 1)), None);
        assert_eq!(commands, vec![PointerCommand::Click { button: Button::Right }]);
    }

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_value(PointerCommand::Scroll {
            amount: -5,
            axis: ScrollAxis::Vertical,
        })
        .unwrap();
        assert_eq!(json["type"], "scroll");
        assert_eq!(json["axis"], "vertical");
        assert_eq!(json["amount"], -5);
    }
}

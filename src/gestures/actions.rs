//! Gesture to action mapping
//!
//! The table is mutable so gestures can be re-bound at runtime
//! (e.g. swapping left and right click).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gestures::types::GestureType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    None,
    MoveCursor,
    LeftClick,
    LeftDoubleClick,
    LeftHold,
    RightClick,
    MiddleClick,
    ScrollMode,
    ScrollUp,
    ScrollDown,
    TogglePause,
}

fn default_bindings() -> HashMap<GestureType, ActionType> {
    HashMap::from([
        (GestureType::Pointer, ActionType::MoveCursor),
        (GestureType::Click, ActionType::LeftClick),
        (GestureType::ClickHold, ActionType::LeftHold),
        (GestureType::DoubleClick, ActionType::LeftDoubleClick),
        (GestureType::RightClick, ActionType::RightClick),
        (GestureType::Scroll, ActionType::ScrollMode),
        (GestureType::ScrollUp, ActionType::ScrollUp),
        (GestureType::ScrollDown, ActionType::ScrollDown),
        (GestureType::Palm, ActionType::TogglePause),
        (GestureType::Fist, ActionType::None),
        (GestureType::None, ActionType::None),
    ])
}

#[derive(Debug, Clone)]
pub struct ActionMap {
    bindings: HashMap<GestureType, ActionType>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self {
            bindings: default_bindings(),
        }
    }

    /// Unbound gestures map to `ActionType::None`
    pub fn get(&self, gesture: GestureType) -> ActionType {
        self.bindings
            .get(&gesture)
            .copied()
            .unwrap_or(ActionType::None)
    }

    pub fn set(&mut self, gesture: GestureType, action: ActionType) {
        tracing::debug!("Binding gesture {} to {:?}", gesture, action);
        self.bindings.insert(gesture, action);
    }

    pub fn remove(&mut self, gesture: GestureType) -> Option<ActionType> {
        self.bindings.remove(&gesture)
    }

    pub fn reset_to_defaults(&mut self) {
        self.bindings = default_bindings();
    }

    pub fn bindings(&self) -> &HashMap<GestureType, ActionType> {
        &self.bindings
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::new()
    }
}

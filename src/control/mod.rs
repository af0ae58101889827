//! Control layer
//!
//! Session state tracking and planning of pointer commands.

pub mod commands;
pub mod state_machine;

pub use commands::{ActionPlanner, Button, PointerCommand, PointerDriver, ScrollAxis};
pub use state_machine::{
    CallbackId, ControlState, ControlStateMachine, StateChange, StateSnapshot, Transition,
    TransitionTable,
};

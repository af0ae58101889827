//! Session-level control state machine
//!
//! Tracks which interaction mode the session is in. Transitions are looked up
//! in a mutable `(state, gesture) → state` table; a missing entry leaves the
//! state unchanged.
//!
//! On every real transition the machine runs, in order: exit callbacks of the
//! old state, bookkeeping (previous state, entered-at, scratch data cleared),
//! enter callbacks of the new state, then general change subscribers. A
//! callback that fails or panics is logged and skipped; the rest still run.

use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::gestures::GestureType;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlState {
    Idle,
    Pointing,
    Clicking,
    Dragging,
    Scrolling,
    Paused,
    /// Reserved for a calibration flow driven outside the core
    Calibrating,
    /// Reserved for a tutorial flow driven outside the core
    Tutorial,
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlState::Idle => write!(f, "idle"),
            ControlState::Pointing => write!(f, "pointing"),
            ControlState::Clicking => write!(f, "clicking"),
            ControlState::Dragging => write!(f, "dragging"),
            ControlState::Scrolling => write!(f, "scrolling"),
            ControlState::Paused => write!(f, "paused"),
            ControlState::Calibrating => write!(f, "calibrating"),
            ControlState::Tutorial => write!(f, "tutorial"),
        }
    }
}

/// Passed to every callback of a transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    pub from: ControlState,
    pub to: ControlState,
    pub gesture: Option<GestureType>,
    pub at: f64,
}

pub type StateCallback = Box<dyn FnMut(&StateChange) -> anyhow::Result<()> + Send>;

/// Handle returned on registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Diagnostic record of a state that was left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub state: ControlState,
    pub entered_at: f64,
    pub previous_state: Option<ControlState>,
    pub gesture: Option<GestureType>,
    pub data: HashMap<String, serde_json::Value>,
}

/// Result of submitting a gesture or forcing a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from: ControlState,
    pub to: ControlState,
    /// Callbacks that returned an error or panicked
    pub callback_failures: usize,
}

impl Transition {
    pub fn unchanged(state: ControlState) -> Self {
        Self {
            from: state,
            to: state,
            callback_failures: 0,
        }
    }

    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    entries: HashMap<(ControlState, GestureType), ControlState>,
}

impl TransitionTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, from: ControlState, gesture: GestureType) -> Option<ControlState> {
        self.entries.get(&(from, gesture)).copied()
    }

    /// Add or override an entry
    pub fn set(&mut self, from: ControlState, gesture: GestureType, to: ControlState) {
        self.entries.insert((from, gesture), to);
    }

    pub fn remove(&mut self, from: ControlState, gesture: GestureType) -> Option<ControlState> {
        self.entries.remove(&(from, gesture))
    }

    pub fn from_state(&self, from: ControlState) -> Vec<(GestureType, ControlState)> {
        self.entries
            .iter()
            .filter(|((state, _), _)| *state == from)
            .map(|((_, gesture), to)| (*gesture, *to))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        use ControlState::*;
        use GestureType as G;

        let mut table = Self::empty();

        for scroll in [G::Scroll, G::ScrollUp, G::ScrollDown] {
            table.set(Idle, scroll, Scrolling);
            table.set(Pointing, scroll, Scrolling);
        }
        table.set(Idle, G::Pointer, Pointing);
        table.set(Idle, G::Palm, Paused);

        table.set(Pointing, G::Click, Clicking);
        table.set(Pointing, G::RightClick, Clicking);
        table.set(Pointing, G::Fist, Idle);
        table.set(Pointing, G::None, Idle);
        table.set(Pointing, G::Palm, Paused);

        table.set(Clicking, G::ClickHold, Dragging);
        table.set(Clicking, G::Pointer, Pointing);
        table.set(Clicking, G::None, Idle);
        table.set(Clicking, G::Fist, Idle);
        // Release frames that pair a double click
        table.set(Clicking, G::DoubleClick, Pointing);

        table.set(Dragging, G::Pointer, Pointing);
        table.set(Dragging, G::None, Idle);
        table.set(Dragging, G::Fist, Idle);
        table.set(Dragging, G::DoubleClick, Pointing);

        table.set(Scrolling, G::Pointer, Pointing);
        table.set(Scrolling, G::None, Idle);
        table.set(Scrolling, G::Fist, Idle);
        table.set(Scrolling, G::Palm, Paused);

        table.set(Paused, G::Palm, Idle);
        table.set(Paused, G::Pointer, Pointing);
        table.set(Paused, G::Fist, Idle);

        table
    }
}

pub struct ControlStateMachine {
    state: ControlState,
    previous_state: Option<ControlState>,
    entered_at: f64,
    current_gesture: Option<GestureType>,
    data: HashMap<String, serde_json::Value>,

    table: TransitionTable,

    on_exit: HashMap<ControlState, Vec<(CallbackId, StateCallback)>>,
    on_enter: HashMap<ControlState, Vec<(CallbackId, StateCallback)>>,
    on_change: Vec<(CallbackId, StateCallback)>,
    next_callback_id: u64,

    history: VecDeque<StateSnapshot>,
    history_capacity: usize,
}

impl ControlStateMachine {
    pub fn new(initial: ControlState, now: f64) -> Self {
        Self {
            state: initial,
            previous_state: None,
            entered_at: now,
            current_gesture: None,
            data: HashMap::new(),
            table: TransitionTable::default(),
            on_exit: HashMap::new(),
            on_enter: HashMap::new(),
            on_change: Vec::new(),
            next_callback_id: 0,
            history: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        while self.history.len() > capacity {
            self.history.pop_front();
        }
        self
    }

    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Look up `(state, gesture)` and transition if an entry exists
    pub fn process_gesture(&mut self, gesture: GestureType, now: f64) -> Transition {
        self.current_gesture = Some(gesture);

        match self.table.get(self.state, gesture) {
            Some(next) => self.transition_to(next, Some(gesture), now),
            None => Transition::unchanged(self.state),
        }
    }

    /// Move to `state` without consulting the table
    pub fn force_state(
        &mut self,
        state: ControlState,
        gesture: Option<GestureType>,
        now: f64,
    ) -> Transition {
        self.transition_to(state, gesture, now)
    }

    fn transition_to(
        &mut self,
        next: ControlState,
        gesture: Option<GestureType>,
        now: f64,
    ) -> Transition {
        let from = self.state;
        if from == next {
            return Transition::unchanged(from);
        }

        self.record_history();

        let change = StateChange {
            from,
            to: next,
            gesture,
            at: now,
        };
        let mut failures = 0;

        if let Some(callbacks) = self.on_exit.get_mut(&from) {
            failures += fire(callbacks, &change, "exit");
        }

        self.previous_state = Some(from);
        self.state = next;
        self.entered_at = now;
        self.data.clear();

        if let Some(callbacks) = self.on_enter.get_mut(&next) {
            failures += fire(callbacks, &change, "enter");
        }
        failures += fire(&mut self.on_change, &change, "change");

        tracing::debug!(
            "Control state {} -> {} (gesture={:?}, failed callbacks={})",
            from,
            next,
            gesture,
            failures
        );

        Transition {
            from,
            to: next,
            callback_failures: failures,
        }
    }

    fn record_history(&mut self) {
        if self.history_capacity == 0 {
            return;
        }
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(self.snapshot());
    }

    /// Return to `initial` without firing callbacks or recording history
    pub fn reset(&mut self, initial: ControlState, now: f64) {
        self.previous_state = Some(self.state);
        self.state = initial;
        self.entered_at = now;
        self.current_gesture = None;
        self.data.clear();
    }

    fn next_id(&mut self) -> CallbackId {
        self.next_callback_id += 1;
        CallbackId(self.next_callback_id)
    }

    pub fn on_state_change<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut(&StateChange) -> anyhow::Result<()> + Send + 'static,
    {
        let id = self.next_id();
        self.on_change.push((id, Box::new(callback)));
        id
    }

    pub fn on_enter<F>(&mut self, state: ControlState, callback: F) -> CallbackId
    where
        F: FnMut(&StateChange) -> anyhow::Result<()> + Send + 'static,
    {
        let id = self.next_id();
        self.on_enter
            .entry(state)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    pub fn on_exit<F>(&mut self, state: ControlState, callback: F) -> CallbackId
    where
        F: FnMut(&StateChange) -> anyhow::Result<()> + Send + 'static,
    {
        let id = self.next_id();
        self.on_exit
            .entry(state)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Unsubscribe a callback registered with any of the `on_*` methods
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callback_count();

        self.on_change.retain(|(cid, _)| *cid != id);
        for list in self.on_enter.values_mut().chain(self.on_exit.values_mut()) {
            list.retain(|(cid, _)| *cid != id);
        }

        self.callback_count() < before
    }

    fn callback_count(&self) -> usize {
        self.on_change.len()
            + self.on_enter.values().map(Vec::len).sum::<usize>()
            + self.on_exit.values().map(Vec::len).sum::<usize>()
    }

    pub fn set_transition(&mut self, from: ControlState, gesture: GestureType, to: ControlState) {
        self.table.set(from, gesture, to);
    }

    pub fn remove_transition(&mut self, from: ControlState, gesture: GestureType) -> Option<ControlState> {
        self.table.remove(from, gesture)
    }

    pub fn can_transition(&self, gesture: GestureType) -> bool {
        self.table.get(self.state, gesture).is_some()
    }

    pub fn possible_transitions(&self) -> Vec<(GestureType, ControlState)> {
        self.table.from_state(self.state)
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn previous_state(&self) -> Option<ControlState> {
        self.previous_state
    }

    pub fn entered_at(&self) -> f64 {
        self.entered_at
    }

    pub fn state_duration(&self, now: f64) -> f64 {
        (now - self.entered_at).max(0.0)
    }

    pub fn current_gesture(&self) -> Option<GestureType> {
        self.current_gesture
    }

    pub fn is_in_state(&self, states: &[ControlState]) -> bool {
        states.contains(&self.state)
    }

    /// Scratch data for the current state; cleared on every transition
    pub fn set_state_data(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    pub fn state_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.state,
            entered_at: self.entered_at,
            previous_state: self.previous_state,
            gesture: self.current_gesture,
            data: self.data.clone(),
        }
    }

    /// Up to `limit` most recent snapshots, oldest first
    pub fn history(&self, limit: usize) -> Vec<&StateSnapshot> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for ControlStateMachine {
    fn default() -> Self {
        Self::new(ControlState::Idle, 0.0)
    }
}

impl std::fmt::Debug for ControlStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlStateMachine")
            .field("state", &self.state)
            .field("previous_state", &self.previous_state)
            .field("entered_at", &self.entered_at)
            .field("current_gesture", &self.current_gesture)
            .field("transitions", &self.table.len())
            .field("history", &self.history.len())
            .finish()
    }
}

/// Run callbacks in registration order, isolating errors and panics
fn fire(callbacks: &mut [(CallbackId, StateCallback)], change: &StateChange, kind: &str) -> usize {
    let mut failures = 0;

    for (id, callback) in callbacks.iter_mut() {
        match panic::catch_unwind(AssertUnwindSafe(|| callback(change))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!(
                    "State {} callback {:?} failed on {} -> {}: {:#}",
                    kind,
                    id,
                    change.from,
                    change.to,
                    e
                );
            }
            Err(_) => {
                failures += 1;
                tracing::warn!(
                    "State {} callback {:?} panicked on {} -> {}",
                    kind,
                    id,
                    change.from,
                    change.to
                );
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, label: &'static str) -> impl FnMut(&StateChange) -> anyhow::Result<()> + Send + 'static {
        let log = log.clone();
        move |change: &StateChange| {
            log.lock().push(format!("{}:{}->{}", label, change.from, change.to));
            Ok(())
        }
    }

    #[test]
    fn test_pointer_from_idle_then_resubmit_is_noop() {
        let log: Log = Arc::default();
        let mut sm = ControlStateMachine::new(ControlState::Idle, 0.0);
        sm.on_exit(ControlState::Idle, recorder(&log, "exit"));
        sm.on_enter(ControlState::Pointing, recorder(&log, "enter"));
        sm.on_state_change(recorder(&log, "change"));

        let first = sm.process_gesture(GestureType::Pointer, 1.0);
        assert!(first.changed());
        assert_eq!(sm.state(), ControlState::Pointing);
        assert_eq!(sm.entered_at(), 1.0);

        let again = sm.process_gesture(GestureType::Pointer, 2.0);
        assert!(!again.changed());
        assert_eq!(sm.state(), ControlState::Pointing);
        assert_eq!(sm.entered_at(), 1.0, "self-transition must not reset entered_at");
        assert_eq!(sm.history(10).len(), 1);

        assert_eq!(
            *log.lock(),
            vec![
                "exit:idle->pointing".to_string(),
                "enter:idle->pointing".to_string(),
                "change:idle->pointing".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_entry_keeps_state() {
        let mut sm = ControlStateMachine::default();
        let t = sm.process_gesture(GestureType::ClickHold, 0.5);
        assert_eq!(t, Transition::unchanged(ControlState::Idle));
        assert_eq!(sm.current_gesture(), Some(GestureType::ClickHold));
        assert!(sm.history(10).is_empty());
    }

    #[test]
    fn test_double_click_release_returns_to_pointing() {
        for from in [ControlState::Clicking, ControlState::Dragging] {
            let mut sm = ControlStateMachine::new(from, 0.0);
            assert!(sm.can_transition(GestureType::DoubleClick));

            let t = sm.process_gesture(GestureType::DoubleClick, 1.0);
            assert_eq!((t.from, t.to), (from, ControlState::Pointing));
        }
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let log: Log = Arc::default();
        let mut sm = ControlStateMachine::default();
        for label in ["a", "b", "c"] {
            sm.on_state_change(recorder(&log, label));
        }

        sm.process_gesture(GestureType::Pointer, 0.1);
        let labels: Vec<String> = log.lock().iter().map(|e| e[..1].to_string()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failing_callbacks_are_isolated() {
        let log: Log = Arc::default();
        let mut sm = ControlStateMachine::default();

        sm.on_exit(ControlState::Idle, |_: &StateChange| anyhow::bail!("exit broke"));
        sm.on_enter(ControlState::Pointing, |_: &StateChange| -> anyhow::Result<()> {
            panic!("enter exploded")
        });
        sm.on_enter(ControlState::Pointing, recorder(&log, "enter"));
        sm.on_state_change(recorder(&log, "change"));

        let t = sm.process_gesture(GestureType::Pointer, 1.0);

        assert_eq!(t.callback_failures, 2);
        assert_eq!(sm.state(), ControlState::Pointing);
        assert_eq!(sm.previous_state(), Some(ControlState::Idle));
        assert_eq!(log.lock().len(), 2);

        // Machine keeps working afterwards
        let t = sm.process_gesture(GestureType::Click, 2.0);
        assert_eq!(t.to, ControlState::Clicking);
    }

    #[test]
    fn test_custom_transitions() {
        let mut sm = ControlStateMachine::default();
        sm.set_transition(ControlState::Idle, GestureType::Fist, ControlState::Calibrating);
        sm.remove_transition(ControlState::Idle, GestureType::Pointer);

        assert!(!sm.can_transition(GestureType::Pointer));
        assert_eq!(sm.process_gesture(GestureType::Pointer, 0.1).to, ControlState::Idle);
        assert_eq!(sm.process_gesture(GestureType::Fist, 0.2).to, ControlState::Calibrating);
    }

    #[test]
    fn test_force_state_bypasses_table() {
        let log: Log = Arc::default();
        let mut sm = ControlStateMachine::default();
        sm.on_state_change(recorder(&log, "change"));

        sm.process_gesture(GestureType::Pointer, 0.1);
        sm.process_gesture(GestureType::Click, 0.2);
        sm.process_gesture(GestureType::ClickHold, 0.3);
        assert_eq!(sm.state(), ControlState::Dragging);

        let t = sm.force_state(ControlState::Idle, None, 0.4);
        assert_eq!((t.from, t.to), (ControlState::Dragging, ControlState::Idle));

        let t = sm.force_state(ControlState::Idle, None, 0.5);
        assert!(!t.changed());
        assert_eq!(log.lock().len(), 4);
        assert_eq!(sm.entered_at(), 0.4);
    }

    #[test]
    fn test_scratch_data_cleared_on_transition() {
        let mut sm = ControlStateMachine::default();
        sm.set_state_data("anchor", serde_json::json!([0.5, 0.5]));
        sm.process_gesture(GestureType::Palm, 0.1);

        assert!(sm.state_data("anchor").is_none());
        let snapshot = sm.history(1)[0];
        assert_eq!(snapshot.state, ControlState::Idle);
        assert_eq!(snapshot.data["anchor"], serde_json::json!([0.5, 0.5]));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut sm = ControlStateMachine::default().with_history_capacity(3);
        // Palm toggles Idle <-> Paused, so every frame is a transition
        for i in 0..10 {
            sm.process_gesture(GestureType::Palm, i as f64);
        }

        let history = sm.history(50);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].entered_at, 6.0);
        assert_eq!(sm.history(1)[0].entered_at, 8.0);

        sm.clear_history();
        assert!(sm.history(50).is_empty());
    }

    #[test]
    fn test_remove_callback() {
        let log: Log = Arc::default();
        let mut sm = ControlStateMachine::default();
        let id = sm.on_enter(ControlState::Pointing, recorder(&log, "enter"));

        assert!(sm.remove_callback(id));
        assert!(!sm.remove_callback(id));

        sm.process_gesture(GestureType::Pointer, 0.1);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_reset_skips_callbacks() {
        let log: Log = Arc::default();
        let mut sm = ControlStateMachine::default();
        sm.process_gesture(GestureType::Pointer, 0.1);
        sm.on_state_change(recorder(&log, "change"));

        sm.reset(ControlState::Idle, 3.0);
        assert_eq!(sm.state(), ControlState::Idle);
        assert_eq!(sm.previous_state(), Some(ControlState::Pointing));
        assert_eq!(sm.current_gesture(), None);
        assert_eq!(sm.state_duration(4.5), 1.5);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_possible_transitions_from_idle() {
        let sm = ControlStateMachine::default();
        let mut targets: Vec<ControlState> =
            sm.possible_transitions().into_iter().map(|(_, to)| to).collect();
        targets.sort_by_key(|s| format!("{}", s));
        targets.dedup();

        assert_eq!(
            targets,
            vec![ControlState::Paused, ControlState::Pointing, ControlState::Scrolling]
        );
        assert!(sm.is_in_state(&[ControlState::Idle, ControlState::Paused]));
    }
}

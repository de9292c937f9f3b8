//! Session state store and loading gate.

use tracing::debug;

use super::state::{SessionState, Transition, transition};

/// One-shot flag that holds the UI in its loading view until the first
/// verdict is known. Never re-engages once released.
#[derive(Debug)]
pub struct LoadingGate {
    engaged: bool,
}

impl Default for LoadingGate {
    fn default() -> Self {
        Self { engaged: true }
    }
}

impl LoadingGate {
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Releases the gate. Returns true only for the call that released it.
    fn release(&mut self) -> bool {
        std::mem::replace(&mut self.engaged, false)
    }
}

/// Outcome of applying one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Applied {
    /// The visible state changed.
    pub changed: bool,
    /// This transition released the loading gate.
    pub released_gate: bool,
}

/// Holds the reconciled session state.
///
/// The only mutation path is [`SessionStateStore::apply`], which is private to
/// the crate; renderers get read access only.
#[derive(Debug, Default)]
pub struct SessionStateStore {
    state: SessionState,
    gate: LoadingGate,
}

impl SessionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> &SessionState {
        &self.state
    }

    /// True until the first verdict resolves.
    pub fn loading(&self) -> bool {
        self.gate.is_engaged()
    }

    pub(crate) fn apply(&mut self, input: &Transition) -> Applied {
        let next = transition(&self.state, input);
        let changed = next != self.state;
        if changed {
            debug!(from = %self.state, to = %next, "session transition");
            self.state = next;
        } else if input.is_probe() && !self.state.is_initializing() {
            debug!(state = %self.state, "stale probe ignored");
        }

        let released_gate = !self.state.is_initializing() && self.gate.release();
        Applied {
            changed,
            released_gate,
        }
    }
}

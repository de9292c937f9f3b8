//! Session state machine.
//!
//! `transition` is a pure function over (state, input); the store and the
//! event plumbing are layered on top of it.

use std::fmt;
use std::sync::Arc;

use crate::identity::{Identity, ProviderEvent};

/// Reconciled, UI-visible sign-in verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No verdict yet.
    #[default]
    Initializing,
    /// No valid identity.
    Unauthenticated,
    /// Signed in as the given account.
    Authenticated(Arc<Identity>),
}

impl SessionState {
    pub fn is_initializing(&self) -> bool {
        matches!(self, SessionState::Initializing)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Returns the active account, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Authenticated(identity) => {
                write!(f, "authenticated({})", identity.username)
            }
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Result of the startup account query.
    Probe { accounts: Vec<Arc<Identity>> },
    /// A provider event delivered through the subscription.
    Event(ProviderEvent),
}

impl Transition {
    /// Returns true if this input can only affect an `Initializing` state.
    pub fn is_probe(&self) -> bool {
        matches!(self, Transition::Probe { .. })
    }
}

/// Computes the next state.
///
/// A probe only resolves `Initializing`; once a verdict exists the probe is
/// stale and leaves the state alone. Only the first cached account is used.
pub fn transition(current: &SessionState, input: &Transition) -> SessionState {
    match (current, input) {
        (SessionState::Initializing, Transition::Probe { accounts }) => match accounts.first() {
            Some(account) => SessionState::Authenticated(Arc::clone(account)),
            None => SessionState::Unauthenticated,
        },
        (_, Transition::Probe { .. })
        | (_, Transition::Event(ProviderEvent::Other { .. })) => current.clone(),
        (_, Transition::Event(ProviderEvent::LoginSucceeded { account })) => {
            SessionState::Authenticated(Arc::clone(account))
        }
        (_, Transition::Event(ProviderEvent::LogoutSucceeded)) => SessionState::Unauthenticated,
    }
}

//! Login/logout initiation and failure reporting.
//!
//! Initiation is fire-and-forget: the state change, if any, arrives later as
//! a provider event. Failures go to a [`DiagnosticsSink`] and never touch the
//! session state.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use crate::identity::IdentityError;

/// Which redirect flow was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Logout,
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthAction::Login => write!(f, "login"),
            AuthAction::Logout => write!(f, "logout"),
        }
    }
}

/// A redirect flow that could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action} failed to start: {error}")]
pub struct InitiationFailure {
    pub action: AuthAction,
    #[source]
    pub error: IdentityError,
}

/// External collaborator receiving initiation failures.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, failure: InitiationFailure);
}

/// Logs failures and nothing else.
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, failure: InitiationFailure) {
        warn!(action = %failure.action, error = %failure.error, "redirect flow failed to start");
    }
}

/// Logs failures and forwards them to a channel (e.g. the TUI inbox).
#[derive(Debug)]
pub struct ChannelDiagnostics {
    tx: mpsc::UnboundedSender<InitiationFailure>,
}

impl ChannelDiagnostics {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InitiationFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DiagnosticsSink for ChannelDiagnostics {
    fn report(&self, failure: InitiationFailure) {
        TracingDiagnostics.report(failure.clone());
        let _ = self.tx.send(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let failure = InitiationFailure {
            action: AuthAction::Login,
            error: IdentityError::Network("connection reset".to_string()),
        };
        assert_eq!(
            failure.to_string(),
            "login failed to start: network error: connection reset"
        );
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelDiagnostics::new();
        sink.report(InitiationFailure {
            action: AuthAction::Logout,
            error: IdentityError::Cancelled,
        });

        let failure = rx.try_recv().unwrap();
        assert_eq!(failure.action, AuthAction::Logout);
        assert_eq!(failure.error, IdentityError::Cancelled);
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (sink, rx) = ChannelDiagnostics::new();
        drop(rx);
        sink.report(InitiationFailure {
            action: AuthAction::Login,
            error: IdentityError::Cancelled,
        });
    }
}

//! Session reconciliation.
//!
//! A [`Session`] is one mount: it owns the state store, the provider
//! subscription and the inbox the subscription feeds. Provider callbacks only
//! enqueue; [`Session::process_pending`] applies queued events on the caller's
//! loop, so store mutations are serialized without locks.
//!
//! Mount order is subscribe, then probe. An event queued before the probe
//! is applied after it; an event applied before the probe makes the probe
//! stale. Either way the loading gate opens exactly once.

mod bridge;
mod initiation;
mod probe;
mod state;
mod store;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use bridge::{EventBridge, ProviderEventReceiver, ProviderEventSender};
pub use initiation::{
    AuthAction, ChannelDiagnostics, DiagnosticsSink, InitiationFailure, TracingDiagnostics,
};
pub use probe::InitialProbe;
pub use state::{SessionState, Transition, transition};
pub use store::{Applied, LoadingGate, SessionStateStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::identity::{IdentityClient, IdentityError};

/// One mounted sign-in session.
pub struct Session {
    client: Arc<dyn IdentityClient>,
    store: SessionStateStore,
    bridge: EventBridge,
    inbox_rx: ProviderEventReceiver,
    diagnostics: Arc<dyn DiagnosticsSink>,
    /// Cancels in-flight initiations at unmount.
    cancel: CancellationToken,
}

impl Session {
    /// Mounts a session: subscribes to provider events, then probes cached
    /// accounts.
    ///
    /// If the subscription is refused the probe is skipped and the session
    /// stays `Initializing`; nothing retries it.
    pub fn mount(client: Arc<dyn IdentityClient>, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            bridge: EventBridge::new(Arc::clone(&client)),
            client,
            store: SessionStateStore::new(),
            inbox_rx,
            diagnostics,
            cancel: CancellationToken::new(),
        };

        if let Err(err) = session.bridge.start(inbox_tx) {
            error!(error = %err, "identity event subscription failed; session stays initializing");
            return session;
        }

        let applied = InitialProbe::run(session.client.as_ref(), &mut session.store);
        if applied.released_gate {
            info!(state = %session.store.current_state(), "initial verdict from probe");
        }
        session
    }

    pub fn current_state(&self) -> &SessionState {
        self.store.current_state()
    }

    pub fn loading(&self) -> bool {
        self.store.loading()
    }

    pub fn is_subscribed(&self) -> bool {
        self.bridge.is_active()
    }

    /// Applies every queued provider event in arrival order.
    ///
    /// Returns the number of visible state changes. After [`Session::unmount`]
    /// queued events are discarded without touching the store.
    pub fn process_pending(&mut self) -> usize {
        let mut changes = 0;
        while let Ok(event) = self.inbox_rx.try_recv() {
            let Some(input) = self.bridge.accept(event) else {
                continue;
            };
            let applied = self.store.apply(&input);
            if applied.released_gate {
                info!(state = %self.store.current_state(), "initial verdict from provider event");
            } else if applied.changed {
                info!(state = %self.store.current_state(), "session state changed");
            }
            if applied.changed {
                changes += 1;
            }
        }
        changes
    }

    /// Starts the login redirect flow. Does not change state.
    pub fn trigger_login(&self) {
        self.initiate(AuthAction::Login);
    }

    /// Starts the logout redirect flow. Does not change state.
    pub fn trigger_logout(&self) {
        self.initiate(AuthAction::Logout);
    }

    fn initiate(&self, action: AuthAction) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.diagnostics.report(InitiationFailure {
                action,
                error: IdentityError::Initiation {
                    reason: "no async runtime available".to_string(),
                },
            });
            return;
        };

        let flow = match action {
            AuthAction::Login => self.client.begin_login(),
            AuthAction::Logout => self.client.begin_logout(),
        };
        let diagnostics = Arc::clone(&self.diagnostics);
        let cancel = self.cancel.clone();
        info!(%action, "starting redirect flow");

        runtime.spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => return,
                result = flow => result,
            };
            if let Err(error) = result {
                diagnostics.report(InitiationFailure { action, error });
            }
        });
    }

    /// Tears the mount down: retracts the subscription and abandons
    /// in-flight initiations. Safe to call more than once.
    pub fn unmount(&mut self) {
        self.bridge.stop();
        self.cancel.cancel();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.unmount();
    }
}

//! Event bridge: identity provider callbacks → session inbox.
//!
//! The provider callback never touches the store. It only forwards events
//! into the session inbox, which is drained on the UI loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::state::Transition;
use crate::identity::{
    EventCallback, IdentityClient, IdentityError, ProviderEvent, SubscriptionHandle,
};

/// Sender half of the session inbox.
pub type ProviderEventSender = mpsc::UnboundedSender<ProviderEvent>;

/// Receiver half of the session inbox.
pub type ProviderEventReceiver = mpsc::UnboundedReceiver<ProviderEvent>;

struct Subscription {
    handle: SubscriptionHandle,
    /// Shared with the registered callback; cleared on stop.
    live: Arc<AtomicBool>,
}

/// Owns the single provider subscription of a mount.
pub struct EventBridge {
    client: Arc<dyn IdentityClient>,
    subscription: Option<Subscription>,
}

impl EventBridge {
    pub fn new(client: Arc<dyn IdentityClient>) -> Self {
        Self {
            client,
            subscription: None,
        }
    }

    /// Registers the forwarding callback with the identity client.
    ///
    /// A handle held from an earlier start is released first.
    ///
    /// # Errors
    /// Returns the client's error if it refuses the registration.
    pub fn start(&mut self, inbox: ProviderEventSender) -> Result<(), IdentityError> {
        self.stop();

        let live = Arc::new(AtomicBool::new(true));
        let callback_live = Arc::clone(&live);
        let callback: EventCallback = Box::new(move |event| {
            if !callback_live.load(Ordering::Acquire) {
                debug!(kind = event.kind(), "event for retracted subscription dropped");
                return;
            }
            // A closed inbox means the mount is gone.
            let _ = inbox.send(event);
        });

        let handle = self.client.subscribe(callback)?;
        info!(%handle, "subscribed to identity events");
        self.subscription = Some(Subscription { handle, live });
        Ok(())
    }

    /// Retracts the subscription. No-op if nothing is held.
    pub fn stop(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        subscription.live.store(false, Ordering::Release);
        info!(handle = %subscription.handle, "unsubscribed from identity events");
        self.client.unsubscribe(subscription.handle);
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Maps a queued provider event to a state transition.
    ///
    /// Returns `None` once the bridge is stopped (queued events must not
    /// reach the store after teardown) and for event kinds the session does
    /// not reconcile.
    pub(crate) fn accept(&self, event: ProviderEvent) -> Option<Transition> {
        if !self.is_active() {
            debug!(kind = event.kind(), "event after teardown discarded");
            return None;
        }
        match event {
            ProviderEvent::Other { kind } => {
                debug!(%kind, "provider event ignored");
                None
            }
            event @ (ProviderEvent::LoginSucceeded { .. } | ProviderEvent::LogoutSucceeded) => {
                Some(Transition::Event(event))
            }
        }
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

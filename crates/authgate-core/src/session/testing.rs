//! Scripted identity client for session tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::identity::{
    EventCallback, Identity, IdentityClient, IdentityError, ProviderEvent, SubscriptionHandle,
};

type SharedCallback = Arc<dyn Fn(ProviderEvent) + Send + Sync>;

pub(crate) struct ScriptedClient {
    accounts: Vec<Arc<Identity>>,
    active: Mutex<Vec<(u64, SharedCallback)>>,
    retired: Mutex<Vec<SharedCallback>>,
    next_id: AtomicU64,
    unsubscribes: AtomicUsize,
    reject_subscribe: bool,
    emit_on_subscribe: Option<ProviderEvent>,
    login_result: Result<(), IdentityError>,
    logout_result: Result<(), IdentityError>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Vec::new(),
            active: Mutex::new(Vec::new()),
            retired: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            unsubscribes: AtomicUsize::new(0),
            reject_subscribe: false,
            emit_on_subscribe: None,
            login_result: Ok(()),
            logout_result: Ok(()),
        }
    }

    pub(crate) fn with_account(mut self, username: &str) -> Self {
        self.accounts
            .push(Arc::new(Identity::new(format!("id-{username}"), username)));
        self
    }

    pub(crate) fn rejecting_subscriptions(mut self) -> Self {
        self.reject_subscribe = true;
        self
    }

    /// Delivers `event` from inside `subscribe`, before the probe runs.
    pub(crate) fn emitting_on_subscribe(mut self, event: ProviderEvent) -> Self {
        self.emit_on_subscribe = Some(event);
        self
    }

    pub(crate) fn failing_login(mut self, error: IdentityError) -> Self {
        self.login_result = Err(error);
        self
    }

    pub(crate) fn failing_logout(mut self, error: IdentityError) -> Self {
        self.logout_result = Err(error);
        self
    }

    pub(crate) fn emit(&self, event: &ProviderEvent) {
        let callbacks: Vec<SharedCallback> = self
            .active
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }

    /// Fires callbacks that were already unsubscribed (a misbehaving provider).
    pub(crate) fn emit_to_retired(&self, event: &ProviderEvent) {
        let callbacks: Vec<SharedCallback> =
            self.retired.lock().unwrap().iter().map(Arc::clone).collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }

    pub(crate) fn active_subscriptions(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    pub(crate) fn unsubscribe_calls(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

impl IdentityClient for ScriptedClient {
    fn accounts(&self) -> Vec<Arc<Identity>> {
        self.accounts.clone()
    }

    fn subscribe(&self, callback: EventCallback) -> Result<SubscriptionHandle, IdentityError> {
        if self.reject_subscribe {
            return Err(IdentityError::SubscribeRejected(
                "scripted rejection".to_string(),
            ));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let callback: SharedCallback = Arc::from(callback);
        if let Some(event) = &self.emit_on_subscribe {
            callback(event.clone());
        }
        self.active.lock().unwrap().push((id, callback));
        Ok(SubscriptionHandle::new(id))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        let mut active = self.active.lock().unwrap();
        if let Some(pos) = active.iter().position(|(id, _)| *id == handle.id()) {
            let (_, callback) = active.remove(pos);
            self.retired.lock().unwrap().push(callback);
        }
    }

    fn begin_login(&self) -> BoxFuture<'static, Result<(), IdentityError>> {
        futures_util::future::ready(self.login_result.clone()).boxed()
    }

    fn begin_logout(&self) -> BoxFuture<'static, Result<(), IdentityError>> {
        futures_util::future::ready(self.logout_result.clone()).boxed()
    }
}

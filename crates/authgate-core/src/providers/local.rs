//! In-process identity client.
//!
//! Keeps the account cache in memory and simulates the provider's redirect
//! round-trip with a timer. There is no token exchange and nothing is
//! persisted; it exists so the session core can run end to end without a
//! live provider.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, info};

use crate::config::Config;
use crate::identity::{
    EventCallback, Identity, IdentityClient, IdentityError, ProviderEvent, SubscriptionHandle,
};

const LOGIN_START: &str = "loginStart";
const LOGOUT_START: &str = "logoutStart";

/// Behaviour of the local client.
#[derive(Debug, Clone, Default)]
pub struct LocalOptions {
    /// Usernames already cached at startup.
    pub accounts: Vec<String>,
    /// Account produced by a simulated login. `None` makes login fail.
    pub login_as: Option<String>,
    /// Simulated provider round-trip.
    pub redirect_delay: Duration,
    /// Authority the simulated redirect targets.
    pub authority: String,
    /// Where the simulated redirect returns to.
    pub redirect_uri: String,
}

impl From<&Config> for LocalOptions {
    fn from(config: &Config) -> Self {
        let local = &config.local;
        Self {
            accounts: local.accounts.clone(),
            login_as: local.login_as.clone().filter(|s| !s.trim().is_empty()),
            redirect_delay: Duration::from_millis(local.redirect_delay_ms),
            authority: config.identity.authority.clone(),
            redirect_uri: config.identity.redirect_uri.clone(),
        }
    }
}

type SharedCallback = Arc<dyn Fn(ProviderEvent) + Send + Sync>;

struct Inner {
    accounts: Mutex<Vec<Arc<Identity>>>,
    subscribers: Mutex<BTreeMap<u64, SharedCallback>>,
    next_id: AtomicU64,
    login_as: Option<String>,
    redirect_delay: Duration,
    authority: String,
    redirect_uri: String,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn local_identity(username: &str) -> Arc<Identity> {
    Arc::new(Identity::new(format!("local.{username}"), username))
}

impl Inner {
    fn dispatch(&self, event: &ProviderEvent) {
        // Snapshot so callbacks may (un)subscribe without deadlocking.
        let callbacks: Vec<SharedCallback> = lock(&self.subscribers).values().cloned().collect();
        debug!(
            kind = event.kind(),
            subscribers = callbacks.len(),
            "dispatching provider event"
        );
        for callback in callbacks {
            callback(event.clone());
        }
    }

    fn cache_account(&self, username: &str) -> Arc<Identity> {
        let mut accounts = lock(&self.accounts);
        if let Some(existing) = accounts.iter().find(|a| a.username == username) {
            return Arc::clone(existing);
        }
        let account = local_identity(username);
        accounts.push(Arc::clone(&account));
        account
    }
}

/// Identity client backed by an in-memory account cache.
#[derive(Clone)]
pub struct LocalIdentityClient {
    inner: Arc<Inner>,
}

impl LocalIdentityClient {
    pub fn new(options: LocalOptions) -> Self {
        let accounts = options
            .accounts
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| local_identity(name))
            .collect();
        Self {
            inner: Arc::new(Inner {
                accounts: Mutex::new(accounts),
                subscribers: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
                login_as: options.login_as,
                redirect_delay: options.redirect_delay,
                authority: options.authority,
                redirect_uri: options.redirect_uri,
            }),
        }
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }
}

impl IdentityClient for LocalIdentityClient {
    fn accounts(&self) -> Vec<Arc<Identity>> {
        lock(&self.inner.accounts).clone()
    }

    fn subscribe(&self, callback: EventCallback) -> Result<SubscriptionHandle, IdentityError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).insert(id, Arc::from(callback));
        Ok(SubscriptionHandle::new(id))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if lock(&self.inner.subscribers).remove(&handle.id()).is_none() {
            debug!(%handle, "unsubscribe for unknown handle ignored");
        }
    }

    fn begin_login(&self) -> BoxFuture<'static, Result<(), IdentityError>> {
        let inner = Arc::clone(&self.inner);
        async move {
            let Some(username) = inner.login_as.clone() else {
                return Err(IdentityError::Initiation {
                    reason: format!(
                        "no login account configured for {} ([local].login_as)",
                        inner.authority
                    ),
                });
            };
            info!(
                authority = %inner.authority,
                redirect_uri = %inner.redirect_uri,
                "simulating login redirect"
            );
            inner.dispatch(&ProviderEvent::Other {
                kind: LOGIN_START.to_string(),
            });
            tokio::time::sleep(inner.redirect_delay).await;
            let account = inner.cache_account(&username);
            inner.dispatch(&ProviderEvent::LoginSucceeded { account });
            Ok(())
        }
        .boxed()
    }

    fn begin_logout(&self) -> BoxFuture<'static, Result<(), IdentityError>> {
        let inner = Arc::clone(&self.inner);
        async move {
            info!(
                authority = %inner.authority,
                redirect_uri = %inner.redirect_uri,
                "simulating logout redirect"
            );
            inner.dispatch(&ProviderEvent::Other {
                kind: LOGOUT_START.to_string(),
            });
            tokio::time::sleep(inner.redirect_delay).await;
            lock(&inner.accounts).clear();
            inner.dispatch(&ProviderEvent::LogoutSucceeded);
            Ok(())
        }
        .boxed()
    }
}

//! Identity provider contract.
//!
//! The identity client is an external collaborator: it owns token acquisition,
//! the redirect flow and the account cache. This module only defines the
//! surface the session core consumes from it.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// A cached account as reported by the identity provider.
///
/// Owned by the client and handed out as `Arc<Identity>`; the session store
/// keeps a reference, never a copy.
#[derive(Debug, PartialEq, Eq)]
pub struct Identity {
    /// Opaque provider handle for the account.
    pub home_account_id: String,
    /// Human-readable account name (usually the sign-in address).
    pub username: String,
}

impl Identity {
    pub fn new(home_account_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            home_account_id: home_account_id.into(),
            username: username.into(),
        }
    }
}

/// Events pushed by the identity provider to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A login flow completed for `account`.
    LoginSucceeded { account: Arc<Identity> },
    /// A logout flow completed.
    LogoutSucceeded,
    /// Any other provider event. Forwarded, never reconciled.
    Other { kind: String },
}

impl ProviderEvent {
    /// Short event name for logs.
    pub fn kind(&self) -> &str {
        match self {
            ProviderEvent::LoginSucceeded { .. } => "loginSuccess",
            ProviderEvent::LogoutSucceeded => "logoutSuccess",
            ProviderEvent::Other { kind } => kind,
        }
    }
}

/// Callback registered with [`IdentityClient::subscribe`].
pub type EventCallback = Box<dyn Fn(ProviderEvent) + Send + Sync>;

/// Token for one active registration with an identity client.
///
/// Deliberately not `Clone`: whoever holds it is the only one able to
/// unsubscribe, and unsubscribing consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Creates a handle. Called by client implementations only.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Errors reported by an identity client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The client refused to register an event callback.
    #[error("event subscription rejected: {0}")]
    SubscribeRejected(String),

    /// A login/logout redirect could not be started.
    #[error("could not start redirect flow: {reason}")]
    Initiation { reason: String },

    /// Network failure before the redirect was handed off.
    #[error("network error: {0}")]
    Network(String),

    /// The flow was abandoned before it reached the provider.
    #[error("cancelled")]
    Cancelled,
}

/// Surface consumed from the identity provider client.
///
/// Implementations must tolerate `unsubscribe` for handles that are unknown
/// or already released.
pub trait IdentityClient: Send + Sync {
    /// Returns the currently cached accounts. Empty is not an error.
    fn accounts(&self) -> Vec<Arc<Identity>>;

    /// Registers `callback` for provider events.
    ///
    /// # Errors
    /// Returns an error if the client cannot register the callback.
    fn subscribe(&self, callback: EventCallback) -> Result<SubscriptionHandle, IdentityError>;

    /// Releases a registration. Idempotent.
    fn unsubscribe(&self, handle: SubscriptionHandle);

    /// Starts the login redirect flow.
    fn begin_login(&self) -> BoxFuture<'static, Result<(), IdentityError>>;

    /// Starts the logout redirect flow.
    fn begin_logout(&self) -> BoxFuture<'static, Result<(), IdentityError>>;
}

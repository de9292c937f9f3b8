use tracing::info;

use super::state::Transition;
use super::store::{Applied, SessionStateStore};
use crate::identity::IdentityClient;

/// One-time read of the provider's cached accounts at mount.
///
/// Seeds the first verdict so the UI does not flash "signed out" before the
/// first provider event. Never retried.
pub struct InitialProbe;

impl InitialProbe {
    pub(crate) fn run(client: &dyn IdentityClient, store: &mut SessionStateStore) -> Applied {
        let accounts = client.accounts();
        info!(cached_accounts = accounts.len(), "initial account probe");
        store.apply(&Transition::Probe { accounts })
    }
}

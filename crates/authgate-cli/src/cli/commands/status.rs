//! `authgate status`: mount, probe, print, unmount.

use std::sync::Arc;

use anyhow::Result;
use authgate_core::identity::IdentityClient;
use authgate_core::session::{Session, SessionState, TracingDiagnostics};

pub fn run(client: Arc<dyn IdentityClient>) -> Result<()> {
    let mut session = Session::mount(client, Arc::new(TracingDiagnostics));
    session.process_pending();

    match session.current_state() {
        SessionState::Authenticated(identity) => println!("signed in as {}", identity.username),
        SessionState::Unauthenticated => println!("signed out"),
        SessionState::Initializing => println!("initializing"),
    }

    session.unmount();
    Ok(())
}

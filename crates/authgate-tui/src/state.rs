//! Application state for the TUI.
//!
//! ```text
//! AppState
//! ├── session: Session          (reconciled sign-in state, read-only here)
//! ├── provider_name: String     (button label)
//! ├── pending: Option<AuthAction> (redirect flow requested, no verdict yet)
//! ├── last_failure: Option<String>
//! ├── spinner_frame: usize
//! └── should_quit: bool
//! ```
//!
//! The session owns the verdict; everything else is presentation state.

use authgate_core::session::{AuthAction, Session, SessionState};

pub struct AppState {
    pub session: Session,
    /// Provider name shown on the sign-in button.
    pub provider_name: String,
    /// Redirect flow the user started and that has not produced an event yet.
    pub pending: Option<AuthAction>,
    /// Last initiation failure, cleared on the next action.
    pub last_failure: Option<String>,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(session: Session, provider_name: impl Into<String>) -> Self {
        Self {
            session,
            provider_name: provider_name.into(),
            pending: None,
            last_failure: None,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// The action the primary button performs right now, if any.
    pub fn available_action(&self) -> Option<AuthAction> {
        if self.session.loading() {
            return None;
        }
        match self.session.current_state() {
            SessionState::Initializing => None,
            SessionState::Unauthenticated => Some(AuthAction::Login),
            SessionState::Authenticated(_) => Some(AuthAction::Logout),
        }
    }
}

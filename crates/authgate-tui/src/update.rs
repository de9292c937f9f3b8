//! TUI reducer (update function).
//!
//! All presentation-state mutations happen here. The runtime calls
//! `update(app, event)` and executes the returned effects.

use authgate_core::session::AuthAction;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            if app.session.process_pending() > 0 {
                // The provider answered; whatever was pending is resolved.
                app.pending = None;
                app.last_failure = None;
            }
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::InitiationFailed(failure) => {
            if app.pending == Some(failure.action) {
                app.pending = None;
            }
            app.last_failure = Some(failure.to_string());
            vec![]
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => vec![UiEffect::Quit],
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Enter | KeyCode::Char(' ') => match app.available_action() {
            Some(action) => begin(app, action),
            None => vec![],
        },
        KeyCode::Char('l') => begin(app, AuthAction::Login),
        KeyCode::Char('o') => begin(app, AuthAction::Logout),
        _ => vec![],
    }
}

fn begin(app: &mut AppState, action: AuthAction) -> Vec<UiEffect> {
    if app.available_action() != Some(action) {
        debug!(%action, "action not available in current state");
        return vec![];
    }
    if app.pending.is_some() {
        debug!(%action, "redirect flow already pending");
        return vec![];
    }
    app.pending = Some(action);
    app.last_failure = None;
    match action {
        AuthAction::Login => vec![UiEffect::BeginLogin],
        AuthAction::Logout => vec![UiEffect::BeginLogout],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use authgate_core::identity::{
        EventCallback, Identity, IdentityClient, IdentityError, SubscriptionHandle,
    };
    use authgate_core::providers::{LocalIdentityClient, LocalOptions};
    use authgate_core::session::{InitiationFailure, Session, SessionState, TracingDiagnostics};

    use super::*;

    fn local_client(accounts: &[&str]) -> LocalIdentityClient {
        LocalIdentityClient::new(LocalOptions {
            accounts: accounts.iter().map(ToString::to_string).collect(),
            login_as: Some("bob@contoso.com".to_string()),
            redirect_delay: Duration::ZERO,
            ..LocalOptions::default()
        })
    }

    fn app_with(client: &LocalIdentityClient) -> AppState {
        let session = Session::mount(Arc::new(client.clone()), Arc::new(TracingDiagnostics));
        AppState::new(session, "Microsoft")
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    /// Refuses every subscription, so the session never leaves loading.
    struct StalledClient;

    impl IdentityClient for StalledClient {
        fn accounts(&self) -> Vec<Arc<Identity>> {
            Vec::new()
        }

        fn subscribe(&self, _callback: EventCallback) -> Result<SubscriptionHandle, IdentityError> {
            Err(IdentityError::SubscribeRejected("offline".to_string()))
        }

        fn unsubscribe(&self, _handle: SubscriptionHandle) {}

        fn begin_login(
            &self,
        ) -> futures_util::future::BoxFuture<'static, Result<(), IdentityError>> {
            unreachable!("login is never offered while loading")
        }

        fn begin_logout(
            &self,
        ) -> futures_util::future::BoxFuture<'static, Result<(), IdentityError>> {
            unreachable!("logout is never offered while loading")
        }
    }

    #[test]
    fn test_enter_logs_in_when_signed_out() {
        let client = local_client(&[]);
        let mut app = app_with(&client);

        let effects = update(&mut app, key(KeyCode::Enter));

        assert_eq!(effects, vec![UiEffect::BeginLogin]);
        assert_eq!(app.pending, Some(AuthAction::Login));
    }

    #[test]
    fn test_enter_logs_out_when_signed_in() {
        let client = local_client(&["alice@contoso.com"]);
        let mut app = app_with(&client);

        let effects = update(&mut app, key(KeyCode::Enter));

        assert_eq!(effects, vec![UiEffect::BeginLogout]);
    }

    #[test]
    fn test_logout_key_ignored_when_signed_out() {
        let client = local_client(&[]);
        let mut app = app_with(&client);

        assert!(update(&mut app, key(KeyCode::Char('o'))).is_empty());
        assert_eq!(app.pending, None);
    }

    #[test]
    fn test_second_request_while_pending_is_ignored() {
        let client = local_client(&[]);
        let mut app = app_with(&client);

        update(&mut app, key(KeyCode::Char('l')));
        let effects = update(&mut app, key(KeyCode::Char('l')));

        assert!(effects.is_empty());
    }

    #[test]
    fn test_no_action_while_loading() {
        let session = Session::mount(Arc::new(StalledClient), Arc::new(TracingDiagnostics));
        let mut app = AppState::new(session, "Microsoft");

        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert!(update(&mut app, key(KeyCode::Char('l'))).is_empty());
        assert_eq!(app.session.current_state(), &SessionState::Initializing);
    }

    #[test]
    fn test_quit_keys() {
        let client = local_client(&[]);
        let mut app = app_with(&client);

        assert_eq!(update(&mut app, key(KeyCode::Char('q'))), vec![UiEffect::Quit]);
        assert_eq!(update(&mut app, key(KeyCode::Esc)), vec![UiEffect::Quit]);
        let ctrl_c = UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(update(&mut app, ctrl_c), vec![UiEffect::Quit]);
    }

    #[test]
    fn test_initiation_failure_clears_pending_and_keeps_state() {
        let client = local_client(&[]);
        let mut app = app_with(&client);
        update(&mut app, key(KeyCode::Enter));

        update(
            &mut app,
            UiEvent::InitiationFailed(InitiationFailure {
                action: AuthAction::Login,
                error: IdentityError::Network("connection reset".to_string()),
            }),
        );

        assert_eq!(app.pending, None);
        assert_eq!(
            app.last_failure.as_deref(),
            Some("login failed to start: network error: connection reset")
        );
        assert_eq!(app.session.current_state(), &SessionState::Unauthenticated);
        assert!(!app.session.loading());
    }

    #[tokio::test]
    async fn test_tick_applies_provider_events() {
        let client = local_client(&[]);
        let mut app = app_with(&client);
        update(&mut app, key(KeyCode::Enter));

        client.begin_login().await.unwrap();
        update(&mut app, UiEvent::Tick);

        assert!(app.session.current_state().is_authenticated());
        assert_eq!(app.pending, None);
        assert_eq!(app.spinner_frame, 1);
    }
}

//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! The reducer stays pure and produces effects; this module executes them.
//! Initiation failures arrive through the diagnostics inbox and are turned
//! into `UiEvent::InitiationFailed` each frame.

use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use authgate_core::config::Config;
use authgate_core::identity::IdentityClient;
use authgate_core::session::{ChannelDiagnostics, InitiationFailure, Session};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::info;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while a verdict or redirect is outstanding.
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Tick cadence when nothing is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Full-screen TUI runtime.
///
/// Owns the terminal and the mounted session. The session is unmounted and
/// the terminal restored when the runtime is dropped.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    failures_rx: mpsc::UnboundedReceiver<InitiationFailure>,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Mounts a session against `client` and takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: &Config, client: Arc<dyn IdentityClient>) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (diagnostics, failures_rx) = ChannelDiagnostics::new();
        let session = Session::mount(client, Arc::new(diagnostics));
        info!(state = %session.current_state(), "session mounted");

        Ok(Self {
            terminal,
            state: AppState::new(session, config.identity.display_name.clone()),
            failures_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if polling or drawing the terminal fails.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.should_quit {
            if dirty {
                self.terminal
                    .draw(|frame| render::render(&self.state, frame))?;
            }

            let events = self.collect_events()?;
            dirty = !events.is_empty();
            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }
        }

        self.state.session.unmount();
        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        while let Ok(failure) = self.failures_rx.try_recv() {
            events.push(UiEvent::InitiationFailed(failure));
        }

        let needs_fast_poll = self.state.session.loading() || self.state.pending.is_some();
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            match effect {
                UiEffect::Quit => self.state.should_quit = true,
                UiEffect::BeginLogin => self.state.session.trigger_login(),
                UiEffect::BeginLogout => self.state.session.trigger_logout(),
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.state.session.unmount();
        let _ = terminal::restore_terminal();
    }
}

//! Full-screen sign-in TUI for authgate.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use anyhow::Result;
use authgate_core::config::Config;
use authgate_core::identity::IdentityClient;
pub use runtime::TuiRuntime;

/// Runs the interactive sign-in screen until the user quits.
///
/// Must be called with a tokio runtime entered; login/logout flows are
/// spawned onto it while this loop blocks the calling thread.
///
/// # Errors
/// Returns an error if no terminal is attached or the terminal fails.
pub fn run_interactive(config: &Config, client: Arc<dyn IdentityClient>) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The sign-in screen requires a terminal.\n\
             Use `authgate status` for non-interactive use."
        );
    }

    let mut runtime = TuiRuntime::new(config, client)?;
    runtime.run()
}

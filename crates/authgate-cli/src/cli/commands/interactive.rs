//! Interactive sign-in screen.

use std::sync::Arc;

use anyhow::Result;
use authgate_core::config::Config;
use authgate_core::identity::IdentityClient;

#[cfg(feature = "tui")]
pub fn run(config: &Config, client: Arc<dyn IdentityClient>) -> Result<()> {
    use anyhow::Context;

    // The TUI loop blocks this thread; redirect flows run on the runtime's
    // worker threads.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let _enter = runtime.enter();
    authgate_tui::run_interactive(config, client)
}

#[cfg(not(feature = "tui"))]
pub fn run(_config: &Config, _client: Arc<dyn IdentityClient>) -> Result<()> {
    anyhow::bail!("authgate was built without the `tui` feature; use `authgate status`")
}

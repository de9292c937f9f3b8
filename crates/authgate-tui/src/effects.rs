//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer never calls the identity client itself.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,
    /// Start the provider's login redirect flow.
    BeginLogin,
    /// Start the provider's logout redirect flow.
    BeginLogout,
}

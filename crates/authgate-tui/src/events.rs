//! UI events consumed by the reducer.

use authgate_core::session::InitiationFailure;
use crossterm::event::Event;

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick: advances the spinner and applies queued provider events.
    Tick,
    /// Raw terminal input.
    Terminal(Event),
    /// A login/logout redirect could not be started.
    InitiationFailed(InitiationFailure),
}

//! Core authgate library (session reconciliation, identity contract, config).

pub mod config;
pub mod identity;
pub mod logging;
pub mod providers;
pub mod session;

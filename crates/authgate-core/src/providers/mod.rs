//! Identity client implementations.

pub mod local;

pub use local::{LocalIdentityClient, LocalOptions};

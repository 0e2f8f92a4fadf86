//! Domain layer for the session guard.
//!
//! Presence signals, the idle-deadline state machine, and the collaborators
//! the expiry action talks to (credential storage, navigation, session
//! sinks), plus settings and shared error types. Nothing here depends on an
//! async runtime.

pub mod credential;
pub mod error;
pub mod formatting;
pub mod idle;
pub mod navigation;
pub mod settings;
pub mod signals;
pub mod sink;

pub use error::{GuardError, Result};

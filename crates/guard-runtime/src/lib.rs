//! Runtime layer for the session guard.
//!
//! Hosts the idle-deadline state machine on tokio, ties its lifecycle to the
//! stored credential, and drives the session-replaced countdown.

pub mod idle_monitor;
pub mod replaced_notice;
pub mod session_gate;

pub use guard_core as core;

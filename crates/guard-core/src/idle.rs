//! Idle-deadline state machine.
//!
//! [`IdleTracker`] holds the whole temporal logic of the session idle monitor
//! with time passed in explicitly, so it can be driven by a real timer in the
//! runtime crate or stepped by hand in tests.
//!
//! States: `Stopped` and `Active { deadline }`. A tracker carries at most one
//! deadline, and every path that reports an expiry leaves it `Stopped`, so a
//! single armed episode can expire at most once.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::signals::{Signal, Visibility};

/// Default idle threshold: three minutes.
pub const DEFAULT_IDLE_DURATION: Duration = Duration::from_secs(3 * 60);

// ── Public types ──────────────────────────────────────────────────────────────

/// Why the session was expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// The deadline elapsed with no activity.
    Idle,
    /// The view stayed in the background for at least the idle duration.
    Backgrounded,
}

impl fmt::Display for ExpiryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryReason::Idle => f.write_str("idle"),
            ExpiryReason::Backgrounded => f.write_str("backgrounded"),
        }
    }
}

/// Current state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Stopped,
    Active { deadline: Instant },
}

/// Outcome of feeding one input to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing observable changed.
    Unchanged,
    /// The deadline was (re)armed.
    Rearmed(Instant),
    /// The tracker stopped; the expiry action must run now.
    Expired(ExpiryReason),
}

// ── IdleTracker ───────────────────────────────────────────────────────────────

/// Pure idle/background bookkeeping for one session.
#[derive(Debug, Clone)]
pub struct IdleTracker {
    idle_duration: Duration,
    state: IdleState,
    hidden_since: Option<Instant>,
}

impl IdleTracker {
    /// Create a stopped tracker with the given idle threshold.
    pub fn new(idle_duration: Duration) -> Self {
        Self {
            idle_duration,
            state: IdleState::Stopped,
            hidden_since: None,
        }
    }

    pub fn idle_duration(&self) -> Duration {
        self.idle_duration
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, IdleState::Active { .. })
    }

    /// Deadline of the armed countdown, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            IdleState::Active { deadline } => Some(deadline),
            IdleState::Stopped => None,
        }
    }

    /// When the view was last hidden, if it has not come back yet.
    pub fn hidden_since(&self) -> Option<Instant> {
        self.hidden_since
    }

    /// Time left on the countdown at `now`; zero when stopped or overdue.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    // ── Inputs ────────────────────────────────────────────────────────────

    /// Begin (or restart) observation. Any previous deadline and hidden
    /// timestamp are discarded.
    pub fn start(&mut self, now: Instant) -> Instant {
        self.hidden_since = None;
        self.arm(now)
    }

    /// Stop observation. No expiry is reported afterwards until `start`.
    pub fn stop(&mut self) {
        self.state = IdleState::Stopped;
        self.hidden_since = None;
    }

    /// Dispatch a [`Signal`] observed at `now`.
    pub fn on_signal(&mut self, signal: Signal, now: Instant) -> Transition {
        match signal {
            Signal::Activity(_) => self.record_activity(now),
            Signal::VisibilityChanged(visibility) => self.visibility_changed(visibility, now),
        }
    }

    /// An activity signal pushes the deadline to `now + idle_duration`.
    pub fn record_activity(&mut self, now: Instant) -> Transition {
        if !self.is_active() {
            return Transition::Unchanged;
        }
        Transition::Rearmed(self.arm(now))
    }

    /// Handle a foreground/background transition.
    pub fn visibility_changed(&mut self, visibility: Visibility, now: Instant) -> Transition {
        if !self.is_active() {
            return Transition::Unchanged;
        }

        match visibility {
            Visibility::Hidden => {
                // Duplicate hidden events keep the start of the episode.
                self.hidden_since.get_or_insert(now);
                Transition::Unchanged
            }
            Visibility::Visible => {
                let Some(hidden_at) = self.hidden_since.take() else {
                    return Transition::Unchanged;
                };
                let hidden_for = now.saturating_duration_since(hidden_at);
                if hidden_for >= self.idle_duration {
                    self.stop();
                    Transition::Expired(ExpiryReason::Backgrounded)
                } else {
                    // Full fresh countdown, not the remainder.
                    Transition::Rearmed(self.arm(now))
                }
            }
        }
    }

    /// Report expiry if the deadline has passed at `now`.
    pub fn check_deadline(&mut self, now: Instant) -> Transition {
        match self.state {
            IdleState::Active { deadline } if now >= deadline => {
                self.stop();
                Transition::Expired(ExpiryReason::Idle)
            }
            _ => Transition::Unchanged,
        }
    }

    fn arm(&mut self, now: Instant) -> Instant {
        let deadline = now + self.idle_duration;
        self.state = IdleState::Active { deadline };
        deadline
    }
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_DURATION)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

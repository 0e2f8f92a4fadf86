//! Presence signals observed by the idle monitor.
//!
//! Hosts translate their native input events into [`Signal`] values. Only the
//! fixed set of [`ActivityKind`]s resets the idle countdown; everything else
//! is dropped at the host boundary.
//!
//! Hosts that report input by event name (a web view bridge, a recorded
//! event log) parse it with [`FromStr`]; unknown names fail with
//! [`GuardError::UnknownSignal`] and should be ignored:
//!
//! ```
//! use guard_core::signals::ActivityKind;
//!
//! assert_eq!("mousedown".parse::<ActivityKind>().ok(), Some(ActivityKind::PointerPress));
//! assert!("resize".parse::<ActivityKind>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

// ── ActivityKind ──────────────────────────────────────────────────────────────

/// User-input event kinds that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerPress,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
}

impl ActivityKind {
    /// Every activity kind, in the order hosts register them.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::PointerPress,
        ActivityKind::PointerMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
    ];

    /// The host event name this kind is registered under.
    pub fn event_name(self) -> &'static str {
        match self {
            ActivityKind::PointerPress => "mousedown",
            ActivityKind::PointerMove => "mousemove",
            ActivityKind::KeyPress => "keypress",
            ActivityKind::Scroll => "scroll",
            ActivityKind::TouchStart => "touchstart",
        }
    }
}

impl FromStr for ActivityKind {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.event_name() == s)
            .ok_or_else(|| GuardError::UnknownSignal(s.to_string()))
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

// ── Visibility ────────────────────────────────────────────────────────────────

/// Foreground/background state of the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Visible => f.write_str("visible"),
            Visibility::Hidden => f.write_str("hidden"),
        }
    }
}

// ── Signal ────────────────────────────────────────────────────────────────────

/// A single presence signal delivered to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The user interacted with the view.
    Activity(ActivityKind),
    /// The view moved to the foreground or background.
    VisibilityChanged(Visibility),
}

impl From<ActivityKind> for Signal {
    fn from(kind: ActivityKind) -> Self {
        Signal::Activity(kind)
    }
}

impl From<Visibility> for Signal {
    fn from(visibility: Visibility) -> Self {
        Signal::VisibilityChanged(visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_event_names() {
        assert_eq!(
            "mousedown".parse::<ActivityKind>().unwrap(),
            ActivityKind::PointerPress
        );
        assert_eq!(
            "mousemove".parse::<ActivityKind>().unwrap(),
            ActivityKind::PointerMove
        );
        assert_eq!(
            "keypress".parse::<ActivityKind>().unwrap(),
            ActivityKind::KeyPress
        );
        assert_eq!("scroll".parse::<ActivityKind>().unwrap(), ActivityKind::Scroll);
        assert_eq!(
            "touchstart".parse::<ActivityKind>().unwrap(),
            ActivityKind::TouchStart
        );
    }

    #[test]
    fn test_parse_unknown_event_name_is_rejected() {
        let err = "wheel".parse::<ActivityKind>().unwrap_err();
        assert!(matches!(err, GuardError::UnknownSignal(name) if name == "wheel"));
        // Names are matched exactly.
        assert!("MouseDown".parse::<ActivityKind>().is_err());
    }

    #[test]
    fn test_display_uses_event_name() {
        for kind in ActivityKind::ALL {
            assert_eq!(kind.to_string(), kind.event_name());
        }
        assert_eq!(Visibility::Hidden.to_string(), "hidden");
    }

    #[test]
    fn test_signal_from_conversions() {
        assert_eq!(
            Signal::from(ActivityKind::Scroll),
            Signal::Activity(ActivityKind::Scroll)
        );
        assert_eq!(
            Signal::from(Visibility::Visible),
            Signal::VisibilityChanged(Visibility::Visible)
        );
    }

    #[test]
    fn test_activity_kind_serde_snake_case() {
        let json = serde_json::to_string(&ActivityKind::TouchStart).unwrap();
        assert_eq!(json, "\"touch_start\"");
    }
}

//! View navigation.
//!
//! [`History`] is a shared, cloneable history stack. The expiry path uses
//! [`NavigationMode::Replace`] so the entry it lands on overwrites the view
//! the user was idling on.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{GuardError, Result};

/// Route of the sign-in view.
pub const LOGIN_ROUTE: &str = "/login";
/// Route of the authenticated landing view.
pub const HOME_ROUTE: &str = "/";

/// How a navigation affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Add a new entry after the current one.
    Push,
    /// Overwrite the current entry.
    Replace,
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationMode::Push => f.write_str("push"),
            NavigationMode::Replace => f.write_str("replace"),
        }
    }
}

/// Something that can move the host to another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str, mode: NavigationMode) -> Result<()>;

    /// The route currently displayed.
    fn current(&self) -> Result<String>;
}

// ── History ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct HistoryInner {
    entries: Vec<String>,
    index: usize,
}

/// In-memory browser-style history.
#[derive(Debug, Clone)]
pub struct History {
    inner: Arc<Mutex<HistoryInner>>,
}

impl History {
    /// History with a single entry at `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryInner {
                entries: vec![initial.into()],
                index: 0,
            })),
        }
    }

    /// Step back one entry, returning the route now displayed, or `None` at
    /// the start of history.
    pub fn back(&self) -> Result<Option<String>> {
        let mut inner = self.lock()?;
        if inner.index == 0 {
            return Ok(None);
        }
        inner.index -= 1;
        Ok(Some(inner.entries[inner.index].clone()))
    }

    /// All entries up to and including the current one.
    pub fn entries(&self) -> Result<Vec<String>> {
        let inner = self.lock()?;
        Ok(inner.entries[..=inner.index].to_vec())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HistoryInner>> {
        self.inner
            .lock()
            .map_err(|_| GuardError::Navigation("history lock poisoned".to_string()))
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HOME_ROUTE)
    }
}

impl Navigator for History {
    fn navigate(&self, route: &str, mode: NavigationMode) -> Result<()> {
        if route.is_empty() {
            return Err(GuardError::Navigation("empty route".to_string()));
        }

        let mut inner = self.lock()?;
        match mode {
            NavigationMode::Push => {
                let next = inner.index + 1;
                // Pushing discards any forward entries.
                inner.entries.truncate(next);
                inner.entries.push(route.to_string());
                inner.index = next;
            }
            NavigationMode::Replace => {
                let index = inner.index;
                inner.entries[index] = route.to_string();
            }
        }
        tracing::debug!(route, %mode, "navigated");
        Ok(())
    }

    fn current(&self) -> Result<String> {
        let inner = self.lock()?;
        Ok(inner.entries[inner.index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_back() {
        let history = History::new("/");
        history.navigate("/payments", NavigationMode::Push).unwrap();
        assert_eq!(history.current().unwrap(), "/payments");
        assert_eq!(history.back().unwrap().as_deref(), Some("/"));
        assert_eq!(history.back().unwrap(), None);
    }

    #[test]
    fn test_replace_overwrites_current_entry() {
        let history = History::new("/");
        history.navigate("/receipts", NavigationMode::Push).unwrap();
        history.navigate(LOGIN_ROUTE, NavigationMode::Replace).unwrap();

        assert_eq!(history.current().unwrap(), LOGIN_ROUTE);
        assert_eq!(history.entries().unwrap(), vec!["/", LOGIN_ROUTE]);
        // Going back skips the replaced view entirely.
        assert_eq!(history.back().unwrap().as_deref(), Some("/"));
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = History::new("/");
        history.navigate("/a", NavigationMode::Push).unwrap();
        history.navigate("/b", NavigationMode::Push).unwrap();
        history.back().unwrap();
        history.navigate("/c", NavigationMode::Push).unwrap();
        assert_eq!(history.entries().unwrap(), vec!["/", "/a", "/c"]);
    }

    #[test]
    fn test_clones_share_state() {
        let history = History::default();
        let other = history.clone();
        other.navigate("/payment", NavigationMode::Push).unwrap();
        assert_eq!(history.current().unwrap(), "/payment");
    }

    #[test]
    fn test_empty_route_rejected() {
        let history = History::default();
        assert!(matches!(
            history.navigate("", NavigationMode::Push),
            Err(GuardError::Navigation(_))
        ));
    }
}

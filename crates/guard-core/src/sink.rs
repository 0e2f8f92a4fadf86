//! Expiry side effects.
//!
//! The monitor never touches storage or navigation directly; it calls a
//! [`SessionSink`] once per expired episode. [`LogoutSink`] is the standard
//! implementation: drop the credential, then replace the current view with
//! the login route.

use std::sync::Arc;

use crate::credential::CredentialStore;
use crate::error::Result;
use crate::idle::ExpiryReason;
use crate::navigation::{NavigationMode, Navigator, LOGIN_ROUTE};

/// Receiver of the forced-logout side effect.
pub trait SessionSink: Send + Sync {
    fn expire(&self, reason: ExpiryReason) -> Result<()>;
}

/// Closures can be used as sinks directly.
impl<F> SessionSink for F
where
    F: Fn(ExpiryReason) -> Result<()> + Send + Sync,
{
    fn expire(&self, reason: ExpiryReason) -> Result<()> {
        self(reason)
    }
}

// ── LogoutSink ────────────────────────────────────────────────────────────────

/// Clears the stored credential and redirects to login.
pub struct LogoutSink {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl LogoutSink {
    pub fn new(store: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            login_route: LOGIN_ROUTE.to_string(),
        }
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }
}

impl SessionSink for LogoutSink {
    /// Navigation is attempted even if clearing the credential fails; the
    /// first error is returned.
    fn expire(&self, reason: ExpiryReason) -> Result<()> {
        tracing::info!(%reason, route = %self.login_route, "session expired; logging out");

        let cleared = self.store.clear();
        let navigated = self
            .navigator
            .navigate(&self.login_route, NavigationMode::Replace);

        cleared.and(navigated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{Credential, MemoryCredentialStore};
    use crate::error::GuardError;
    use crate::navigation::History;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore;

    impl CredentialStore for FailingStore {
        fn load(&self) -> Result<Option<Credential>> {
            Ok(None)
        }
        fn save(&self, _credential: &Credential) -> Result<()> {
            Ok(())
        }
        fn clear(&self) -> Result<()> {
            Err(GuardError::Config("read-only store".to_string()))
        }
    }

    #[test]
    fn test_logout_sink_clears_and_replaces() {
        let store = Arc::new(MemoryCredentialStore::signed_in(Credential::new("tok", "u")));
        let history = History::new("/");
        history.navigate("/payments", NavigationMode::Push).unwrap();

        let sink = LogoutSink::new(store.clone(), Arc::new(history.clone()));
        sink.expire(ExpiryReason::Idle).unwrap();

        assert!(!store.has_credential().unwrap());
        assert_eq!(history.current().unwrap(), LOGIN_ROUTE);
        assert_eq!(history.entries().unwrap(), vec!["/", LOGIN_ROUTE]);
    }

    #[test]
    fn test_logout_sink_custom_route() {
        let history = History::default();
        let sink = LogoutSink::new(Arc::new(MemoryCredentialStore::new()), Arc::new(history.clone()))
            .with_login_route("/signin");
        sink.expire(ExpiryReason::Backgrounded).unwrap();
        assert_eq!(history.current().unwrap(), "/signin");
    }

    #[test]
    fn test_logout_sink_navigates_even_when_clear_fails() {
        let history = History::new("/receipts");
        let sink = LogoutSink::new(Arc::new(FailingStore), Arc::new(history.clone()));

        let err = sink.expire(ExpiryReason::Idle).unwrap_err();
        assert!(err.to_string().contains("read-only store"));
        assert_eq!(history.current().unwrap(), LOGIN_ROUTE);
    }

    #[test]
    fn test_closure_sink() {
        let calls = AtomicUsize::new(0);
        let sink = |_reason: ExpiryReason| -> Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        sink.expire(ExpiryReason::Idle).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Session start/stop triggers and the private-route guard.
//!
//! [`SessionGate`] ties the idle monitor's lifecycle to the stored
//! credential: observation only starts when someone is signed in, and every
//! way of leaving the session (manual logout, expiry) ends on the login view.

use std::sync::Arc;

use guard_core::credential::{Credential, CredentialStore};
use guard_core::navigation::{NavigationMode, Navigator, HOME_ROUTE, LOGIN_ROUTE};
use guard_core::sink::LogoutSink;
use guard_core::Result;

use crate::idle_monitor::{IdleMonitor, MonitorHandle};

pub struct SessionGate {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    home_route: String,
}

impl SessionGate {
    pub fn new(store: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            login_route: LOGIN_ROUTE.to_string(),
            home_route: HOME_ROUTE.to_string(),
        }
    }

    pub fn with_routes(mut self, login: impl Into<String>, home: impl Into<String>) -> Self {
        self.login_route = login.into();
        self.home_route = home.into();
        self
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn home_route(&self) -> &str {
        &self.home_route
    }

    /// Expiry sink sharing this gate's store, navigator and login route.
    pub fn logout_sink(&self) -> LogoutSink {
        LogoutSink::new(Arc::clone(&self.store), Arc::clone(&self.navigator))
            .with_login_route(self.login_route.clone())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.store.has_credential()
    }

    pub fn credential(&self) -> Result<Option<Credential>> {
        self.store.load()
    }

    /// Start `monitor` only if a credential is stored.
    pub fn start_if_authenticated(&self, monitor: &mut IdleMonitor) -> Result<Option<MonitorHandle>> {
        if !self.is_authenticated()? {
            tracing::debug!("no stored credential; idle monitor not started");
            return Ok(None);
        }
        Ok(Some(monitor.start()))
    }

    /// Route that should actually be shown for `route`.
    ///
    /// Without a credential every route except the login route resolves to
    /// the login route, so stepping back into an authenticated view after
    /// expiry lands on login again.
    pub fn resolve(&self, route: &str) -> Result<String> {
        if route == self.login_route || self.is_authenticated()? {
            return Ok(route.to_string());
        }
        Ok(self.login_route.clone())
    }

    /// Apply [`resolve`](Self::resolve) to the navigator's current route,
    /// replacing the entry when access is denied. Returns the shown route.
    pub fn guard_current(&self) -> Result<String> {
        let current = self.navigator.current()?;
        let resolved = self.resolve(&current)?;
        if resolved != current {
            tracing::debug!(from = %current, to = %resolved, "redirecting unauthenticated view");
            self.navigator.navigate(&resolved, NavigationMode::Replace)?;
        }
        Ok(resolved)
    }

    /// Store `credential`, show the home view and start observation.
    pub fn sign_in(&self, credential: &Credential, monitor: &mut IdleMonitor) -> Result<MonitorHandle> {
        self.store.save(credential)?;
        self.navigator
            .navigate(&self.home_route, NavigationMode::Replace)?;
        tracing::info!(username = %credential.username, "signed in");
        Ok(monitor.start())
    }

    /// User-initiated logout: stop observation, drop the credential, go to
    /// the login view.
    pub fn logout(&self, monitor: &mut IdleMonitor) -> Result<()> {
        monitor.stop();
        self.store.clear()?;
        self.navigator
            .navigate(&self.login_route, NavigationMode::Push)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// The backend invalidated the session: stop observation and drop the
    /// credential, leaving navigation to the caller.
    pub fn revoke(&self, monitor: &mut IdleMonitor) -> Result<()> {
        monitor.stop();
        self.store.clear()?;
        tracing::info!("session revoked");
        Ok(())
    }
}

//! "Session replaced" countdown.
//!
//! When the backend reports that the same account signed in elsewhere, the
//! host shows a notice that counts down once per second and then replaces the
//! current view with the login route. The user can skip the wait with
//! [`ReplacedHandle::login_now`]. Either path navigates at most once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use guard_core::navigation::{NavigationMode, Navigator};
use guard_core::Result;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time;

const TICK: Duration = Duration::from_secs(1);

struct Redirect {
    done: AtomicBool,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl Redirect {
    /// Navigate unless it already happened. Returns whether this call did.
    fn fire(&self) -> Result<bool> {
        if self.done.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        tracing::info!(route = %self.login_route, "session replaced; redirecting to login");
        self.navigator
            .navigate(&self.login_route, NavigationMode::Replace)?;
        Ok(true)
    }
}

/// Countdown notice factory.
pub struct ReplacedNotice;

impl ReplacedNotice {
    /// Start a countdown of `seconds` (at least one). Must run inside a tokio
    /// runtime.
    pub fn start(
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
        seconds: u64,
    ) -> ReplacedHandle {
        let seconds = seconds.max(1);
        let redirect = Arc::new(Redirect {
            done: AtomicBool::new(false),
            navigator,
            login_route: login_route.into(),
        });
        let (tx, rx) = watch::channel(seconds);

        let task = tokio::spawn(countdown(seconds, tx, Arc::clone(&redirect)));

        ReplacedHandle {
            remaining: rx,
            redirect,
            task: task.abort_handle(),
        }
    }
}

async fn countdown(seconds: u64, tx: watch::Sender<u64>, redirect: Arc<Redirect>) {
    let mut interval = time::interval(TICK);
    // The first tick completes immediately.
    interval.tick().await;

    let mut remaining = seconds;
    while remaining > 0 {
        interval.tick().await;
        remaining -= 1;
        tx.send_replace(remaining);
    }

    if let Err(e) = redirect.fire() {
        tracing::error!(error = %e, "session-replaced redirect failed");
    }
}

/// Handle to a running countdown.
pub struct ReplacedHandle {
    remaining: watch::Receiver<u64>,
    redirect: Arc<Redirect>,
    task: AbortHandle,
}

impl ReplacedHandle {
    /// Whole seconds left before the automatic redirect.
    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// Skip the wait and go to login now. Returns `false` if the redirect
    /// already happened.
    pub fn login_now(&self) -> Result<bool> {
        self.task.abort();
        self.redirect.fire()
    }

    /// Abandon the notice without navigating.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the redirect has happened.
    pub fn is_done(&self) -> bool {
        self.redirect.done.load(Ordering::SeqCst)
    }
}

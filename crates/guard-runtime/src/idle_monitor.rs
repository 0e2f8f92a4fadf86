//! Async idle monitor.
//!
//! [`IdleMonitor::start`] spawns one tokio task that owns an [`IdleTracker`]
//! and a single resettable sleep. Hosts feed it [`Signal`]s through the
//! returned [`MonitorHandle`]; re-arming resets that one sleep, so there is
//! never more than one live deadline per monitor.
//!
//! Stopping is total: [`MonitorHandle::stop`] flips a shared flag that the
//! task consults before calling the sink, then aborts the task. Whichever of
//! stop and expiry claims the flag first wins, so the sink runs at most once
//! and never after `stop` has returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use guard_core::idle::{ExpiryReason, IdleTracker, Transition, DEFAULT_IDLE_DURATION};
use guard_core::signals::{Signal, Visibility};
use guard_core::sink::SessionSink;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio::time::{self, Instant};

// ── Public types ──────────────────────────────────────────────────────────────

/// Tunables for an [`IdleMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Inactivity (or background) time after which the session expires.
    pub idle_duration: Duration,
}

impl MonitorConfig {
    pub fn new(idle_duration: Duration) -> Self {
        Self { idle_duration }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_DURATION)
    }
}

/// Observable state of a running (or finished) monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Counting down to `deadline`.
    Active { deadline: Instant },
    /// Stopped by the host before expiry.
    Stopped,
    /// The expiry action ran. `sink_error` carries the sink's failure, if any.
    Expired {
        reason: ExpiryReason,
        sink_error: Option<String>,
    },
}

impl MonitorStatus {
    /// Time left on the countdown; zero unless active.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self {
            MonitorStatus::Active { deadline } => deadline.saturating_duration_since(now),
            _ => Duration::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MonitorStatus::Active { .. })
    }
}

/// A signal together with the instant the host observed it.
#[derive(Debug, Clone, Copy)]
struct Stamped {
    signal: Signal,
    at: Instant,
}

/// State shared between a monitor task and every clone of its handle.
struct Shared {
    /// Set once by whichever of stop / expiry happens first.
    finished: AtomicBool,
    status: watch::Sender<MonitorStatus>,
}

impl Shared {
    /// Claim the single terminal transition. Returns `false` if already taken.
    fn claim(&self) -> bool {
        !self.finished.swap(true, Ordering::SeqCst)
    }
}

// ── IdleMonitor ───────────────────────────────────────────────────────────────

/// Owner of at most one running idle countdown.
///
/// Calling [`start`](Self::start) again stops the previous run first, so
/// repeated starts never leave duplicate tasks or timers behind.
pub struct IdleMonitor {
    config: MonitorConfig,
    sink: Arc<dyn SessionSink>,
    current: Option<MonitorHandle>,
}

impl IdleMonitor {
    pub fn new(config: MonitorConfig, sink: Arc<dyn SessionSink>) -> Self {
        Self {
            config,
            sink,
            current: None,
        }
    }

    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    /// Begin observation and return a handle for feeding signals and stopping.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> MonitorHandle {
        self.stop();

        let now = Instant::now();
        let mut tracker = IdleTracker::new(self.config.idle_duration);
        let deadline = Instant::from_std(tracker.start(now.into_std()));

        let (status_tx, _) = watch::channel(MonitorStatus::Active { deadline });
        let shared = Arc::new(Shared {
            finished: AtomicBool::new(false),
            status: status_tx,
        });
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_monitor(
            tracker,
            deadline,
            signal_rx,
            Arc::clone(&shared),
            Arc::clone(&self.sink),
        ));

        tracing::info!(
            idle_ms = self.config.idle_duration.as_millis() as u64,
            "idle monitor started"
        );

        let handle = MonitorHandle {
            signals: signal_tx,
            shared,
            task: Arc::new(task.abort_handle()),
        };
        self.current = Some(handle.clone());
        handle
    }

    /// Stop the current run, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.stop();
        }
    }

    /// Handle of the current run, if one was started and not stopped here.
    pub fn handle(&self) -> Option<&MonitorHandle> {
        self.current.as_ref()
    }

    /// Whether the current run is still counting down.
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(MonitorHandle::is_running)
    }
}

// ── MonitorHandle ─────────────────────────────────────────────────────────────

/// Cloneable handle to one monitor run.
///
/// Dropping handles does not stop the run; call [`stop`](Self::stop).
#[derive(Clone)]
pub struct MonitorHandle {
    signals: mpsc::UnboundedSender<Stamped>,
    shared: Arc<Shared>,
    task: Arc<AbortHandle>,
}

impl MonitorHandle {
    /// Deliver a signal observed now. Never blocks.
    ///
    /// Returns `false` when the run has already finished.
    pub fn notify(&self, signal: impl Into<Signal>) -> bool {
        self.notify_at(signal, Instant::now())
    }

    /// Deliver a signal the host observed at `at`.
    pub fn notify_at(&self, signal: impl Into<Signal>, at: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        self.signals
            .send(Stamped {
                signal: signal.into(),
                at,
            })
            .is_ok()
    }

    /// Stop the run. Idempotent. Once this returns, the expiry action will
    /// not run for this handle.
    pub fn stop(&self) {
        if self.shared.claim() {
            self.task.abort();
            self.shared.status.send_replace(MonitorStatus::Stopped);
            tracing::info!("idle monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.shared.finished.load(Ordering::SeqCst)
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> MonitorStatus {
        self.shared.status.borrow().clone()
    }

    /// Watch channel following every status change.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.shared.status.subscribe()
    }
}

// ── Monitor task ──────────────────────────────────────────────────────────────

async fn run_monitor(
    mut tracker: IdleTracker,
    deadline: Instant,
    mut signals: mpsc::UnboundedReceiver<Stamped>,
    shared: Arc<Shared>,
    sink: Arc<dyn SessionSink>,
) {
    let sleep = time::sleep_until(deadline);
    tokio::pin!(sleep);
    let mut signals_open = true;

    loop {
        let transition = tokio::select! {
            biased;

            received = signals.recv(), if signals_open => match received {
                Some(stamped) => apply_signal(&mut tracker, stamped),
                None => {
                    tracing::debug!("all monitor handles dropped; deadline still armed");
                    signals_open = false;
                    Transition::Unchanged
                }
            },
            () = &mut sleep => tracker.check_deadline(Instant::now().into_std()),
        };

        match transition {
            Transition::Unchanged => {}
            Transition::Rearmed(next) => {
                let next = Instant::from_std(next);
                sleep.as_mut().reset(next);
                shared
                    .status
                    .send_replace(MonitorStatus::Active { deadline: next });
            }
            Transition::Expired(reason) => {
                expire(&shared, sink.as_ref(), reason);
                break;
            }
        }
    }
}

/// Feed one stamped signal to the tracker.
///
/// A signal stamped at or after the deadline cannot revive the session. The
/// one exception is a show event ending a background span of at least the
/// idle duration, which expires as [`ExpiryReason::Backgrounded`].
fn apply_signal(tracker: &mut IdleTracker, stamped: Stamped) -> Transition {
    let at = stamped.at.into_std();
    if !ends_long_background(tracker, stamped.signal, at) {
        if let expired @ Transition::Expired(_) = tracker.check_deadline(at) {
            return expired;
        }
    }
    match stamped.signal {
        Signal::Activity(kind) => tracing::trace!(%kind, "activity"),
        signal => tracing::debug!(?signal, "visibility changed"),
    }
    tracker.on_signal(stamped.signal, at)
}

fn ends_long_background(tracker: &IdleTracker, signal: Signal, at: std::time::Instant) -> bool {
    signal == Signal::VisibilityChanged(Visibility::Visible)
        && tracker
            .hidden_since()
            .is_some_and(|hidden| at.saturating_duration_since(hidden) >= tracker.idle_duration())
}

fn expire(shared: &Shared, sink: &dyn SessionSink, reason: ExpiryReason) {
    if !shared.claim() {
        return;
    }

    tracing::info!(%reason, "idle deadline reached; running expiry action");
    let sink_error = match sink.expire(reason) {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(%reason, error = %e, "session expiry action failed");
            Some(e.to_string())
        }
    };

    shared
        .status
        .send_replace(MonitorStatus::Expired { reason, sink_error });
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Terminal host for the session guard.
//!
//! [`App`] owns the idle monitor, the session gate and the view history. It
//! translates terminal input into presence signals (keys and mouse are
//! activity, terminal focus is visibility) and renders whichever screen the
//! current route and session state call for.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use guard_core::credential::Credential;
use guard_core::idle::ExpiryReason;
use guard_core::navigation::{History, Navigator};
use guard_core::signals::{ActivityKind, Signal, Visibility};
use guard_core::Result;
use guard_runtime::idle_monitor::{IdleMonitor, MonitorStatus};
use guard_runtime::replaced_notice::{ReplacedHandle, ReplacedNotice};
use guard_runtime::session_gate::SessionGate;
use tokio::time::Instant;

use crate::themes::Theme;
use crate::views::{self, DashboardViewData, LoginViewData, ReplacedViewData};

// ── Screen ────────────────────────────────────────────────────────────────────

/// Which screen the host is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Login,
    Replaced,
}

/// Map a terminal event to a presence signal, if it is one.
pub fn signal_for(event: &Event) -> Option<Signal> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            Some(ActivityKind::KeyPress.into())
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) => Some(ActivityKind::PointerPress.into()),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                Some(ActivityKind::PointerMove.into())
            }
            MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => Some(ActivityKind::Scroll.into()),
            _ => None,
        },
        Event::FocusLost => Some(Visibility::Hidden.into()),
        Event::FocusGained => Some(Visibility::Visible.into()),
        _ => None,
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    gate: SessionGate,
    monitor: IdleMonitor,
    history: History,
    notice: Option<ReplacedHandle>,
    replaced_countdown_secs: u64,
    visibility: Visibility,
    signal_count: u64,
    last_signal: Option<ActivityKind>,
    last_expiry: Option<(ExpiryReason, Option<String>)>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// `monitor` should be built with `gate.logout_sink()` so expiry lands on
    /// the same history and credential store the app shows.
    pub fn new(
        theme_name: &str,
        gate: SessionGate,
        monitor: IdleMonitor,
        history: History,
        replaced_countdown_secs: u64,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            gate,
            monitor,
            history,
            notice: None,
            replaced_countdown_secs,
            visibility: Visibility::Visible,
            signal_count: 0,
            last_signal: None,
            last_expiry: None,
            should_quit: false,
        }
    }

    /// Start observation if a stored credential survives from a previous
    /// run, and make sure the displayed route is allowed.
    pub fn resume(&mut self) -> Result<()> {
        if self.gate.start_if_authenticated(&mut self.monitor)?.is_some() {
            tracing::info!("resumed stored session");
        }
        self.gate.guard_current()?;
        Ok(())
    }

    pub fn screen(&self) -> Screen {
        if self.notice.is_some() {
            return Screen::Replaced;
        }
        match self.history.current() {
            Ok(route) if route == self.gate.login_route() => Screen::Login,
            Ok(_) => Screen::Dashboard,
            Err(_) => Screen::Login,
        }
    }

    pub fn monitor(&self) -> &IdleMonitor {
        &self.monitor
    }

    // ── Event handling ────────────────────────────────────────────────────────

    /// Process one terminal event.
    pub fn handle_event(&mut self, event: &Event) -> Result<()> {
        if let Some(signal) = signal_for(event) {
            self.observe(signal);
        }

        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key)?;
            }
        }

        self.refresh()
    }

    /// Reconcile view state with the monitor, the notice and the route guard.
    pub fn refresh(&mut self) -> Result<()> {
        if let Some(handle) = self.monitor.handle() {
            if let MonitorStatus::Expired { reason, sink_error } = handle.status() {
                self.last_expiry = Some((reason, sink_error));
            }
        }
        if self.notice.as_ref().is_some_and(ReplacedHandle::is_done) {
            self.notice = None;
        }
        // The replaced notice performs its own redirect when it finishes.
        if self.notice.is_none() {
            self.gate.guard_current()?;
        }
        Ok(())
    }

    fn observe(&mut self, signal: Signal) {
        match signal {
            Signal::Activity(kind) => {
                self.signal_count += 1;
                self.last_signal = Some(kind);
            }
            Signal::VisibilityChanged(visibility) => self.visibility = visibility,
        }
        if let Some(handle) = self.monitor.handle() {
            handle.notify(signal);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return Ok(());
            }
            _ => {}
        }

        match (self.screen(), key.code) {
            (Screen::Replaced, KeyCode::Enter) => {
                if let Some(notice) = self.notice.take() {
                    notice.login_now()?;
                }
            }
            (Screen::Login, KeyCode::Enter) => {
                let credential = local_credential();
                self.gate.sign_in(&credential, &mut self.monitor)?;
                self.last_expiry = None;
            }
            (Screen::Dashboard, KeyCode::Char('l')) => {
                self.gate.logout(&mut self.monitor)?;
            }
            (Screen::Dashboard, KeyCode::Char('r')) => {
                self.gate.revoke(&mut self.monitor)?;
                self.notice = Some(ReplacedNotice::start(
                    Arc::new(self.history.clone()) as Arc<dyn Navigator>,
                    self.gate.login_route().to_string(),
                    self.replaced_countdown_secs,
                ));
            }
            _ => {}
        }
        Ok(())
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the terminal UI until `q` / Ctrl+C.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        if let Err(e) = self.resume() {
            tracing::warn!(error = %e, "could not resume stored session");
        }

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if let Err(e) = self.handle_event(&ev) {
                            tracing::warn!(error = %e, "event handling failed");
                        }
                    }
                    Err(e) => break Err(e),
                },
                Ok(false) => {
                    if let Err(e) = self.refresh() {
                        tracing::warn!(error = %e, "refresh failed");
                    }
                }
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        self.monitor.stop();
        if let Some(notice) = self.notice.take() {
            notice.cancel();
        }

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let route = self.history.current().unwrap_or_default();

        match self.screen() {
            Screen::Replaced => {
                let remaining_secs = self
                    .notice
                    .as_ref()
                    .map(ReplacedHandle::remaining)
                    .unwrap_or(0);
                let data = ReplacedViewData {
                    route,
                    remaining_secs,
                    total_secs: self.replaced_countdown_secs,
                };
                views::render_replaced(frame, area, &data, &self.theme);
            }
            Screen::Login => {
                let data = LoginViewData {
                    route,
                    last_expiry: self.last_expiry.as_ref().map(|(reason, _)| *reason),
                    expiry_error: self.last_expiry.as_ref().and_then(|(_, e)| e.clone()),
                };
                views::render_login(frame, area, &data, &self.theme);
            }
            Screen::Dashboard => {
                views::render_dashboard(frame, area, &self.dashboard_data(route), &self.theme);
            }
        }
    }

    fn dashboard_data(&self, route: String) -> DashboardViewData {
        let remaining = self
            .monitor
            .handle()
            .map(|h| h.status().remaining(Instant::now()))
            .unwrap_or(Duration::ZERO);
        let username = self
            .gate
            .credential()
            .ok()
            .flatten()
            .map(|c| c.username);

        DashboardViewData {
            route,
            username,
            remaining,
            idle_duration: self.monitor.config().idle_duration,
            visibility: self.visibility,
            signal_count: self.signal_count,
            last_signal: self.last_signal,
        }
    }
}

/// Credential issued by the terminal's local sign-in.
fn local_credential() -> Credential {
    let username = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
    let token = format!("local-{}", chrono::Utc::now().timestamp_millis());
    Credential::new(token, username)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

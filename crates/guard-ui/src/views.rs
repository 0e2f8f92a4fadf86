//! Screens of the terminal host.
//!
//! Each screen is built as a `Vec<Line>` from a plain data struct, then
//! wrapped in a bordered paragraph by its `render_*` function.

use std::time::Duration;

use guard_core::idle::ExpiryReason;
use guard_core::signals::{ActivityKind, Visibility};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::components::countdown_bar::CountdownBar;
use crate::components::header::Header;
use crate::themes::Theme;

const TITLE: &str = " Session Guard ";

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Values shown while a session is active.
#[derive(Debug, Clone)]
pub struct DashboardViewData {
    pub route: String,
    pub username: Option<String>,
    pub remaining: Duration,
    pub idle_duration: Duration,
    pub visibility: Visibility,
    pub signal_count: u64,
    pub last_signal: Option<ActivityKind>,
}

pub fn build_dashboard_lines<'a>(data: &'a DashboardViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines = Header::new(&data.route, data.username.as_deref(), theme).to_lines();
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Idle timeout", theme.label)));
    lines.push(CountdownBar::new(data.remaining, data.idle_duration, theme).to_line());
    lines.push(Line::from(""));

    let visibility_style = match data.visibility {
        Visibility::Visible => theme.success,
        Visibility::Hidden => theme.warning,
    };
    lines.push(Line::from(vec![
        Span::styled("Window:       ", theme.label),
        Span::styled(data.visibility.to_string(), visibility_style),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Signals:      ", theme.label),
        Span::styled(data.signal_count.to_string(), theme.value),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Last signal:  ", theme.label),
        Span::styled(
            data.last_signal
                .map(|kind| kind.to_string())
                .unwrap_or_else(|| "none".to_string()),
            theme.text,
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "l: log out   r: simulate sign-in elsewhere   q: quit",
        theme.dim,
    )));
    lines
}

pub fn render_dashboard(frame: &mut Frame, area: Rect, data: &DashboardViewData, theme: &Theme) {
    render_lines(frame, area, build_dashboard_lines(data, theme));
}

// ── Login ─────────────────────────────────────────────────────────────────────

/// Values shown on the sign-in view.
#[derive(Debug, Clone)]
pub struct LoginViewData {
    pub route: String,
    /// Why the previous session ended, if it expired.
    pub last_expiry: Option<ExpiryReason>,
    /// Error reported by the expiry action, if any.
    pub expiry_error: Option<String>,
}

pub fn build_login_lines<'a>(data: &'a LoginViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines = Header::new(&data.route, None, theme).to_lines();
    lines.push(Line::from(""));

    match data.last_expiry {
        Some(ExpiryReason::Idle) => lines.push(Line::from(Span::styled(
            "Your session expired after a period of inactivity.",
            theme.warning,
        ))),
        Some(ExpiryReason::Backgrounded) => lines.push(Line::from(Span::styled(
            "Your session expired while the window was in the background.",
            theme.warning,
        ))),
        None => lines.push(Line::from(Span::styled("You are signed out.", theme.text))),
    }
    if let Some(err) = &data.expiry_error {
        lines.push(Line::from(Span::styled(
            format!("Logout did not complete cleanly: {err}"),
            theme.error,
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter: sign in   q: quit",
        theme.info,
    )));
    lines
}

pub fn render_login(frame: &mut Frame, area: Rect, data: &LoginViewData, theme: &Theme) {
    render_lines(frame, area, build_login_lines(data, theme));
}

// ── Session replaced ──────────────────────────────────────────────────────────

/// Values shown by the session-replaced notice.
#[derive(Debug, Clone)]
pub struct ReplacedViewData {
    pub route: String,
    pub remaining_secs: u64,
    pub total_secs: u64,
}

pub fn build_replaced_lines<'a>(data: &'a ReplacedViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines = Header::new(&data.route, None, theme).to_lines();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Session Replaced", theme.error)));
    lines.push(Line::from(Span::styled(
        "Your session was ended because you signed in from another device or terminal.",
        theme.text,
    )));
    lines.push(Line::from(""));
    lines.push(
        CountdownBar::new(
            Duration::from_secs(data.remaining_secs),
            Duration::from_secs(data.total_secs),
            theme,
        )
        .to_line(),
    );
    lines.push(Line::from(Span::styled(
        format!("Redirecting in {}s...", data.remaining_secs),
        theme.dim,
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter: log in again", theme.info)));
    lines
}

pub fn render_replaced(frame: &mut Frame, area: Rect, data: &ReplacedViewData, theme: &Theme) {
    render_lines(frame, area, build_replaced_lines(data, theme));
}

fn render_lines(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(TITLE));
    frame.render_widget(paragraph, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn all_text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn dashboard() -> DashboardViewData {
        DashboardViewData {
            route: "/".to_string(),
            username: Some("amina".to_string()),
            remaining: Duration::from_secs(125),
            idle_duration: Duration::from_secs(180),
            visibility: Visibility::Visible,
            signal_count: 42,
            last_signal: Some(ActivityKind::KeyPress),
        }
    }

    #[test]
    fn test_dashboard_lines_content() {
        let theme = Theme::dark();
        let data = dashboard();
        let text = all_text(&build_dashboard_lines(&data, &theme));
        assert!(text.contains("[ / | amina ]"), "{text}");
        assert!(text.contains("2m 05s left"), "{text}");
        assert!(text.contains("visible"));
        assert!(text.contains("42"));
        assert!(text.contains("keypress"));
    }

    #[test]
    fn test_dashboard_without_signals() {
        let theme = Theme::dark();
        let mut data = dashboard();
        data.last_signal = None;
        data.visibility = Visibility::Hidden;
        let text = all_text(&build_dashboard_lines(&data, &theme));
        assert!(text.contains("none"));
        assert!(text.contains("hidden"));
    }

    #[test]
    fn test_login_lines_explain_expiry() {
        let theme = Theme::dark();
        let data = LoginViewData {
            route: "/login".to_string(),
            last_expiry: Some(ExpiryReason::Backgrounded),
            expiry_error: Some("disk full".to_string()),
        };
        let text = all_text(&build_login_lines(&data, &theme));
        assert!(text.contains("in the background"));
        assert!(text.contains("disk full"));
        assert!(text.contains("Enter: sign in"));
    }

    #[test]
    fn test_login_lines_plain_sign_out() {
        let theme = Theme::dark();
        let data = LoginViewData {
            route: "/login".to_string(),
            last_expiry: None,
            expiry_error: None,
        };
        let text = all_text(&build_login_lines(&data, &theme));
        assert!(text.contains("You are signed out."));
        assert!(!text.contains("expired"));
    }

    #[test]
    fn test_replaced_lines_countdown() {
        let theme = Theme::dark();
        let data = ReplacedViewData {
            route: "/".to_string(),
            remaining_secs: 3,
            total_secs: 5,
        };
        let text = all_text(&build_replaced_lines(&data, &theme));
        assert!(text.contains("Session Replaced"));
        assert!(text.contains("Redirecting in 3s..."));
    }

    #[test]
    fn test_render_dashboard_into_test_backend() {
        let theme = Theme::dark();
        let data = dashboard();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| render_dashboard(frame, frame.area(), &data, &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Session Guard"));
        assert!(rendered.contains("SESSION GUARD"));
    }
}

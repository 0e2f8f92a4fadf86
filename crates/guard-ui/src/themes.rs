use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from `COLORFGBG` (`"fg;bg"`).
///
/// Background values 0–6 are dark, 7–15 light. Absent or unparseable values
/// fall back to dark.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(parse_colorfgbg)
        .unwrap_or(BackgroundType::Dark)
}

fn parse_colorfgbg(value: &str) -> Option<BackgroundType> {
    let bg: u8 = value.split(';').next_back()?.parse().ok()?;
    Some(if bg <= 6 {
        BackgroundType::Dark
    } else {
        BackgroundType::Light
    })
}

/// Styles used by the guard's terminal views.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub separator: Style,

    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    /// Countdown fill while plenty of time remains.
    pub countdown_ok: Style,
    /// Countdown fill under half the idle duration.
    pub countdown_low: Style,
    /// Countdown fill in the last fifth.
    pub countdown_critical: Style,
    pub countdown_empty: Style,
}

impl Theme {
    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            countdown_ok: Style::default().fg(Color::Green),
            countdown_low: Style::default().fg(Color::Yellow),
            countdown_critical: Style::default().fg(Color::Red),
            countdown_empty: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Rgb(0x4a, 0x7c, 0x59))
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            countdown_ok: Style::default().fg(Color::Rgb(0x4a, 0x7c, 0x59)),
            countdown_low: Style::default().fg(Color::Yellow),
            countdown_critical: Style::default().fg(Color::Red),
            countdown_empty: Style::default().fg(Color::Gray),
        }
    }

    /// Resolve a theme name; `"auto"` and unknown names follow the detected
    /// terminal background.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            _ => match detect_background() {
                BackgroundType::Light => Self::light(),
                BackgroundType::Dark => Self::dark(),
            },
        }
    }

    /// Fill style for a countdown with `ratio` of the time left.
    pub fn countdown_style(&self, ratio: f64) -> Style {
        if ratio <= 0.2 {
            self.countdown_critical
        } else if ratio < 0.5 {
            self.countdown_low
        } else {
            self.countdown_ok
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colorfgbg() {
        assert_eq!(parse_colorfgbg("15;0"), Some(BackgroundType::Dark));
        assert_eq!(parse_colorfgbg("0;15"), Some(BackgroundType::Light));
        assert_eq!(parse_colorfgbg("0;default"), None);
    }

    #[test]
    fn test_from_name_explicit() {
        assert_eq!(Theme::from_name("light").text, Theme::light().text);
        assert_eq!(Theme::from_name("dark").text, Theme::dark().text);
    }

    #[test]
    fn test_countdown_style_thresholds() {
        let theme = Theme::dark();
        assert_eq!(theme.countdown_style(1.0), theme.countdown_ok);
        assert_eq!(theme.countdown_style(0.5), theme.countdown_ok);
        assert_eq!(theme.countdown_style(0.49), theme.countdown_low);
        assert_eq!(theme.countdown_style(0.2), theme.countdown_critical);
        assert_eq!(theme.countdown_style(0.0), theme.countdown_critical);
    }
}

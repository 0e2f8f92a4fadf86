use std::time::Duration;

use guard_core::formatting::{format_remaining, remaining_ratio};
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Visual configuration of a countdown bar.
pub struct CountdownBarConfig {
    /// Width in columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for CountdownBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █
            empty_char: '\u{2591}',  // ░
        }
    }
}

/// Horizontal bar that drains as the idle deadline approaches.
///
/// The label shows the remaining time via [`format_remaining`].
pub struct CountdownBar<'a> {
    pub remaining: Duration,
    pub total: Duration,
    pub theme: &'a Theme,
    pub config: CountdownBarConfig,
}

impl<'a> CountdownBar<'a> {
    pub fn new(remaining: Duration, total: Duration, theme: &'a Theme) -> Self {
        Self {
            remaining,
            total,
            theme,
            config: CountdownBarConfig::default(),
        }
    }

    pub fn ratio(&self) -> f64 {
        remaining_ratio(self.remaining, self.total)
    }

    pub fn to_line(&self) -> Line<'a> {
        let ratio = self.ratio();
        let filled = (ratio * self.config.width as f64).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        Line::from(vec![
            Span::styled(filled_str, self.theme.countdown_style(ratio)),
            Span::styled(empty_str, self.theme.countdown_empty),
            Span::styled(
                format!(" {} left", format_remaining(self.remaining)),
                self.theme.label,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_full_bar_at_start() {
        let theme = Theme::dark();
        let bar = CountdownBar::new(Duration::from_secs(180), Duration::from_secs(180), &theme);
        let line = bar.to_line();
        assert_eq!(line.spans[0].content.chars().count(), 40);
        assert!(line.spans[1].content.is_empty());
        assert!(text(&line).ends_with(" 3m 00s left"));
    }

    #[test]
    fn test_half_bar() {
        let theme = Theme::dark();
        let bar = CountdownBar::new(Duration::from_secs(90), Duration::from_secs(180), &theme);
        let line = bar.to_line();
        assert_eq!(line.spans[0].content.chars().count(), 20);
        assert_eq!(line.spans[1].content.chars().count(), 20);
    }

    #[test]
    fn test_empty_bar_uses_critical_style() {
        let theme = Theme::dark();
        let bar = CountdownBar::new(Duration::ZERO, Duration::from_secs(180), &theme);
        let line = bar.to_line();
        assert!(line.spans[0].content.is_empty());
        assert_eq!(line.spans[0].style, theme.countdown_critical);
        assert!(text(&line).contains("0s left"));
    }
}

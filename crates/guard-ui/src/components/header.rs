use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Width of the `=` separator under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Three-line header: title, separator, `[ route | user ]`.
pub struct Header<'a> {
    /// Route currently displayed.
    pub route: &'a str,
    /// Signed-in user, `None` when signed out.
    pub username: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(route: &'a str, username: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            route,
            username,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled("SESSION GUARD", self.theme.header)),
            Line::from(Span::styled("=".repeat(SEPARATOR_WIDTH), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.route.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    self.username.unwrap_or("signed out").to_string(),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

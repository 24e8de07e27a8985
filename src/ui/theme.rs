//! Color themes for the TUI.
//!
//! Both themes share the same layout styles and differ only in the accent,
//! border and selection colors. Severity colors are fixed so that red means
//! the same thing on either background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::health::Severity;

/// Background luma above which the light theme is picked.
const LIGHT_BACKGROUND_LUMA: f32 = 0.5;

/// Foreground color for each severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub ok: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    pub fn color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Ok => self.ok,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ok: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

/// Colors and styles used by every view.
#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
    /// Overlay borders, status messages and the active tab.
    pub highlight: Color,
    pub border: Color,
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    fn with_colors(accent: Color, muted: Color, selection: Color) -> Self {
        let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        Self {
            palette: Palette::default(),
            highlight: accent,
            border: muted,
            header: bold(accent),
            selected: Style::default().bg(selection).add_modifier(Modifier::BOLD),
            tab_active: bold(accent),
            tab_inactive: Style::default().fg(muted),
            border_type: BorderType::Rounded,
        }
    }

    pub fn dark() -> Self {
        Self::with_colors(Color::Cyan, Color::Gray, Color::DarkGray)
    }

    pub fn light() -> Self {
        Self::with_colors(Color::Blue, Color::DarkGray, Color::LightBlue)
    }

    /// Pick a theme from the terminal's background luma, dark when unknown.
    pub fn for_background(luma: Option<f32>) -> Self {
        match luma {
            Some(luma) if luma > LIGHT_BACKGROUND_LUMA => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Query the terminal background. Must run before raw mode is enabled.
    pub fn auto_detect() -> Self {
        Self::for_background(terminal_light::luma().ok())
    }

    /// Status column style. Errors are also bold.
    pub fn status_style(&self, severity: Severity) -> Style {
        let style = Style::default().fg(self.palette.color(severity));
        if severity == Severity::Error {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Metric cell style: plain when OK, colored otherwise.
    pub fn cell_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Ok => Style::default(),
            other => self.status_style(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_background() {
        assert_eq!(Theme::for_background(Some(0.9)).highlight, Color::Blue);
        assert_eq!(Theme::for_background(Some(0.1)).highlight, Color::Cyan);
        assert_eq!(Theme::for_background(None).highlight, Color::Cyan);
    }

    #[test]
    fn test_severity_styles() {
        let theme = Theme::dark();

        assert_eq!(theme.cell_style(Severity::Ok), Style::default());
        assert_eq!(theme.status_style(Severity::Ok).fg, Some(Color::Green));
        assert_eq!(theme.cell_style(Severity::Warning).fg, Some(Color::Yellow));

        let error = theme.status_style(Severity::Error);
        assert_eq!(error.fg, Some(Color::Red));
        assert!(error.add_modifier.contains(Modifier::BOLD));
    }
}

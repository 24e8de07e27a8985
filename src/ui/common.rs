//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::format::format_count;
use super::Theme;
use crate::app::{App, View};
use crate::duration::format_duration;
use crate::health::{Severity, SeverityCounts};

/// Spans for one entity kind: `3 ok 1 warn 0 err nodes`.
fn count_spans(counts: SeverityCounts, kind: &'static str, theme: &Theme) -> Vec<Span<'static>> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let count = |n: usize, severity: Severity| {
        if n > 0 {
            Span::styled(n.to_string(), theme.status_style(severity))
        } else {
            Span::styled("0", dim)
        }
    };

    vec![
        count(counts.ok, Severity::Ok),
        Span::raw(" ok "),
        count(counts.warning, Severity::Warning),
        Span::raw(" warn "),
        count(counts.error, Severity::Error),
        Span::raw(" err "),
        Span::styled(kind, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
    ]
}

/// Render the header bar with cluster health overview.
///
/// Displays: overall status, counts by severity per entity kind, total backlog.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" RABBITWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let overall = data.overall();

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("RABBITWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];
    spans.extend(count_spans(data.node_counts(), "nodes", &app.theme));
    spans.extend(count_spans(data.queue_counts(), "queues", &app.theme));
    spans.extend(count_spans(data.vhost_counts(), "vhosts", &app.theme));
    spans.push(Span::raw(format!("{} ready", format_count(data.total_ready()))));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Overview "),
        Line::from(" 2:Queues "),
        Line::from(" 3:Vhosts "),
    ];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Queues => 1,
        View::Vhosts => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Context-sensitive key hints for the status bar.
fn controls(app: &App) -> &'static str {
    if app.filter_active {
        return "Type to search | Enter:apply Esc:cancel";
    }
    match app.current_view {
        View::Overview => "↑↓:select Tab:switch Enter:detail e:export ?:help q:quit",
        View::Queues => "/:search s:sort S:reverse Tab:switch Enter:detail ?:help q:quit",
        View::Vhosts => "/:search Tab:switch Enter:detail ?:help q:quit",
    }
}

/// Render the status bar at the bottom.
///
/// Shows the source, time since the last snapshot and available controls.
/// A failed refresh is shown alongside the last good data.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let dim = Style::default().add_modifier(Modifier::DIM);

    let line = match (&app.data, &app.load_error) {
        (Some(data), error) => {
            let mut spans = vec![Span::styled(
                format!(
                    " {} | Updated {} ago | ",
                    app.source_description(),
                    format_duration(data.last_updated.elapsed()),
                ),
                dim,
            )];
            if let Some(err) = error {
                spans.push(Span::styled(
                    format!("Error: {} | ", err),
                    app.theme.status_style(Severity::Error),
                ));
            }
            spans.push(Span::styled(controls(app), dim));
            Line::from(spans)
        }
        (None, Some(err)) => Line::from(Span::styled(
            format!(" Error: {} | q:quit r:retry", err),
            app.theme.status_style(Severity::Error),
        )),
        (None, None) => Line::from(Span::styled(
            format!(" Waiting for {} | q:quit", app.source_description()),
            dim,
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Center a box of at most `width` x `height` inside `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1/2/3       Jump to view"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Queues & Vhosts"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered(area, 42, 25);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered(area, 42, 25);
        assert_eq!(rect, Rect::new(29, 7, 42, 25));

        // Shrinks on small terminals
        let small = Rect::new(0, 0, 30, 10);
        let rect = centered(small, 42, 25);
        assert_eq!(rect.width, 26);
        assert_eq!(rect.height, 8);
    }

    #[test]
    fn test_count_spans_dims_zero() {
        let counts = SeverityCounts {
            ok: 2,
            warning: 0,
            error: 1,
        };
        let spans = count_spans(counts, "queues", &Theme::dark());
        assert_eq!(spans[0].content, "2");
        assert_eq!(spans[2].content, "0");
        assert!(spans[2].style.add_modifier.contains(Modifier::DIM));
        assert_eq!(spans[4].content, "1");
        assert_eq!(spans[6].content, "queues");
    }
}

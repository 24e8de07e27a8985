//! Vhosts view rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::format::{format_count, format_rate, format_signed_rate};
use super::Theme;
use crate::app::App;
use crate::health::{Severity, VhostHealth};

fn vhost_row<'a>(vhost: &VhostHealth, theme: &Theme) -> Row<'a> {
    let severity = vhost.severity();
    let rdy = Severity::from_flags(vhost.error.rdy, vhost.warning.rdy);
    let lag = Severity::from_flags(vhost.error.consumption_low, vhost.warning.consumption_low);
    let flags = vhost
        .reasons()
        .iter()
        .map(|(_, reason)| *reason)
        .collect::<Vec<_>>()
        .join(", ");

    Row::new(vec![
        Cell::from(severity.symbol()).style(theme.status_style(severity)),
        Cell::from(vhost.name().to_string()),
        Cell::from(format_count(vhost.vhost.messages_ready)).style(theme.cell_style(rdy)),
        Cell::from(format_count(vhost.vhost.messages_unacknowledged)),
        Cell::from(format_rate(vhost.vhost.publish_rate())),
        Cell::from(format_rate(vhost.vhost.deliver_rate())),
        Cell::from(format_signed_rate(vhost.stats.enqueue_dequeue_diff)).style(theme.cell_style(lag)),
        Cell::from(flags),
    ])
}

/// Render the Vhosts view in ranked order.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let vhosts = app.visible_vhosts();

    let header = Row::new(vec![
        "Status", "Vhost", "Ready", "Unacked", "Publish", "Deliver", "Diff", "Flags",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = vhosts.iter().map(|v| vhost_row(v, &app.theme)).collect();

    let widths = [
        Constraint::Length(6),  // Status
        Constraint::Fill(2),    // Vhost
        Constraint::Length(8),  // Ready
        Constraint::Length(8),  // Unacked
        Constraint::Length(10), // Publish
        Constraint::Length(10), // Deliver
        Constraint::Length(10), // Diff
        Constraint::Fill(2),    // Flags
    ];

    let selected = app.selected_vhost_index.min(vhosts.len().saturating_sub(1));
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let title = format!(" Vhosts ({}/{}){} ", vhosts.len(), data.vhosts.len(), filter_info);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

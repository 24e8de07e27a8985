//! Detail overlay rendering.
//!
//! Displays a modal overlay with every metric and flag of the selected queue
//! or vhost.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::format::{format_count, format_rate, format_signed_rate};
use crate::app::App;
use crate::health::{QueueAlert, QueueHealth, Severity, VhostHealth};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// One line of the detail table: label, value, and the severity it raised.
pub type DetailRow = (&'static str, String, Severity);

fn queue_flag(queue: &QueueHealth, pick: fn(&QueueAlert) -> bool) -> Severity {
    Severity::from_flags(pick(&queue.error), pick(&queue.warning))
}

/// Metrics of a queue, each tagged with the severity of its rule.
pub fn queue_rows(queue: &QueueHealth) -> Vec<DetailRow> {
    let q = &queue.queue;
    let prefetch = match queue.stats.prefetch_total {
        Some(total) => format_count(total),
        None => "unknown".to_string(),
    };

    vec![
        ("State", q.state.clone(), queue_flag(queue, |a| a.state)),
        ("Durable", q.durable.to_string(), queue_flag(queue, |a| a.non_durable)),
        ("Ready", format_count(q.messages_ready), queue_flag(queue, |a| a.rdy)),
        (
            "Unacknowledged",
            format_count(q.messages_unacknowledged),
            queue_flag(queue, |a| a.unack),
        ),
        ("Prefetch total", prefetch, queue_flag(queue, |a| a.unack)),
        ("Consumers", q.consumers.to_string(), queue_flag(queue, |a| a.listener)),
        (
            "Utilisation",
            format!("{:.1}", queue.stats.consumer_utilisation),
            queue_flag(queue, |a| a.utilisation),
        ),
        ("Ready rate", format_rate(q.ready_rate()), queue_flag(queue, |a| a.intake)),
        (
            "Non-persistent",
            queue.stats.non_persistent_messages.to_string(),
            queue_flag(queue, |a| a.non_durable_msg),
        ),
        ("In RAM", format_count(q.messages_ram), Severity::Ok),
        ("Persistent", format_count(q.messages_persistent), Severity::Ok),
    ]
}

/// Metrics of a vhost, each tagged with the severity of its rule.
pub fn vhost_rows(vhost: &VhostHealth) -> Vec<DetailRow> {
    let v = &vhost.vhost;
    let rdy = Severity::from_flags(vhost.error.rdy, vhost.warning.rdy);
    let lag = Severity::from_flags(vhost.error.consumption_low, vhost.warning.consumption_low);

    vec![
        ("Messages", format_count(v.messages), Severity::Ok),
        ("Ready", format_count(v.messages_ready), rdy),
        ("Unacknowledged", format_count(v.messages_unacknowledged), Severity::Ok),
        ("Publish rate", format_rate(v.publish_rate()), Severity::Ok),
        ("Deliver rate", format_rate(v.deliver_rate()), Severity::Ok),
        ("Publish - deliver", format_signed_rate(vhost.stats.enqueue_dequeue_diff), lag),
    ]
}

/// Render the detail of the current selection as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let (title, name, severity, rows, reasons) = if let Some(queue) = app.selected_queue() {
        (
            " Queue Detail ",
            format!("{} / {}", queue.vhost(), queue.name()),
            queue.severity(),
            queue_rows(queue),
            queue.reasons(),
        )
    } else if let Some(vhost) = app.selected_vhost() {
        (
            " Vhost Detail ",
            vhost.name().to_string(),
            vhost.severity(),
            vhost_rows(vhost),
            vhost.reasons(),
        )
    } else {
        return;
    };

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 30);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Name, status and reasons
        Constraint::Min(8),    // Metrics
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    let reason_text = if reasons.is_empty() {
        "no flags raised".to_string()
    } else {
        reasons
            .iter()
            .map(|(s, r)| format!("{} {}", s.symbol(), r))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(
                format!("{} {}", severity.symbol(), severity.label()),
                app.theme.status_style(severity).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!(" Flags: {}", reason_text)),
    ];

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    let table_rows: Vec<Row> = rows
        .into_iter()
        .map(|(label, value, severity)| {
            Row::new(vec![
                Cell::from(label),
                Cell::from(value).style(app.theme.cell_style(severity)),
                Cell::from(if severity > Severity::Ok { severity.symbol() } else { "" })
                    .style(app.theme.status_style(severity)),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [Constraint::Length(20), Constraint::Fill(1), Constraint::Length(6)],
    )
    .header(Row::new(vec!["Metric", "Value", ""]).style(app.theme.header))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(table, chunks[1]);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

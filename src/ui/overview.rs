//! Overview rendering.
//!
//! Displays node resource usage on top and the most at-risk queues below.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::format::format_pct;
use super::queues::{queue_header, queue_row, QUEUE_WIDTHS};
use crate::app::App;
use crate::health::{NodeAlert, NodeHealth, Severity};

/// Render the Overview: node table and at-risk queue table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let node_height = node_panel_height(data.nodes.len(), area.height);
    let chunks = Layout::vertical([Constraint::Length(node_height), Constraint::Min(5)]).split(area);

    render_nodes(frame, app, &data.nodes, chunks[0]);
    render_at_risk(frame, app, chunks[1]);
}

/// Height of the node table: borders and header plus one line per node,
/// capped at half the content area.
pub fn node_panel_height(nodes: usize, height: u16) -> u16 {
    (nodes.min(u16::MAX as usize) as u16)
        .saturating_add(3)
        .min(height / 2)
        .max(4)
}

fn node_row<'a>(node: &NodeHealth, app: &App) -> Row<'a> {
    let theme = &app.theme;
    let pct = |value: f64, pick: fn(&NodeAlert) -> bool| {
        Cell::from(format_pct(value)).style(theme.cell_style(node.dimension(pick)))
    };
    let severity = node.severity();
    let running = if node.node.running { "running" } else { "down" };

    Row::new(vec![
        Cell::from(severity.symbol()).style(theme.status_style(severity)),
        Cell::from(node.name().to_string()),
        pct(node.stats.fd_pct, |a| a.fd),
        pct(node.stats.erl_pct, |a| a.erl),
        pct(node.stats.mem_pct, |a| a.mem),
        pct(node.stats.disk_pct, |a| a.hdd),
        pct(node.stats.sock_pct, |a| a.sock),
        Cell::from(running).style(theme.cell_style(node.dimension(|a| a.status))),
    ])
}

fn render_nodes(frame: &mut Frame, app: &App, nodes: &[NodeHealth], area: Rect) {
    let block = Block::default()
        .title(format!(" Nodes ({}) ", nodes.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if nodes.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No nodes reported",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["Status", "Node", "FD", "Erlang", "Memory", "Disk", "Sockets", "State"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = nodes.iter().map(|n| node_row(n, app)).collect();

    let widths = [
        Constraint::Length(6), // Status
        Constraint::Fill(2),   // Node
        Constraint::Fill(1),   // FD
        Constraint::Fill(1),   // Erlang processes
        Constraint::Fill(1),   // Memory
        Constraint::Fill(1),   // Disk
        Constraint::Fill(1),   // Sockets
        Constraint::Length(8), // State
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_at_risk(frame: &mut Frame, app: &App, area: Rect) {
    let queues = app.at_risk_queues();
    let unhealthy = queues.iter().filter(|q| q.severity() > Severity::Ok).count();

    let block = Block::default()
        .title(format!(
            " At-risk queues ({} of top {}) ",
            unhealthy,
            app.at_risk_limit
        ))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if queues.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No queues reported",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = queues.iter().map(|q| queue_row(q, &app.theme)).collect();
    let table = Table::new(rows, QUEUE_WIDTHS)
        .header(queue_header(app, false))
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_risk_index.min(queues.len().saturating_sub(1))));

    frame.render_stateful_widget(table, area, &mut state);
}

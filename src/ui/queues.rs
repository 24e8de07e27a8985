//! Queues view rendering.
//!
//! Displays every queue with its counters and raised flags. The row and
//! header builders are shared with the overview's at-risk table.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::format::{format_count, format_rate};
use super::Theme;
use crate::app::App;
use crate::health::{QueueHealth, Severity};

/// Column to sort by in the Queues view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueSortColumn {
    /// Urgency order from the ranker.
    #[default]
    Rank,
    /// Sort by queue name, then vhost.
    Name,
    /// Sort by ready message count.
    Ready,
    /// Sort by unacknowledged message count.
    Unacked,
    /// Sort by consumer count.
    Consumers,
}

impl QueueSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            QueueSortColumn::Rank => QueueSortColumn::Name,
            QueueSortColumn::Name => QueueSortColumn::Ready,
            QueueSortColumn::Ready => QueueSortColumn::Unacked,
            QueueSortColumn::Unacked => QueueSortColumn::Consumers,
            QueueSortColumn::Consumers => QueueSortColumn::Rank,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueueSortColumn::Rank => "rank",
            QueueSortColumn::Name => "name",
            QueueSortColumn::Ready => "ready",
            QueueSortColumn::Unacked => "unacked",
            QueueSortColumn::Consumers => "consumers",
        }
    }
}

/// Sort queues by the given column and direction.
///
/// Each entry carries its position in the ranked list, which breaks ties so
/// the order stays stable between refreshes.
pub fn sort_queues_by(queues: &mut [(usize, &QueueHealth)], column: QueueSortColumn, ascending: bool) {
    queues.sort_by(|a, b| {
        let primary = match column {
            QueueSortColumn::Rank => a.0.cmp(&b.0),
            QueueSortColumn::Name => (a.1.name(), a.1.vhost()).cmp(&(b.1.name(), b.1.vhost())),
            QueueSortColumn::Ready => a.1.queue.messages_ready.cmp(&b.1.queue.messages_ready),
            QueueSortColumn::Unacked => a
                .1
                .queue
                .messages_unacknowledged
                .cmp(&b.1.queue.messages_unacknowledged),
            QueueSortColumn::Consumers => a.1.queue.consumers.cmp(&b.1.queue.consumers),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        primary.then_with(|| a.0.cmp(&b.0))
    });
}

/// Short flag summary for a table cell, errors first.
pub fn flag_summary(queue: &QueueHealth) -> String {
    queue
        .reasons()
        .iter()
        .map(|(_, reason)| *reason)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a queue table row.
pub fn queue_row<'a>(queue: &QueueHealth, theme: &Theme) -> Row<'a> {
    let severity = queue.severity();
    let cell = |flag: fn(&crate::health::QueueAlert) -> bool| {
        theme.cell_style(Severity::from_flags(flag(&queue.error), flag(&queue.warning)))
    };

    Row::new(vec![
        Cell::from(severity.symbol()).style(theme.status_style(severity)),
        Cell::from(queue.vhost().to_string()),
        Cell::from(queue.name().to_string()),
        Cell::from(format_count(queue.queue.messages_ready)).style(cell(|a| a.rdy)),
        Cell::from(format_count(queue.queue.messages_unacknowledged)).style(cell(|a| a.unack)),
        Cell::from(queue.queue.consumers.to_string()).style(cell(|a| a.listener)),
        Cell::from(format!("{:.1}", queue.stats.consumer_utilisation)).style(cell(|a| a.utilisation)),
        Cell::from(format_rate(queue.queue.ready_rate())).style(cell(|a| a.intake)),
        Cell::from(flag_summary(queue)),
    ])
}

/// Header row matching [`queue_row`].
pub fn queue_header<'a>(app: &App, sortable: bool) -> Row<'a> {
    let header = |name: &'static str, col: QueueSortColumn| -> Cell<'a> {
        if sortable && app.sort_column == col && col != QueueSortColumn::Rank {
            let arrow = if app.sort_ascending { "↑" } else { "↓" };
            Cell::from(Span::raw(format!("{}{}", name, arrow)))
        } else {
            Cell::from(Span::raw(name))
        }
    };

    Row::new(vec![
        header("Status", QueueSortColumn::Rank),
        header("Vhost", QueueSortColumn::Rank),
        header("Queue", QueueSortColumn::Name),
        header("Ready", QueueSortColumn::Ready),
        header("Unacked", QueueSortColumn::Unacked),
        header("Cons", QueueSortColumn::Consumers),
        header("Util", QueueSortColumn::Rank),
        header("Intake", QueueSortColumn::Rank),
        header("Flags", QueueSortColumn::Rank),
    ])
    .height(1)
    .style(app.theme.header)
}

/// Column widths matching [`queue_row`].
pub const QUEUE_WIDTHS: [Constraint; 9] = [
    Constraint::Length(6), // Status
    Constraint::Fill(1),   // Vhost
    Constraint::Fill(2),   // Queue
    Constraint::Length(8), // Ready
    Constraint::Length(8), // Unacked
    Constraint::Length(5), // Consumers
    Constraint::Length(6), // Utilisation
    Constraint::Length(8), // Intake
    Constraint::Fill(3),   // Flags
];

/// Render the Queues view showing all queues in a sortable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let queues = app.visible_queues();
    let rows: Vec<Row> = queues.iter().map(|q| queue_row(q, &app.theme)).collect();

    let selected = app.selected_queue_index.min(queues.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !queues.is_empty() {
        format!(" [{}/{}]", selected + 1, queues.len())
    } else {
        String::new()
    };

    let title = format!(
        " Queues ({}/{}) [s:sort {}{}]{}{} ",
        queues.len(),
        data.queues.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, QUEUE_WIDTHS)
        .header(queue_header(app, true))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::QueueThresholds;
    use rabbitwatch_types::QueueSnapshot;

    fn queue(vhost: &str, name: &str, ready: u64, unacked: u64, consumers: u64) -> QueueHealth {
        let mut snapshot = QueueSnapshot::new(vhost, name);
        snapshot.messages_ready = ready;
        snapshot.messages_unacknowledged = unacked;
        snapshot.consumers = consumers;
        QueueHealth::classify(&snapshot, None, &QueueThresholds::default())
    }

    #[test]
    fn test_sort_column_cycle() {
        let mut column = QueueSortColumn::default();
        let mut seen = vec![column];
        for _ in 0..4 {
            column = column.next();
            seen.push(column);
        }
        assert_eq!(column.next(), QueueSortColumn::Rank);
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_sort_queues_by_columns() {
        let a = queue("/", "b-queue", 10, 1, 3);
        let b = queue("/", "a-queue", 10, 9, 1);
        let c = queue("alpha", "z-queue", 40, 5, 2);
        let mut rows = vec![(0, &a), (1, &b), (2, &c)];

        sort_queues_by(&mut rows, QueueSortColumn::Name, true);
        let order: Vec<usize> = rows.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 0, 2]);

        sort_queues_by(&mut rows, QueueSortColumn::Ready, false);
        let order: Vec<usize> = rows.iter().map(|r| r.0).collect();
        // Equal ready counts fall back to rank order
        assert_eq!(order, vec![2, 0, 1]);

        sort_queues_by(&mut rows, QueueSortColumn::Unacked, false);
        let order: Vec<usize> = rows.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 2, 0]);

        sort_queues_by(&mut rows, QueueSortColumn::Rank, true);
        let order: Vec<usize> = rows.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_flag_summary() {
        let backlog = queue("/", "q", 500, 0, 0);
        let summary = flag_summary(&backlog);
        assert!(summary.starts_with("ready backlog"));
        assert!(summary.contains("few consumers"));

        let healthy = queue("/", "q", 0, 0, 5);
        assert_eq!(flag_summary(&healthy), "");
    }
}

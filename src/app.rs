//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::export;
use crate::health::{ClusterHealth, QueueHealth, Thresholds, VhostHealth, AT_RISK_LIMIT};
use crate::source::DataSource;
use crate::ui::queues::{sort_queues_by, QueueSortColumn};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Queue and vhost detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Node resources and the most at-risk queues.
    Overview,
    /// Every queue, ranked.
    Queues,
    /// Every vhost, ranked.
    Vhosts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Queues,
            View::Queues => View::Vhosts,
            View::Vhosts => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Vhosts,
            View::Queues => View::Overview,
            View::Vhosts => View::Queues,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Queues => "Queues",
            View::Vhosts => "Vhosts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<ClusterHealth>,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,
    pub at_risk_limit: usize,

    // Navigation state, one selection per view
    pub selected_risk_index: usize,
    pub selected_queue_index: usize,
    pub selected_vhost_index: usize,

    // Sorting (Queues view)
    pub sort_column: QueueSortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and thresholds.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds) -> Self {
        Self::with_theme(source, thresholds, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, thresholds: Thresholds, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            load_error: None,
            thresholds,
            at_risk_limit: AT_RISK_LIMIT,
            selected_risk_index: 0,
            selected_queue_index: 0,
            selected_vhost_index: 0,
            sort_column: QueueSortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source and classify any new snapshot.
    ///
    /// Returns true if new data was received. The source error is refreshed
    /// on every call, so a failed refresh is reported while the last good
    /// data stays on screen.
    pub fn reload_data(&mut self) -> bool {
        let received = match self.source.poll() {
            Some(snapshot) => {
                self.data = Some(ClusterHealth::from_snapshot(&snapshot, &self.thresholds));
                self.clamp_selection();
                true
            }
            None => false,
        };
        self.load_error = self.source.error().map(str::to_string);
        received
    }

    fn clamp_selection(&mut self) {
        let risks = self.at_risk_queues().len();
        let queues = self.visible_queues().len();
        let vhosts = self.visible_vhosts().len();
        self.selected_risk_index = self.selected_risk_index.min(risks.saturating_sub(1));
        self.selected_queue_index = self.selected_queue_index.min(queues.saturating_sub(1));
        self.selected_vhost_index = self.selected_vhost_index.min(vhosts.saturating_sub(1));
    }

    /// Switch to the next view (cycles through Overview → Queues → Vhosts).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// The most urgent queues, as listed on the overview.
    pub fn at_risk_queues(&self) -> Vec<&QueueHealth> {
        match self.data {
            Some(ref data) => data.at_risk_queues(self.at_risk_limit),
            None => Vec::new(),
        }
    }

    /// Queues as displayed in the Queues view: filtered, then sorted.
    pub fn visible_queues(&self) -> Vec<&QueueHealth> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut queues: Vec<(usize, &QueueHealth)> = data
            .queues
            .iter()
            .enumerate()
            .filter(|(_, q)| self.matches_filter(q.name()) || self.matches_filter(q.vhost()))
            .collect();
        sort_queues_by(&mut queues, self.sort_column, self.sort_ascending);
        queues.into_iter().map(|(_, q)| q).collect()
    }

    /// Vhosts as displayed in the Vhosts view, in ranked order.
    pub fn visible_vhosts(&self) -> Vec<&VhostHealth> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        data.vhosts
            .iter()
            .filter(|v| self.matches_filter(v.name()))
            .collect()
    }

    /// Number of selectable rows in the current view.
    pub fn item_count(&self) -> usize {
        match self.current_view {
            View::Overview => self.at_risk_queues().len(),
            View::Queues => self.visible_queues().len(),
            View::Vhosts => self.visible_vhosts().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Overview => &mut self.selected_risk_index,
            View::Queues => &mut self.selected_queue_index,
            View::Vhosts => &mut self.selected_vhost_index,
        }
    }

    /// Selected row index in the current view.
    pub fn selection(&self) -> usize {
        match self.current_view {
            View::Overview => self.selected_risk_index,
            View::Queues => self.selected_queue_index,
            View::Vhosts => self.selected_vhost_index,
        }
    }

    /// Select a row by its visual position, if it exists.
    pub fn select_row(&mut self, row: usize) {
        if row < self.item_count() {
            *self.selection_mut() = row;
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        let selection = self.selection_mut();
        *selection = (*selection + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let selection = self.selection_mut();
        *selection = selection.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// The queue under the cursor in the Overview or Queues view.
    pub fn selected_queue(&self) -> Option<&QueueHealth> {
        match self.current_view {
            View::Overview => self.at_risk_queues().get(self.selected_risk_index).copied(),
            View::Queues => self.visible_queues().get(self.selected_queue_index).copied(),
            View::Vhosts => None,
        }
    }

    /// The vhost under the cursor in the Vhosts view.
    pub fn selected_vhost(&self) -> Option<&VhostHealth> {
        match self.current_view {
            View::Vhosts => self.visible_vhosts().get(self.selected_vhost_index).copied(),
            _ => None,
        }
    }

    /// Open the detail overlay for the current selection.
    pub fn enter_detail(&mut self) {
        if self.item_count() > 0 {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the Overview.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else {
            self.current_view = View::Overview;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column (Queues view).
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Queues {
            self.sort_column = self.sort_column.next();
        }
    }

    /// Toggle sort direction (Queues view).
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Queues {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Case-insensitive substring match against the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the classified report to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        export::write_report(data, self.at_risk_limit, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use rabbitwatch_types::{ClusterSnapshot, ConsumerUtilisation, QueueSnapshot, VhostSnapshot};

    fn snapshot() -> ClusterSnapshot {
        let mut orders = QueueSnapshot::new("/", "orders");
        orders.messages_ready = 500;
        let mut audit = QueueSnapshot::new("audit", "events");
        audit.messages_ready = 5;
        audit.consumers = 10;
        audit.consumer_utilisation = ConsumerUtilisation::Number(90.0);
        let idle = QueueSnapshot::new("/", "idle");

        ClusterSnapshot::builder()
            .queue(idle)
            .queue(audit)
            .queue(orders)
            .vhost(VhostSnapshot::new("/"))
            .vhost(VhostSnapshot::new("audit"))
            .consumers("/", vec![])
            .consumers("audit", vec![])
            .build()
    }

    fn app_with_data() -> App {
        let (tx, source) = ChannelSource::create("test");
        tx.send(snapshot()).unwrap();
        let mut app = App::with_theme(Box::new(source), Thresholds::default(), Theme::dark());
        assert!(app.reload_data());
        app
    }

    fn names(queues: &[&QueueHealth]) -> Vec<String> {
        queues.iter().map(|q| q.name().to_string()).collect()
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Overview.next(), View::Queues);
        assert_eq!(View::Vhosts.next(), View::Overview);
        assert_eq!(View::Overview.prev(), View::Vhosts);
        assert_eq!(View::Queues.label(), "Queues");
    }

    #[test]
    fn test_reload_classifies_and_ranks() {
        let app = app_with_data();
        let data = app.data.as_ref().unwrap();

        assert_eq!(data.queues[0].name(), "orders");
        assert_eq!(names(&app.at_risk_queues())[0], "orders");
        assert!(app.load_error.is_none());
    }

    #[test]
    fn test_reload_reports_source_error_but_keeps_data() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(snapshot()).unwrap();
        let mut app = App::with_theme(Box::new(source), Thresholds::default(), Theme::dark());
        assert!(app.reload_data());

        tx.fail("Connection failed: refused").unwrap();
        assert!(!app.reload_data());
        assert_eq!(app.load_error.as_deref(), Some("Connection failed: refused"));
        assert!(app.data.is_some());

        // Recovery clears the error
        tx.send(snapshot()).unwrap();
        assert!(app.reload_data());
        assert!(app.load_error.is_none());
    }

    #[test]
    fn test_filter_matches_name_or_vhost() {
        let mut app = app_with_data();
        app.set_view(View::Queues);
        for c in "AUD".chars() {
            app.filter_push(c);
        }

        assert_eq!(names(&app.visible_queues()), vec!["events"]);
        app.clear_filter();
        assert_eq!(app.visible_queues().len(), 3);
    }

    #[test]
    fn test_sort_by_name() {
        let mut app = app_with_data();
        app.set_view(View::Queues);
        assert_eq!(names(&app.visible_queues()), vec!["orders", "events", "idle"]);

        app.cycle_sort();
        assert_eq!(app.sort_column, QueueSortColumn::Name);
        assert_eq!(names(&app.visible_queues()), vec!["events", "idle", "orders"]);

        app.toggle_sort_direction();
        assert_eq!(names(&app.visible_queues()), vec!["orders", "idle", "events"]);
    }

    #[test]
    fn test_selection_is_per_view_and_clamped() {
        let mut app = app_with_data();
        app.set_view(View::Queues);
        app.select_next_n(10);
        assert_eq!(app.selected_queue_index, 2);
        assert_eq!(app.selected_queue().unwrap().name(), "idle");

        app.set_view(View::Vhosts);
        assert_eq!(app.selection(), 0);
        app.select_last();
        assert_eq!(app.selected_vhost_index, 1);
        assert!(app.selected_queue().is_none());
        assert!(app.selected_vhost().is_some());

        app.select_prev_n(5);
        assert_eq!(app.selected_vhost_index, 0);
    }

    #[test]
    fn test_detail_overlay_and_back() {
        let mut app = app_with_data();
        app.set_view(View::Queues);
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Queues);

        app.go_back();
        assert_eq!(app.current_view, View::Overview);
    }

    #[test]
    fn test_detail_needs_a_selection() {
        let (_tx, source) = ChannelSource::create("test");
        let mut app = App::with_theme(Box::new(source), Thresholds::default(), Theme::dark());
        app.enter_detail();
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn test_export_state() {
        let app = app_with_data();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        app.export_state(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_status_message_expires() {
        let mut app = app_with_data();
        app.set_status_message("Exported".into());
        assert_eq!(app.get_status_message(), Some("Exported"));

        app.status_message = Some(("old".into(), Instant::now() - Duration::from_secs(10)));
        assert!(app.get_status_message().is_none());
    }
}

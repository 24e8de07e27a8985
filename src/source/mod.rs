//! Data source abstraction for receiving cluster snapshots.
//!
//! A source hands the UI raw [`ClusterSnapshot`]s; classification happens
//! afterwards in [`crate::health`]. Snapshots come from a JSON file, a
//! channel fed by another task, or a background poller of the management
//! API.

mod channel;
mod file;
mod management;

pub use channel::{ChannelSource, SnapshotSender};
pub use file::FileSource;
pub use management::ManagementSource;

pub use rabbitwatch_types::ClusterSnapshot;

use std::fmt::Debug;

/// Trait for receiving cluster snapshots from various sources.
///
/// # Example
///
/// ```
/// use rabbitwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("snapshot.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} queues", snapshot.queues.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<ClusterSnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error from the most recent poll or collection, if any.
    fn error(&self) -> Option<&str>;
}

//! Channel-based data source.
//!
//! Receives cluster snapshots via a tokio watch channel. This is how a
//! background poller hands its results to the TUI, and how an embedding
//! application can push snapshots it collected itself.

use tokio::sync::watch;

use super::{ClusterSnapshot, DataSource};

/// Producer half of a [`ChannelSource`].
///
/// Carries both the latest snapshot and the latest collection error, so the
/// UI can keep showing old data while reporting that a refresh failed.
#[derive(Debug)]
pub struct SnapshotSender {
    snapshots: watch::Sender<ClusterSnapshot>,
    errors: watch::Sender<Option<String>>,
}

/// Returned when every receiver has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverGone;

impl SnapshotSender {
    /// Publish a new snapshot and clear any previous error.
    pub fn send(&self, snapshot: ClusterSnapshot) -> Result<(), ReceiverGone> {
        self.snapshots.send(snapshot).map_err(|_| ReceiverGone)?;
        self.errors.send_if_modified(|error| error.take().is_some());
        Ok(())
    }

    /// Report a failed collection. The last good snapshot stays current.
    pub fn fail(&self, message: impl Into<String>) -> Result<(), ReceiverGone> {
        self.errors
            .send(Some(message.into()))
            .map_err(|_| ReceiverGone)
    }

    /// Returns true once the receiving source has been dropped.
    pub fn is_closed(&self) -> bool {
        self.snapshots.is_closed()
    }
}

/// A data source that receives cluster snapshots via a channel.
///
/// # Example
///
/// ```
/// use rabbitwatch::{ChannelSource, ClusterSnapshot, DataSource};
///
/// let (tx, mut source) = ChannelSource::create("rabbitmq://localhost");
/// tx.send(ClusterSnapshot::new()).unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<ClusterSnapshot>,
    errors: Option<watch::Receiver<Option<String>>>,
    description: String,
    last_error: Option<String>,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a source from the receiving end of a snapshot channel.
    ///
    /// The value already in the channel is returned on the first poll unless
    /// it is an empty snapshot.
    pub fn new(receiver: watch::Receiver<ClusterSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            errors: None,
            description: format!("channel: {}", source_description),
            last_error: None,
            initial_returned: false,
        }
    }

    /// Create a connected sender and source.
    pub fn create(source_description: &str) -> (SnapshotSender, Self) {
        let (snapshots, rx) = watch::channel(ClusterSnapshot::default());
        let (errors, error_rx) = watch::channel(None);
        let mut source = Self::new(rx, source_description);
        source.errors = Some(error_rx);
        (SnapshotSender { snapshots, errors }, source)
    }

    fn refresh_error(&mut self) {
        if let Some(errors) = &mut self.errors {
            if errors.has_changed().unwrap_or(false) {
                self.last_error = errors.borrow_and_update().clone();
            }
        }
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<ClusterSnapshot> {
        self.refresh_error();

        if !self.initial_returned {
            self.initial_returned = true;
            if !self.receiver.borrow().is_empty() {
                self.receiver.mark_changed();
            }
        }

        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            Ok(false) => None,
            Err(_) => {
                if self.last_error.is_none() {
                    self.last_error = Some("Channel closed".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

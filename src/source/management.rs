//! Management API data source.
//!
//! Spawns a background task that collects a [`ClusterSnapshot`] from the
//! RabbitMQ management API on every refresh tick and publishes it through a
//! [`ChannelSource`].

use std::future::Future;
use std::time::Duration;

use rabbitwatch_adapters::rabbitmq::ManagementClient;
use rabbitwatch_adapters::AdapterError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{ChannelSource, ClusterSnapshot, DataSource, SnapshotSender};

/// Shortest refresh interval the poller accepts.
const MIN_REFRESH: Duration = Duration::from_millis(100);

/// A data source that polls the management API in the background.
///
/// Collection errors are logged and surfaced through [`DataSource::error`];
/// the poller keeps running and the last good snapshot stays current. The
/// task stops when the source is dropped.
///
/// Must be created from within a tokio runtime.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use rabbitwatch::{ClusterSnapshot, DataSource, ManagementSource};
/// use rabbitwatch_types::QueueSnapshot;
///
/// # tokio_test::block_on(async {
/// let snapshot = ClusterSnapshot::builder()
///     .queue(QueueSnapshot::new("/", "orders"))
///     .build();
///
/// // Any collector works; `spawn` plugs in a management API client
/// let mut source = ManagementSource::spawn_with(
///     move || {
///         let snapshot = snapshot.clone();
///         async move { Ok(snapshot) }
///     },
///     Duration::from_secs(5),
///     "fixture",
/// );
///
/// tokio::time::sleep(Duration::from_millis(50)).await;
/// assert_eq!(source.poll().unwrap().queues.len(), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct ManagementSource {
    inner: ChannelSource,
    task: JoinHandle<()>,
}

impl ManagementSource {
    /// Poll `client` every `refresh`.
    pub fn spawn(client: ManagementClient, refresh: Duration) -> Self {
        let description = client.endpoint().to_string();
        Self::spawn_with(
            move || {
                let client = client.clone();
                async move { client.collect().await }
            },
            refresh,
            &description,
        )
    }

    /// Poll an arbitrary collector every `refresh`.
    pub fn spawn_with<F, Fut>(mut collect: F, refresh: Duration, description: &str) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ClusterSnapshot, AdapterError>> + Send + 'static,
    {
        let (tx, inner) = ChannelSource::create(description);
        let refresh = refresh.max(MIN_REFRESH);
        let endpoint = description.to_string();

        let task = tokio::spawn(async move {
            info!(%endpoint, ?refresh, "starting management poller");
            let mut ticker = tokio::time::interval(refresh);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !publish(&tx, collect().await) {
                    debug!(%endpoint, "source dropped, stopping poller");
                    break;
                }
            }
        });

        Self { inner, task }
    }
}

/// Forward one collection result. Returns false once nobody is listening.
fn publish(tx: &SnapshotSender, result: Result<ClusterSnapshot, AdapterError>) -> bool {
    let sent = match result {
        Ok(snapshot) => {
            debug!(
                nodes = snapshot.nodes.len(),
                queues = snapshot.queues.len(),
                vhosts = snapshot.vhosts.len(),
                "collected snapshot"
            );
            tx.send(snapshot)
        }
        Err(e) => {
            warn!(error = %e, "snapshot collection failed");
            tx.fail(e.to_string())
        }
    };
    sent.is_ok()
}

impl DataSource for ManagementSource {
    fn poll(&mut self) -> Option<ClusterSnapshot> {
        self.inner.poll()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn error(&self) -> Option<&str> {
        self.inner.error()
    }
}

impl Drop for ManagementSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

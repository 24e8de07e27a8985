//! ClusterSnapshot - everything collected from one poll of the management API.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{ConsumerInfo, NodeSnapshot, QueueSnapshot, SchemaVersion, VhostSnapshot};

/// A point-in-time view of a whole cluster.
///
/// Consumers are stored per vhost. A vhost missing from [`consumers`](Self::consumers)
/// means its consumer lookup failed during collection, which is different from a
/// vhost with an empty consumer list.
///
/// # Example
///
/// ```rust
/// use rabbitwatch_types::{ClusterSnapshot, NodeSnapshot, QueueSnapshot};
///
/// let snapshot = ClusterSnapshot::builder()
///     .timestamp_ms(1703160000000)
///     .node(NodeSnapshot::new("rabbit@host-1"))
///     .queue(QueueSnapshot::new("/", "orders"))
///     .build();
///
/// assert_eq!(snapshot.nodes.len(), 1);
/// // No consumer lookup was recorded for "/"
/// assert!(snapshot.consumers_in("/").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterSnapshot {
    /// Schema version for forward compatibility.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when this snapshot was taken.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp_ms: u64,

    /// Broker nodes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nodes: Vec<NodeSnapshot>,

    /// Queues across all vhosts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub queues: Vec<QueueSnapshot>,

    /// Virtual hosts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vhosts: Vec<VhostSnapshot>,

    /// Consumers keyed by vhost name, for vhosts whose lookup succeeded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub consumers: BTreeMap<String, Vec<ConsumerInfo>>,
}

impl ClusterSnapshot {
    /// Create an empty snapshot with the current timestamp.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    /// Create an empty snapshot with a specific timestamp.
    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            timestamp_ms,
            nodes: Vec::new(),
            queues: Vec::new(),
            vhosts: Vec::new(),
            consumers: BTreeMap::new(),
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> ClusterSnapshotBuilder {
        ClusterSnapshotBuilder::new()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.queues.is_empty() && self.vhosts.is_empty()
    }

    /// Consumers of `vhost`, or `None` if the lookup for that vhost failed.
    pub fn consumers_in(&self, vhost: &str) -> Option<&[ConsumerInfo]> {
        self.consumers.get(vhost).map(Vec::as_slice)
    }

    /// Queues that live in `vhost`.
    pub fn queues_in<'a>(&'a self, vhost: &'a str) -> impl Iterator<Item = &'a QueueSnapshot> {
        self.queues.iter().filter(move |q| q.vhost == vhost)
    }

    /// Look up a vhost by name.
    pub fn vhost(&self, name: &str) -> Option<&VhostSnapshot> {
        self.vhosts.iter().find(|v| v.name == name)
    }
}

#[cfg(feature = "std")]
impl Default for ClusterSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `ClusterSnapshot` instances.
#[derive(Debug, Default)]
pub struct ClusterSnapshotBuilder {
    timestamp_ms: Option<u64>,
    nodes: Vec<NodeSnapshot>,
    queues: Vec<QueueSnapshot>,
    vhosts: Vec<VhostSnapshot>,
    consumers: BTreeMap<String, Vec<ConsumerInfo>>,
}

impl ClusterSnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Add a node.
    pub fn node(mut self, node: NodeSnapshot) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a queue.
    pub fn queue(mut self, queue: QueueSnapshot) -> Self {
        self.queues.push(queue);
        self
    }

    /// Add a vhost.
    pub fn vhost(mut self, vhost: VhostSnapshot) -> Self {
        self.vhosts.push(vhost);
        self
    }

    /// Record a successful consumer lookup for `vhost`.
    pub fn consumers(mut self, vhost: impl Into<String>, consumers: Vec<ConsumerInfo>) -> Self {
        self.consumers.insert(vhost.into(), consumers);
        self
    }

    /// Build the snapshot.
    #[cfg(feature = "std")]
    pub fn build(self) -> ClusterSnapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or_else(current_timestamp_ms);
        self.finish(timestamp_ms)
    }

    /// Build the snapshot with a specific timestamp (for no_std).
    #[cfg(not(feature = "std"))]
    pub fn build(self) -> ClusterSnapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or(0);
        self.finish(timestamp_ms)
    }

    fn finish(self, timestamp_ms: u64) -> ClusterSnapshot {
        ClusterSnapshot {
            version: SchemaVersion::current(),
            timestamp_ms,
            nodes: self.nodes,
            queues: self.queues,
            vhosts: self.vhosts,
            consumers: self.consumers,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClusterSnapshot {
        let mut orders = QueueSnapshot::new("shop", "orders");
        orders.messages_ready = 40;
        let mut invoices = QueueSnapshot::new("billing", "invoices");
        invoices.messages_ready = 2;

        ClusterSnapshot::builder()
            .timestamp_ms(1703160000000)
            .node(NodeSnapshot::new("rabbit@host-1"))
            .vhost(VhostSnapshot::new("shop"))
            .vhost(VhostSnapshot::new("billing"))
            .queue(orders)
            .queue(invoices)
            .consumers("shop", vec![ConsumerInfo::new("shop", "orders", 5)])
            .consumers("billing", Vec::new())
            .build()
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = sample();
        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.queues.len(), 2);
        assert!(snapshot.version.is_compatible());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_consumers_in_distinguishes_empty_from_missing() {
        let snapshot = sample();
        assert_eq!(snapshot.consumers_in("shop").map(<[_]>::len), Some(1));
        assert_eq!(snapshot.consumers_in("billing").map(<[_]>::len), Some(0));
        assert!(snapshot.consumers_in("unknown").is_none());
    }

    #[test]
    fn test_queues_in_filters_by_vhost() {
        let snapshot = sample();
        let names: Vec<&str> = snapshot.queues_in("shop").map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["orders"]);
        assert!(snapshot.vhost("billing").is_some());
        assert!(snapshot.vhost("missing").is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: ClusterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial_file() {
        let parsed: ClusterSnapshot =
            serde_json::from_str(r#"{ "queues": [ { "name": "q", "vhost": "/" } ] }"#).unwrap();
        assert_eq!(parsed.queues.len(), 1);
        assert!(parsed.nodes.is_empty());
        assert!(parsed.version.is_compatible());
    }
}

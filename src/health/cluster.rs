//! Whole-cluster classification.
//!
//! Turns one [`ClusterSnapshot`] into classified nodes plus ranked queues
//! and vhosts, ready for display or export.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use rabbitwatch_types::ClusterSnapshot;
use serde::Serialize;

use super::node::NodeHealth;
use super::queue::QueueHealth;
use super::rank::{rank, rank_top};
use super::severity::{Severity, SeverityCounts};
use super::thresholds::Thresholds;
use super::vhost::VhostHealth;

/// Classified cluster state.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterHealth {
    /// Nodes in the order the broker reported them.
    pub nodes: Vec<NodeHealth>,
    /// Queues, most urgent first.
    pub queues: Vec<QueueHealth>,
    /// Vhosts, most urgent first.
    pub vhosts: Vec<VhostHealth>,
    /// Collection time reported by the snapshot, in Unix milliseconds.
    pub timestamp_ms: u64,
    #[serde(skip)]
    pub last_updated: Instant,
}

impl ClusterHealth {
    /// Load and classify a snapshot file.
    pub fn load(path: &Path, thresholds: &Thresholds) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, thresholds)
    }

    /// Parse and classify a snapshot from JSON.
    pub fn parse(content: &str, thresholds: &Thresholds) -> Result<Self> {
        let snapshot: ClusterSnapshot = serde_json::from_str(content)?;
        Ok(Self::from_snapshot(&snapshot, thresholds))
    }

    /// Classify every entity in a snapshot.
    ///
    /// Each queue is checked against the consumers of its own vhost. A vhost
    /// missing from the snapshot's consumer map means its lookup failed.
    pub fn from_snapshot(snapshot: &ClusterSnapshot, thresholds: &Thresholds) -> Self {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|node| NodeHealth::classify(node, &thresholds.node))
            .collect();

        let queues = snapshot
            .queues
            .iter()
            .map(|queue| {
                let consumers = snapshot.consumers_in(&queue.vhost);
                QueueHealth::classify(queue, consumers, &thresholds.queue)
            })
            .collect();

        let vhosts = snapshot
            .vhosts
            .iter()
            .map(|vhost| VhostHealth::classify(vhost, &thresholds.vhost))
            .collect();

        Self {
            nodes,
            queues: rank(queues),
            vhosts: rank(vhosts),
            timestamp_ms: snapshot.timestamp_ms,
            last_updated: Instant::now(),
        }
    }

    /// The `limit` most urgent queues.
    pub fn at_risk_queues(&self, limit: usize) -> Vec<&QueueHealth> {
        rank_top(self.queues.iter().collect(), limit)
    }

    pub fn queue(&self, vhost: &str, name: &str) -> Option<&QueueHealth> {
        self.queues
            .iter()
            .find(|q| q.vhost() == vhost && q.name() == name)
    }

    pub fn queues_in<'a>(&'a self, vhost: &'a str) -> impl Iterator<Item = &'a QueueHealth> {
        self.queues.iter().filter(move |q| q.vhost() == vhost)
    }

    pub fn vhost(&self, name: &str) -> Option<&VhostHealth> {
        self.vhosts.iter().find(|v| v.name() == name)
    }

    pub fn node_counts(&self) -> SeverityCounts {
        SeverityCounts::tally(self.nodes.iter().map(NodeHealth::severity))
    }

    pub fn queue_counts(&self) -> SeverityCounts {
        SeverityCounts::tally(self.queues.iter().map(QueueHealth::severity))
    }

    pub fn vhost_counts(&self) -> SeverityCounts {
        SeverityCounts::tally(self.vhosts.iter().map(VhostHealth::severity))
    }

    /// Ready messages summed over every queue.
    pub fn total_ready(&self) -> u64 {
        self.queues.iter().map(|q| q.queue.messages_ready).sum()
    }

    pub fn total_unacked(&self) -> u64 {
        self.queues.iter().map(|q| q.queue.messages_unacknowledged).sum()
    }

    /// Worst severity across every entity.
    pub fn overall(&self) -> Severity {
        (self.node_counts() + self.queue_counts() + self.vhost_counts()).worst()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.queues.is_empty() && self.vhosts.is_empty()
    }
}

impl Default for ClusterHealth {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            queues: Vec::new(),
            vhosts: Vec::new(),
            timestamp_ms: 0,
            last_updated: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbitwatch_types::{ConsumerInfo, MessageStats, NodeSnapshot, QueueSnapshot, VhostSnapshot};

    fn sample_snapshot() -> ClusterSnapshot {
        let mut node = NodeSnapshot::new("rabbit@a");
        node.fd_total = 100;
        node.proc_total = 100;
        node.mem_limit = 100;
        node.disk_free = 100;
        node.sockets_total = 100;

        let mut backlog = QueueSnapshot::new("/", "backlog");
        backlog.messages_ready = 500;
        backlog.consumers = 1;

        let mut idle = QueueSnapshot::new("/", "idle");
        idle.consumers = 4;

        let mut unacked = QueueSnapshot::new("billing", "invoices");
        unacked.messages_unacknowledged = 50;
        unacked.consumers = 4;

        let mut busy = VhostSnapshot::new("/");
        busy.messages_ready = 500;
        busy.message_stats = Some(MessageStats::from_rates(30.0, 10.0));

        ClusterSnapshot::builder()
            .timestamp_ms(1_700_000_000_000)
            .node(node)
            .queue(idle)
            .queue(unacked)
            .queue(backlog)
            .vhost(VhostSnapshot::new("billing"))
            .vhost(busy)
            .consumers("/", vec![ConsumerInfo::new("/", "backlog", 10)])
            .build()
    }

    #[test]
    fn test_from_snapshot_ranks_queues() {
        let health = ClusterHealth::from_snapshot(&sample_snapshot(), &Thresholds::default());

        let order: Vec<&str> = health.queues.iter().map(|q| q.name()).collect();
        assert_eq!(order, vec!["backlog", "idle", "invoices"]);
        assert_eq!(health.timestamp_ms, 1_700_000_000_000);
        assert_eq!(health.vhosts[0].name(), "/");
    }

    #[test]
    fn test_missing_consumer_lookup_skips_unack() {
        let health = ClusterHealth::from_snapshot(&sample_snapshot(), &Thresholds::default());

        let invoices = health.queue("billing", "invoices").unwrap();
        assert_eq!(invoices.stats.prefetch_total, None);
        assert!(!invoices.error.unack);
        assert_eq!(invoices.severity(), Severity::Ok);
    }

    #[test]
    fn test_counts_and_overall() {
        let health = ClusterHealth::from_snapshot(&sample_snapshot(), &Thresholds::default());

        assert_eq!(health.node_counts(), SeverityCounts { ok: 1, warning: 0, error: 0 });
        assert_eq!(health.queue_counts(), SeverityCounts { ok: 2, warning: 0, error: 1 });
        assert_eq!(health.vhost_counts().error, 1);
        assert_eq!(health.overall(), Severity::Error);
        assert_eq!(health.total_ready(), 500);
        assert_eq!(health.total_unacked(), 50);
        assert_eq!(ClusterHealth::default().overall(), Severity::Ok);
        assert_eq!(ClusterHealth::default().total_ready(), 0);
    }

    #[test]
    fn test_at_risk_queues() {
        let health = ClusterHealth::from_snapshot(&sample_snapshot(), &Thresholds::default());

        let top = health.at_risk_queues(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name(), "backlog");
        assert_eq!(health.at_risk_queues(10).len(), 3);
        assert_eq!(health.queues_in("/").count(), 2);
    }

    #[test]
    fn test_parse_json() {
        let json = serde_json::to_string(&sample_snapshot()).unwrap();
        let health = ClusterHealth::parse(&json, &Thresholds::default()).unwrap();
        assert_eq!(health.queues.len(), 3);

        assert!(ClusterHealth::parse("not json", &Thresholds::default()).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, serde_json::to_string(&sample_snapshot()).unwrap()).unwrap();

        let health = ClusterHealth::load(&path, &Thresholds::default()).unwrap();
        assert_eq!(health.nodes.len(), 1);
        assert!(ClusterHealth::load(&dir.path().join("missing.json"), &Thresholds::default()).is_err());
    }
}

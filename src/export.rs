//! JSON export of classified cluster health.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rabbitwatch_types::ClusterSnapshot;
use serde::Serialize;

use crate::health::{
    ClusterHealth, NodeHealth, QueueHealth, Severity, SeverityCounts, VhostHealth,
};

/// The exported report.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub timestamp_ms: u64,
    pub overall: Severity,
    pub summary: Summary,
    /// Most urgent queues, in ranked order.
    pub at_risk: Vec<AtRiskQueue<'a>>,
    pub nodes: &'a [NodeHealth],
    pub queues: &'a [QueueHealth],
    pub vhosts: &'a [VhostHealth],
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub nodes: SeverityCounts,
    pub queues: SeverityCounts,
    pub vhosts: SeverityCounts,
    pub total_ready: u64,
    pub total_unacked: u64,
}

#[derive(Debug, Serialize)]
pub struct AtRiskQueue<'a> {
    pub vhost: &'a str,
    pub name: &'a str,
    pub severity: Severity,
    pub ready: u64,
    pub unacked: u64,
    pub reasons: Vec<String>,
}

impl<'a> Report<'a> {
    pub fn build(health: &'a ClusterHealth, at_risk_limit: usize) -> Self {
        let at_risk = health
            .at_risk_queues(at_risk_limit)
            .into_iter()
            .filter(|q| q.severity() > Severity::Ok)
            .map(|q| AtRiskQueue {
                vhost: q.vhost(),
                name: q.name(),
                severity: q.severity(),
                ready: q.queue.messages_ready,
                unacked: q.queue.messages_unacknowledged,
                reasons: q
                    .reasons()
                    .into_iter()
                    .map(|(severity, reason)| format!("{}: {}", severity.symbol(), reason))
                    .collect(),
            })
            .collect();

        Self {
            timestamp_ms: health.timestamp_ms,
            overall: health.overall(),
            summary: Summary {
                nodes: health.node_counts(),
                queues: health.queue_counts(),
                vhosts: health.vhost_counts(),
                total_ready: health.total_ready(),
                total_unacked: health.total_unacked(),
            },
            at_risk,
            nodes: &health.nodes,
            queues: &health.queues,
            vhosts: &health.vhosts,
        }
    }
}

/// Write the classified report as pretty JSON.
pub fn write_report(health: &ClusterHealth, at_risk_limit: usize, path: &Path) -> Result<()> {
    if health.is_empty() {
        bail!("No data to export");
    }
    let json = serde_json::to_string_pretty(&Report::build(health, at_risk_limit))?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Write a raw snapshot, readable again with `--file`.
pub fn write_snapshot(snapshot: &ClusterSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

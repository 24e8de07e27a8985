//! Alert thresholds.
//!
//! Every comparison is strict (`>` / `<`), so a value sitting exactly on a
//! threshold does not alert.

use serde::{Deserialize, Serialize};

/// Thresholds for all classifiers, grouped by entity kind.
///
/// Deserializes from the `[thresholds]` section of the config file; any
/// field left out keeps its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub node: NodeThresholds,
    pub queue: QueueThresholds,
    pub vhost: VhostThresholds,
}

/// Resource usage percentages above which a node dimension alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeThresholds {
    pub fd_error_pct: f64,
    pub fd_warn_pct: f64,
    pub erl_error_pct: f64,
    pub erl_warn_pct: f64,
    pub mem_error_pct: f64,
    pub mem_warn_pct: f64,
    pub disk_error_pct: f64,
    pub disk_warn_pct: f64,
    pub sock_error_pct: f64,
    pub sock_warn_pct: f64,
}

impl Default for NodeThresholds {
    fn default() -> Self {
        Self {
            fd_error_pct: 90.0,
            fd_warn_pct: 80.0,
            erl_error_pct: 90.0,
            erl_warn_pct: 80.0,
            mem_error_pct: 90.0,
            mem_warn_pct: 85.0,
            disk_error_pct: 90.0,
            disk_warn_pct: 80.0,
            sock_error_pct: 90.0,
            sock_warn_pct: 80.0,
        }
    }
}

/// Queue thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueThresholds {
    /// Ready messages above which the backlog is an error.
    pub ready_error: u64,
    /// Ready messages above which the backlog is a warning.
    pub ready_warn: u64,
    /// A backlogged queue with at most this many consumers is a warning.
    pub listener_warn_max: u64,
    /// Consumer utilisation below which a backlogged queue is an error.
    pub utilisation_error_pct: f64,
    /// Consumer utilisation below which a backlogged queue is a warning.
    pub utilisation_warn_pct: f64,
    /// Ready-count growth (messages/s) above which intake is flagged.
    pub intake_rate_warn: f64,
}

impl Default for QueueThresholds {
    fn default() -> Self {
        Self {
            ready_error: 100,
            ready_warn: 0,
            listener_warn_max: 3,
            utilisation_error_pct: 30.0,
            utilisation_warn_pct: 70.0,
            intake_rate_warn: 1.0,
        }
    }
}

/// Vhost thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VhostThresholds {
    pub ready_error: u64,
    pub ready_warn: u64,
    /// Publish minus deliver rate (messages/s) above which lag is an error.
    pub consumption_lag_error: f64,
    /// Publish minus deliver rate (messages/s) above which lag is a warning.
    pub consumption_lag_warn: f64,
}

impl Default for VhostThresholds {
    fn default() -> Self {
        Self {
            ready_error: 1000,
            ready_warn: 0,
            consumption_lag_error: 10.0,
            consumption_lag_warn: 5.0,
        }
    }
}

//! Node resource classification.

use rabbitwatch_types::NodeSnapshot;
use serde::Serialize;

use super::severity::Severity;
use super::thresholds::NodeThresholds;

/// Rounded usage percentages for one node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NodeStats {
    pub fd_pct: f64,
    pub erl_pct: f64,
    pub mem_pct: f64,
    /// `disk_free_limit / disk_free`, so it nears 100 as free space nears the limit.
    pub disk_pct: f64,
    pub sock_pct: f64,
}

/// One flag per node dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeAlert {
    pub fd: bool,
    pub erl: bool,
    pub mem: bool,
    pub hdd: bool,
    pub sock: bool,
    pub status: bool,
}

impl NodeAlert {
    pub fn any(&self) -> bool {
        self.fd || self.erl || self.mem || self.hdd || self.sock || self.status
    }
}

/// Classified health of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeHealth {
    pub node: NodeSnapshot,
    pub stats: NodeStats,
    pub warning: NodeAlert,
    pub error: NodeAlert,
}

impl NodeHealth {
    pub fn classify(node: &NodeSnapshot, thresholds: &NodeThresholds) -> Self {
        let stats = NodeStats {
            fd_pct: percentage(node.fd_used, node.fd_total),
            erl_pct: percentage(node.proc_used, node.proc_total),
            mem_pct: percentage(node.mem_used, node.mem_limit),
            disk_pct: percentage(node.disk_free_limit, node.disk_free),
            sock_pct: percentage(node.sockets_used, node.sockets_total),
        };

        let fd = Severity::tier(stats.fd_pct, thresholds.fd_error_pct, thresholds.fd_warn_pct);
        let erl = Severity::tier(stats.erl_pct, thresholds.erl_error_pct, thresholds.erl_warn_pct);
        let mem = Severity::tier(stats.mem_pct, thresholds.mem_error_pct, thresholds.mem_warn_pct);
        let hdd = Severity::tier(stats.disk_pct, thresholds.disk_error_pct, thresholds.disk_warn_pct);
        let sock = Severity::tier(stats.sock_pct, thresholds.sock_error_pct, thresholds.sock_warn_pct);

        let at = |tier: Severity| NodeAlert {
            fd: fd == tier,
            erl: erl == tier,
            mem: mem == tier,
            hdd: hdd == tier,
            sock: sock == tier,
            status: false,
        };
        let warning = at(Severity::Warning);
        let mut error = at(Severity::Error);
        error.status = !node.running;

        Self {
            node: node.clone(),
            stats,
            warning,
            error,
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn severity(&self) -> Severity {
        Severity::from_flags(self.error.any(), self.warning.any())
    }

    /// Severity of a single resource dimension, for coloring cells.
    pub fn dimension(&self, pick: fn(&NodeAlert) -> bool) -> Severity {
        Severity::from_flags(pick(&self.error), pick(&self.warning))
    }
}

/// `used / total * 100`, rounded half-up to two decimals.
///
/// A zero `total` yields NaN or infinity, which never crosses a threshold.
pub fn percentage(used: u64, total: u64) -> f64 {
    round_2dp(used as f64 / total as f64 * 100.0)
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

//! Vhost classification.

use rabbitwatch_types::VhostSnapshot;
use serde::Serialize;

use super::severity::Severity;
use super::thresholds::VhostThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VhostStats {
    /// Publish rate minus deliver rate, in messages per second.
    pub enqueue_dequeue_diff: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VhostAlert {
    pub rdy: bool,
    pub consumption_low: bool,
    pub has: bool,
}

/// Classified health of one vhost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VhostHealth {
    pub vhost: VhostSnapshot,
    pub stats: VhostStats,
    pub warning: VhostAlert,
    pub error: VhostAlert,
}

impl VhostHealth {
    pub fn classify(vhost: &VhostSnapshot, thresholds: &VhostThresholds) -> Self {
        let mut warning = VhostAlert::default();
        let mut error = VhostAlert::default();

        let ready = vhost.messages_ready;
        if ready > thresholds.ready_error {
            error.rdy = true;
        } else if ready > thresholds.ready_warn {
            warning.rdy = true;
        }

        let publish = vhost.publish_rate();
        let deliver = vhost.deliver_rate();
        let diff = publish - deliver;
        if deliver < publish {
            if diff > thresholds.consumption_lag_error {
                error.consumption_low = true;
            } else if diff > thresholds.consumption_lag_warn {
                warning.consumption_low = true;
            }
        }

        error.has = error.rdy || error.consumption_low;
        warning.has = warning.rdy || warning.consumption_low;

        Self {
            vhost: vhost.clone(),
            stats: VhostStats {
                enqueue_dequeue_diff: diff,
            },
            warning,
            error,
        }
    }

    pub fn name(&self) -> &str {
        &self.vhost.name
    }

    pub fn severity(&self) -> Severity {
        Severity::from_flags(self.error.has, self.warning.has)
    }

    /// Human-readable reasons for every raised flag, errors first.
    pub fn reasons(&self) -> Vec<(Severity, &'static str)> {
        let mut reasons = Vec::new();
        for (severity, alert) in [(Severity::Error, &self.error), (Severity::Warning, &self.warning)] {
            if alert.rdy {
                reasons.push((severity, "ready backlog"));
            }
            if alert.consumption_low {
                reasons.push((severity, "consumers falling behind"));
            }
        }
        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbitwatch_types::MessageStats;

    fn vhost(ready: u64, publish: f64, deliver: f64) -> VhostSnapshot {
        let mut vhost = VhostSnapshot::new("/");
        vhost.messages_ready = ready;
        vhost.message_stats = Some(MessageStats::from_rates(publish, deliver));
        vhost
    }

    fn classify(vhost: &VhostSnapshot) -> VhostHealth {
        VhostHealth::classify(vhost, &VhostThresholds::default())
    }

    #[test]
    fn test_lagging_backlogged_vhost() {
        let health = classify(&vhost(1200, 20.0, 5.0));

        assert_eq!(health.stats.enqueue_dequeue_diff, 15.0);
        assert!(health.error.rdy);
        assert!(health.error.consumption_low);
        assert!(health.error.has);
        assert!(!health.warning.has);
        assert_eq!(health.severity(), Severity::Error);
    }

    #[test]
    fn test_ready_tiers() {
        let health = classify(&vhost(1000, 0.0, 0.0));
        assert!(health.warning.rdy && !health.error.rdy);

        let health = classify(&vhost(0, 0.0, 0.0));
        assert!(!health.warning.has && !health.error.has);
        assert_eq!(health.severity(), Severity::Ok);
    }

    #[test]
    fn test_consumption_lag_tiers() {
        let health = classify(&vhost(0, 12.0, 5.0));
        assert!(health.warning.consumption_low);
        assert!(health.warning.has);

        let health = classify(&vhost(0, 10.0, 5.0));
        assert!(!health.warning.consumption_low);
        assert!(!health.error.consumption_low);
    }

    #[test]
    fn test_diff_kept_when_consumers_keep_up() {
        let health = classify(&vhost(0, 5.0, 30.0));

        assert_eq!(health.stats.enqueue_dequeue_diff, -25.0);
        assert!(!health.error.consumption_low && !health.warning.consumption_low);
    }

    #[test]
    fn test_flag_combinations() {
        let thresholds = VhostThresholds::default();

        for ready in [0, 1, 1000, 1001] {
            for publish in [0.0, 6.0, 20.0] {
                for deliver in [0.0, 5.0, 30.0] {
                    let health = classify(&vhost(ready, publish, deliver));
                    let (error, warning) = (health.error, health.warning);

                    assert_eq!(error.has, error.rdy || error.consumption_low);
                    assert_eq!(warning.has, warning.rdy || warning.consumption_low);
                    assert!(!(error.rdy && warning.rdy));
                    assert!(!(error.consumption_low && warning.consumption_low));

                    assert_eq!(error.rdy, ready > thresholds.ready_error);
                    assert_eq!(warning.rdy, ready > 0 && ready <= thresholds.ready_error);

                    let diff = publish - deliver;
                    assert_eq!(health.stats.enqueue_dequeue_diff, diff);
                    assert_eq!(error.consumption_low, diff > thresholds.consumption_lag_error);
                    assert_eq!(
                        warning.consumption_low,
                        diff > thresholds.consumption_lag_warn
                            && diff <= thresholds.consumption_lag_error
                    );
                }
            }
        }
    }

    #[test]
    fn test_missing_message_stats() {
        let mut snapshot = VhostSnapshot::new("quiet");
        snapshot.messages_ready = 3;
        let health = classify(&snapshot);

        assert_eq!(health.stats.enqueue_dequeue_diff, 0.0);
        assert!(health.warning.rdy);
        assert_eq!(health.reasons(), vec![(Severity::Warning, "ready backlog")]);
    }
}

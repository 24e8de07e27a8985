//! Queue classification.

use rabbitwatch_types::{ConsumerInfo, QueueSnapshot};
use serde::Serialize;

use super::severity::Severity;
use super::thresholds::QueueThresholds;

/// Values derived while classifying a queue.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct QueueStats {
    /// In-memory minus persisted messages. Negative when the broker's
    /// accounting is inconsistent.
    pub non_persistent_messages: i64,
    pub consumer_utilisation: f64,
    /// Summed prefetch of the consumers bound to this queue, `None` when the
    /// consumer lookup for its vhost failed.
    pub prefetch_total: Option<u64>,
}

/// One flag per queue rule plus the tier aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QueueAlert {
    pub state: bool,
    pub non_durable: bool,
    pub rdy: bool,
    pub unack: bool,
    pub listener: bool,
    pub utilisation: bool,
    pub intake: bool,
    pub non_durable_msg: bool,
    pub has: bool,
}

impl QueueAlert {
    fn any_rule(&self) -> bool {
        self.state
            || self.non_durable
            || self.rdy
            || self.unack
            || self.listener
            || self.utilisation
            || self.intake
            || self.non_durable_msg
    }
}

/// Classified health of one queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueHealth {
    pub queue: QueueSnapshot,
    pub stats: QueueStats,
    pub warning: QueueAlert,
    pub error: QueueAlert,
}

impl QueueHealth {
    /// Classify a queue against the consumers of its vhost.
    ///
    /// `consumers` is `None` when the lookup failed; only the unacknowledged
    /// excess rule is skipped in that case.
    pub fn classify(
        queue: &QueueSnapshot,
        consumers: Option<&[ConsumerInfo]>,
        thresholds: &QueueThresholds,
    ) -> Self {
        let mut warning = QueueAlert::default();
        let mut error = QueueAlert::default();

        let ready = queue.messages_ready;
        let backlog = ready > 0;

        error.state = queue.state != "running";
        error.non_durable = !queue.durable;

        if ready > thresholds.ready_error {
            error.rdy = true;
        } else if ready > thresholds.ready_warn {
            warning.rdy = true;
        }

        if backlog {
            if queue.consumers == 0 {
                error.listener = true;
            } else if queue.consumers <= thresholds.listener_warn_max {
                warning.listener = true;
            }
        }

        let utilisation = queue.consumer_utilisation.as_f64();
        if backlog {
            if utilisation < thresholds.utilisation_error_pct {
                error.utilisation = true;
            } else if utilisation < thresholds.utilisation_warn_pct {
                warning.utilisation = true;
            }
        }

        warning.intake = backlog && queue.ready_rate() > thresholds.intake_rate_warn;

        let non_persistent = queue.messages_ram as i64 - queue.messages_persistent as i64;
        error.non_durable_msg = non_persistent > 0;

        let prefetch_total = consumers.map(|consumers| {
            consumers
                .iter()
                .filter(|c| c.is_bound_to(&queue.vhost, &queue.name))
                .map(|c| c.prefetch_count)
                .sum::<u64>()
        });
        if let Some(limit) = prefetch_total {
            error.unack = queue.messages_unacknowledged > limit;
        }

        // Intake is a warning flag that escalates to the error aggregate.
        error.has = error.any_rule() || warning.intake;
        warning.has = warning.rdy || warning.listener || warning.utilisation;

        Self {
            queue: queue.clone(),
            stats: QueueStats {
                non_persistent_messages: non_persistent,
                consumer_utilisation: utilisation,
                prefetch_total,
            },
            warning,
            error,
        }
    }

    pub fn name(&self) -> &str {
        &self.queue.name
    }

    pub fn vhost(&self) -> &str {
        &self.queue.vhost
    }

    pub fn severity(&self) -> Severity {
        Severity::from_flags(self.error.has, self.warning.has)
    }

    /// Human-readable reasons for every raised flag, errors first.
    pub fn reasons(&self) -> Vec<(Severity, &'static str)> {
        let mut reasons = Vec::new();
        let rules: [(&'static str, fn(&QueueAlert) -> bool); 8] = [
            ("not running", |a| a.state),
            ("not durable", |a| a.non_durable),
            ("ready backlog", |a| a.rdy),
            ("unacked above prefetch", |a| a.unack),
            ("few consumers", |a| a.listener),
            ("low utilisation", |a| a.utilisation),
            ("high intake", |a| a.intake),
            ("non-persistent messages", |a| a.non_durable_msg),
        ];
        for (label, flag) in rules {
            if flag(&self.error) {
                reasons.push((Severity::Error, label));
            }
        }
        for (label, flag) in rules {
            if flag(&self.warning) {
                reasons.push((Severity::Warning, label));
            }
        }
        reasons
    }
}

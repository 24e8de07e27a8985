//! Per-vhost backlog and throughput counters.

use alloc::string::String;

/// Counters for one virtual host, as returned by `GET /api/vhosts[/{name}]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VhostSnapshot {
    /// Virtual host name.
    pub name: String,

    /// Total messages across all queues.
    pub messages: u64,

    /// Messages ready for delivery across all queues.
    pub messages_ready: u64,

    /// Messages delivered but not yet acknowledged across all queues.
    pub messages_unacknowledged: u64,

    /// Message rates. Absent on an idle vhost.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub message_stats: Option<MessageStats>,
}

impl VhostSnapshot {
    /// Create an empty snapshot for a named vhost.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Messages published per second, `0.0` when not reported.
    pub fn publish_rate(&self) -> f64 {
        self.message_stats.as_ref().map_or(0.0, |s| s.publish_details.rate)
    }

    /// Messages delivered per second, `0.0` when not reported.
    pub fn deliver_rate(&self) -> f64 {
        self.message_stats.as_ref().map_or(0.0, |s| s.deliver_details.rate)
    }
}

/// Publish and deliver rates of a vhost.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MessageStats {
    /// Publish rate.
    pub publish_details: RateDetails,
    /// Deliver rate (acknowledged and no-ack deliveries).
    pub deliver_details: RateDetails,
}

impl MessageStats {
    /// Build stats from raw publish and deliver rates.
    pub fn from_rates(publish: f64, deliver: f64) -> Self {
        Self {
            publish_details: RateDetails { rate: publish },
            deliver_details: RateDetails { rate: deliver },
        }
    }
}

/// A `*_details` object from the management API; only the rate is kept.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RateDetails {
    /// Messages per second.
    pub rate: f64,
}

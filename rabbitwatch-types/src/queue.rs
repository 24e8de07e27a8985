//! Per-queue message and consumer counters.

use alloc::string::String;

use crate::RateDetails;

/// Counters for one queue, as returned by `GET /api/queues[/{vhost}[/{name}]]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueSnapshot {
    /// Queue name.
    pub name: String,

    /// Virtual host the queue lives in.
    pub vhost: String,

    /// Broker-reported queue state (`running`, `idle`, `flow`, `down`, ...).
    pub state: String,

    /// Whether the queue survives a broker restart.
    pub durable: bool,

    /// Total messages (ready + unacknowledged).
    pub messages: u64,

    /// Messages ready for delivery.
    pub messages_ready: u64,

    /// Messages delivered but not yet acknowledged.
    pub messages_unacknowledged: u64,

    /// Number of consumers attached to the queue.
    pub consumers: u64,

    /// Fraction of time the queue can deliver to its consumers immediately.
    pub consumer_utilisation: ConsumerUtilisation,

    /// Messages held in RAM.
    pub messages_ram: u64,

    /// Messages persisted to disk.
    pub messages_persistent: u64,

    /// Rate of change of the ready count.
    pub messages_ready_details: RateDetails,
}

impl QueueSnapshot {
    /// Create an empty, durable, running queue snapshot.
    pub fn new(vhost: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vhost: vhost.into(),
            state: String::from("running"),
            durable: true,
            ..Default::default()
        }
    }

    /// Rate at which ready messages are accumulating, in messages per second.
    pub fn ready_rate(&self) -> f64 {
        self.messages_ready_details.rate
    }
}

/// The `consumer_utilisation` field of a queue.
///
/// Depending on broker version and queue activity the management API reports
/// this as a number, as a numeric string, as an empty string or not at all.
/// [`ConsumerUtilisation::as_f64`] folds every encoding into a float.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ConsumerUtilisation {
    /// Reported as a JSON number.
    Number(f64),
    /// Reported as a string, possibly empty.
    Text(String),
    /// Missing or `null`.
    #[default]
    Absent,
}

impl ConsumerUtilisation {
    /// Normalize to a float.
    ///
    /// Missing and empty values are `0.0`, numeric strings are parsed and
    /// strings that do not parse are `0.0`.
    pub fn as_f64(&self) -> f64 {
        match self {
            ConsumerUtilisation::Number(value) => *value,
            ConsumerUtilisation::Text(text) => text.trim().parse().unwrap_or(0.0),
            ConsumerUtilisation::Absent => 0.0,
        }
    }
}

impl From<f64> for ConsumerUtilisation {
    fn from(value: f64) -> Self {
        ConsumerUtilisation::Number(value)
    }
}

impl From<&str> for ConsumerUtilisation {
    fn from(value: &str) -> Self {
        ConsumerUtilisation::Text(value.into())
    }
}

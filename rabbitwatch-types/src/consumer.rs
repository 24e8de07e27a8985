//! Consumer information, looked up per vhost.

use alloc::string::String;

/// One consumer attached to a queue, as returned by `GET /api/consumers/{vhost}`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsumerInfo {
    /// Broker-assigned or client-chosen consumer tag.
    pub consumer_tag: String,

    /// The queue this consumer reads from.
    pub queue: QueueRef,

    /// Maximum number of unacknowledged messages the consumer will hold.
    pub prefetch_count: u64,

    /// Whether the consumer acknowledges messages explicitly.
    pub ack_required: bool,
}

impl ConsumerInfo {
    /// Create a consumer bound to `vhost`/`queue` with the given prefetch count.
    pub fn new(vhost: impl Into<String>, queue: impl Into<String>, prefetch_count: u64) -> Self {
        Self {
            queue: QueueRef {
                name: queue.into(),
                vhost: vhost.into(),
            },
            prefetch_count,
            ack_required: true,
            ..Default::default()
        }
    }

    /// Returns true if this consumer reads from the queue `name` in `vhost`.
    pub fn is_bound_to(&self, vhost: &str, name: &str) -> bool {
        self.queue.name == name && self.queue.vhost == vhost
    }
}

/// Reference to a queue by name and vhost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueRef {
    /// Queue name.
    pub name: String,
    /// Virtual host of the queue.
    pub vhost: String,
}

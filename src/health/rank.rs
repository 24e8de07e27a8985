//! Ordering of classified entities by urgency.

use std::cmp::Ordering;

use super::queue::QueueHealth;
use super::severity::Severity;
use super::vhost::VhostHealth;

/// Number of entries shown as "most at risk".
pub const AT_RISK_LIMIT: usize = 10;

/// An entity that can be ordered by urgency.
pub trait Rankable {
    fn severity(&self) -> Severity;
    fn ready_messages(&self) -> u64;
}

impl Rankable for QueueHealth {
    fn severity(&self) -> Severity {
        QueueHealth::severity(self)
    }

    fn ready_messages(&self) -> u64 {
        self.queue.messages_ready
    }
}

impl Rankable for VhostHealth {
    fn severity(&self) -> Severity {
        VhostHealth::severity(self)
    }

    fn ready_messages(&self) -> u64 {
        self.vhost.messages_ready
    }
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn severity(&self) -> Severity {
        (**self).severity()
    }

    fn ready_messages(&self) -> u64 {
        (**self).ready_messages()
    }
}

/// Most urgent first: higher severity, then more ready messages.
///
/// Exact ties compare equal so a stable sort keeps their input order.
pub fn urgency<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.severity()
        .cmp(&a.severity())
        .then_with(|| b.ready_messages().cmp(&a.ready_messages()))
}

/// Sort entities most urgent first. The result is a permutation of the input.
pub fn rank<T: Rankable>(mut entities: Vec<T>) -> Vec<T> {
    entities.sort_by(urgency);
    entities
}

/// The `limit` most urgent entities. Shorter inputs are returned whole.
pub fn rank_top<T: Rankable>(entities: Vec<T>, limit: usize) -> Vec<T> {
    let mut ranked = rank(entities);
    ranked.truncate(limit);
    ranked
}

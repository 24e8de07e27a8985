//! Health classification for RabbitMQ clusters.
//!
//! Every classifier is a pure function of a snapshot and a set of
//! [`Thresholds`]. The results are value objects, built once per poll.
//!
//! ## Submodules
//!
//! - [`node`]: resource usage of a broker node ([`NodeHealth`])
//! - [`queue`]: backlog, consumer and durability rules for a queue ([`QueueHealth`])
//! - [`vhost`]: backlog and consumption lag for a vhost ([`VhostHealth`])
//! - [`rank`]: urgency ordering ([`rank`], [`rank_top`])
//! - [`cluster`]: a whole snapshot classified at once ([`ClusterHealth`])
//!
//! ## Data Flow
//!
//! ```text
//! ClusterSnapshot (raw JSON)
//!        │
//!        ▼
//! ClusterHealth::from_snapshot()
//!        │
//!        ├──▶ NodeHealth::classify()   per node
//!        ├──▶ QueueHealth::classify()  per queue, with its vhost's consumers
//!        ├──▶ VhostHealth::classify()  per vhost
//!        │
//!        └──▶ rank() queues and vhosts, most urgent first
//! ```

pub mod cluster;
pub mod node;
pub mod queue;
pub mod rank;
pub mod severity;
pub mod thresholds;
pub mod vhost;

pub use cluster::ClusterHealth;
pub use node::{NodeAlert, NodeHealth, NodeStats};
pub use queue::{QueueAlert, QueueHealth, QueueStats};
pub use rank::{rank, rank_top, Rankable, AT_RISK_LIMIT};
pub use severity::{Severity, SeverityCounts};
pub use thresholds::{NodeThresholds, QueueThresholds, Thresholds, VhostThresholds};
pub use vhost::{VhostAlert, VhostHealth, VhostStats};

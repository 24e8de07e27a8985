//! # rabbitwatch-types
//!
//! Snapshot types for the health counters a RabbitMQ cluster reports through
//! its management API. These are the raw, read-only inputs that rabbitwatch
//! classifies into OK / WARNING / ERROR health flags.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to decode management API payloads
//! - **Total normalization**: Fields the broker reports inconsistently (such as
//!   `consumer_utilisation`) are modelled as enums with a total conversion
//! - **Versioned file format**: [`ClusterSnapshot`] carries a schema version so
//!   dumped snapshots can be replayed by later releases
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON decoding of management API payloads via serde
//!
//! ## Example
//!
//! ```rust
//! use rabbitwatch_types::{ClusterSnapshot, ConsumerInfo, QueueSnapshot, VhostSnapshot};
//!
//! let snapshot = ClusterSnapshot::builder()
//!     .vhost(VhostSnapshot::new("/"))
//!     .queue(QueueSnapshot::new("/", "orders"))
//!     .consumers("/", vec![ConsumerInfo::new("/", "orders", 10)])
//!     .build();
//!
//! assert_eq!(snapshot.queues.len(), 1);
//! assert_eq!(snapshot.consumers_in("/").map(|c| c.len()), Some(1));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod consumer;
mod node;
mod queue;
mod snapshot;
mod version;
mod vhost;

pub use consumer::*;
pub use node::*;
pub use queue::*;
pub use snapshot::*;
pub use version::*;
pub use vhost::*;

/// Current schema version of the [`ClusterSnapshot`] file format.
///
/// Increment this when making breaking changes to the snapshot format.
pub const SCHEMA_VERSION: u32 = 1;

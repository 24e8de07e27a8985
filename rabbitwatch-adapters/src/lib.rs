//! # rabbitwatch-adapters
//!
//! Collects cluster health snapshots from a RabbitMQ broker.
//!
//! The [`rabbitmq`] module (`rabbitmq` feature, on by default) queries the
//! Management HTTP API for nodes, queues, vhosts and per-vhost consumers and
//! assembles them into a [`ClusterSnapshot`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rabbitwatch_adapters::rabbitmq::ManagementClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ManagementClient::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let snapshot = client.collect().await?;
//!
//!     println!("Collected {} queues", snapshot.queues.len());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "rabbitmq")]
pub mod rabbitmq;

pub use error::AdapterError;

// Re-export types for convenience
pub use rabbitwatch_types::{
    ClusterSnapshot, ConsumerInfo, NodeSnapshot, QueueSnapshot, VhostSnapshot,
};

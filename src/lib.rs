//! # rabbitwatch
//!
//! Health classification and a triage TUI for RabbitMQ clusters.
//!
//! The crate turns raw management API counters into per-entity health
//! verdicts, ranks queues and vhosts by urgency, and displays the result in
//! an interactive terminal UI. The classifiers are pure functions and can be
//! used on their own.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│  health  │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(classify)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── ManagementSource | FileSource | ChannelSource│
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`health`]**: node, queue and vhost classifiers, the urgency ranker and
//!   [`ClusterHealth`], a whole snapshot classified at once
//! - **[`source`]**: the [`DataSource`] trait with a management API poller,
//!   a snapshot file watcher and a channel-fed source
//! - **[`config`]**: layered settings (file, environment, command line)
//! - **[`export`]**: JSON report of a classified cluster
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal UI
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a broker's management API
//! rabbitwatch --endpoint http://localhost:15672 -u guest -p guest
//!
//! # Inspect a saved snapshot
//! rabbitwatch --file snapshot.json
//!
//! # Write a report and exit
//! rabbitwatch --export report.json
//! ```
//!
//! ### Classifying a snapshot
//!
//! ```
//! use rabbitwatch::{ClusterHealth, ClusterSnapshot, Severity, Thresholds};
//! use rabbitwatch_types::QueueSnapshot;
//!
//! let mut queue = QueueSnapshot::new("/", "orders");
//! queue.messages_ready = 500;
//!
//! let snapshot = ClusterSnapshot::builder().queue(queue).build();
//! let health = ClusterHealth::from_snapshot(&snapshot, &Thresholds::default());
//!
//! assert_eq!(health.queues[0].severity(), Severity::Error);
//! ```
//!
//! ### Feeding the TUI from your own poller
//!
//! ```
//! use rabbitwatch::{App, ChannelSource, Thresholds};
//!
//! let (tx, source) = ChannelSource::create("rabbitmq://localhost");
//! let app = App::new(Box::new(source), Thresholds::default());
//! ```

pub mod app;
pub mod config;
pub mod duration;
pub mod events;
pub mod export;
pub mod health;
pub mod source;
pub mod ui;

pub use app::App;
pub use config::Settings;
pub use health::{ClusterHealth, Severity, Thresholds};
pub use source::{
    ChannelSource, ClusterSnapshot, DataSource, FileSource, ManagementSource, SnapshotSender,
};

//! Per-node resource counters.

use alloc::string::String;

/// Resource usage of one broker node, as returned by `GET /api/nodes`.
///
/// Every counter defaults to zero: the management API omits most of them
/// for nodes that are not running.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeSnapshot {
    /// Erlang node name, e.g. `rabbit@host-1`.
    pub name: String,

    /// File descriptors in use.
    pub fd_used: u64,
    /// File descriptors available to the broker.
    pub fd_total: u64,

    /// Sockets in use.
    pub sockets_used: u64,
    /// Sockets available to the broker.
    pub sockets_total: u64,

    /// Memory in use, in bytes.
    pub mem_used: u64,
    /// Memory high watermark, in bytes.
    pub mem_limit: u64,

    /// Free disk space, in bytes.
    pub disk_free: u64,
    /// Free disk space below which the broker blocks publishers, in bytes.
    pub disk_free_limit: u64,

    /// Erlang processes in use.
    pub proc_used: u64,
    /// Erlang process limit.
    pub proc_total: u64,

    /// Whether the node is running.
    pub running: bool,
}

impl NodeSnapshot {
    /// Create an empty snapshot for a named node that reports itself running.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: true,
            ..Default::default()
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"{
            "name": "rabbit@host-1",
            "fd_used": 57,
            "fd_total": 1048576,
            "sockets_used": 2,
            "sockets_total": 943629,
            "mem_used": 118669312,
            "mem_limit": 6679558144,
            "disk_free": 52036124672,
            "disk_free_limit": 50000000,
            "proc_used": 412,
            "proc_total": 1048576,
            "running": true,
            "uptime": 12345,
            "type": "disc"
        }"#;

        let node: NodeSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(node.name, "rabbit@host-1");
        assert_eq!(node.fd_used, 57);
        assert_eq!(node.disk_free_limit, 50_000_000);
        assert!(node.running);
    }

    #[test]
    fn test_deserialize_stopped_node() {
        let json = r#"{ "name": "rabbit@host-2", "running": false }"#;

        let node: NodeSnapshot = serde_json::from_str(json).unwrap();
        assert!(!node.running);
        assert_eq!(node.fd_total, 0);
    }
}

//! RabbitMQ adapter using the Management HTTP API.
//!
//! This adapter collects cluster health counters by querying the Management
//! API, which is typically available on port 15672.
//!
//! ## Endpoints Used
//!
//! - `/api/nodes`: per-node file descriptor, socket, memory, disk and process usage
//! - `/api/queues[/{vhost}[/{name}]]`: ready/unacked counts, consumers, utilisation
//! - `/api/vhosts[/{name}]`: backlog and publish/deliver rates
//! - `/api/consumers/{vhost}`: prefetch counts of the consumers in a vhost
//!
//! ## Example
//!
//! ```rust,no_run
//! use rabbitwatch_adapters::rabbitmq::ManagementClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ManagementClient::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .build()?;
//!
//!     for queue in client.list_queues_in("/").await? {
//!         println!("{}: {} ready", queue.name, queue.messages_ready);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::future;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use rabbitwatch_types::{ClusterSnapshot, ConsumerInfo, NodeSnapshot, QueueSnapshot, VhostSnapshot};

use crate::AdapterError;

/// Client for the RabbitMQ Management HTTP API.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl ManagementClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ManagementClientBuilder {
        ManagementClientBuilder::default()
    }

    /// The Management API base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Collect nodes, queues, vhosts and per-vhost consumers.
    ///
    /// Failing to list nodes, queues or vhosts fails the whole collection.
    /// A failed consumer lookup only drops that vhost from
    /// [`ClusterSnapshot::consumers`].
    pub async fn collect(&self) -> Result<ClusterSnapshot, AdapterError> {
        let (nodes, queues, vhosts) =
            future::try_join3(self.list_nodes(), self.list_queues(), self.list_vhosts()).await?;

        let names: Vec<&str> = vhosts.iter().map(|v| v.name.as_str()).collect();
        let consumers = self.collect_consumers(&names).await;

        debug!(
            nodes = nodes.len(),
            queues = queues.len(),
            vhosts = vhosts.len(),
            "collected cluster snapshot"
        );

        let mut snapshot = ClusterSnapshot::new();
        snapshot.nodes = nodes;
        snapshot.queues = queues;
        snapshot.vhosts = vhosts;
        snapshot.consumers = consumers;
        Ok(snapshot)
    }

    /// Collect a single vhost, its queues and its consumers.
    pub async fn collect_vhost(&self, name: &str) -> Result<ClusterSnapshot, AdapterError> {
        let (vhost, queues) =
            future::try_join(self.get_vhost(name), self.list_queues_in(name)).await?;
        let consumers = self.collect_consumers(&[name]).await;

        let mut snapshot = ClusterSnapshot::new();
        snapshot.vhosts = vec![vhost];
        snapshot.queues = queues;
        snapshot.consumers = consumers;
        Ok(snapshot)
    }

    /// List all cluster nodes.
    pub async fn list_nodes(&self) -> Result<Vec<NodeSnapshot>, AdapterError> {
        self.get_json("/api/nodes").await
    }

    /// List queues across all vhosts.
    pub async fn list_queues(&self) -> Result<Vec<QueueSnapshot>, AdapterError> {
        self.get_json("/api/queues").await
    }

    /// List queues in one vhost.
    pub async fn list_queues_in(&self, vhost: &str) -> Result<Vec<QueueSnapshot>, AdapterError> {
        self.get_json(&format!("/api/queues/{}", urlencoded(vhost))).await
    }

    /// Fetch a single queue.
    pub async fn get_queue(&self, vhost: &str, name: &str) -> Result<QueueSnapshot, AdapterError> {
        self.get_json(&format!(
            "/api/queues/{}/{}",
            urlencoded(vhost),
            urlencoded(name)
        ))
        .await
    }

    /// List all vhosts.
    pub async fn list_vhosts(&self) -> Result<Vec<VhostSnapshot>, AdapterError> {
        self.get_json("/api/vhosts").await
    }

    /// Fetch a single vhost.
    pub async fn get_vhost(&self, name: &str) -> Result<VhostSnapshot, AdapterError> {
        self.get_json(&format!("/api/vhosts/{}", urlencoded(name))).await
    }

    /// List the consumers in one vhost.
    pub async fn consumers_in(&self, vhost: &str) -> Result<Vec<ConsumerInfo>, AdapterError> {
        self.get_json(&format!("/api/consumers/{}", urlencoded(vhost))).await
    }

    async fn collect_consumers(&self, vhosts: &[&str]) -> BTreeMap<String, Vec<ConsumerInfo>> {
        let lookups = vhosts.iter().map(|vhost| async move {
            let result = self.consumers_in(vhost).await;
            (*vhost, result)
        });

        let mut consumers = BTreeMap::new();
        for (vhost, result) in future::join_all(lookups).await {
            match result {
                Ok(list) => {
                    consumers.insert(vhost.to_string(), list);
                }
                Err(e) => {
                    warn!(vhost, error = %e, "consumer lookup failed, unacked check skipped");
                }
            }
        }
        consumers
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdapterError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, "management API request");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(AdapterError::Auth("Invalid credentials".to_string()));
            }
            StatusCode::NOT_FOUND => {
                return Err(AdapterError::NotFound(path.to_string()));
            }
            status if !status.is_success() => {
                return Err(AdapterError::Http(format!("API returned status {}", status)));
            }
            _ => {}
        }

        response.json().await.map_err(|e| AdapterError::Parse(e.to_string()))
    }
}

/// Builder for ManagementClient.
#[derive(Debug, Default)]
pub struct ManagementClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl ManagementClientBuilder {
    /// Set the Management API endpoint (e.g., "http://localhost:15672").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ManagementClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Http(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:15672".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ManagementClient {
            client,
            endpoint,
            username: self.username.unwrap_or_else(|| "guest".to_string()),
            password: self.password.unwrap_or_else(|| "guest".to_string()),
        })
    }
}

// Percent-encode a vhost or queue name for use as a single path segment
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Route = (&'static str, u16, &'static str);

    /// Serve canned JSON responses keyed by request path. Unknown paths get a 404.
    async fn serve(routes: Vec<Route>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    loop {
                        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let request = String::from_utf8_lossy(&buf[..read]);
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, body) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|(_, s, b)| (*s, *b))
                        .unwrap_or((404, "{}"));
                    let reason = match status {
                        200 => "OK",
                        401 => "Unauthorized",
                        404 => "Not Found",
                        _ => "Internal Server Error",
                    };

                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    fn client_for(endpoint: &str) -> ManagementClient {
        ManagementClient::builder()
            .endpoint(endpoint)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    const NODES: &str = r#"[{ "name": "rabbit@a", "fd_used": 10, "fd_total": 100, "running": true }]"#;
    const QUEUES: &str = r#"[
        { "name": "orders", "vhost": "shop", "state": "running", "durable": true, "messages_ready": 3 },
        { "name": "invoices", "vhost": "billing", "state": "running", "durable": true }
    ]"#;
    const VHOSTS: &str = r#"[{ "name": "shop" }, { "name": "billing" }]"#;
    const SHOP_CONSUMERS: &str =
        r#"[{ "consumer_tag": "c1", "prefetch_count": 10, "queue": { "name": "orders", "vhost": "shop" } }]"#;

    #[test]
    fn test_builder_defaults() {
        let client = ManagementClient::builder().build().unwrap();
        assert_eq!(client.endpoint, "http://localhost:15672");
        assert_eq!(client.username, "guest");
        assert_eq!(client.password, "guest");
    }

    #[test]
    fn test_builder_custom() {
        let client = ManagementClient::builder()
            .endpoint("http://rabbit.local:15672/")
            .credentials("admin", "secret")
            .build()
            .unwrap();

        assert_eq!(client.endpoint(), "http://rabbit.local:15672");
        assert_eq!(client.username, "admin");
        assert_eq!(client.password, "secret");
    }

    #[test]
    fn test_urlencoded() {
        assert_eq!(urlencoded("/"), "%2F");
        assert_eq!(urlencoded("my/vhost"), "my%2Fvhost");
        assert_eq!(urlencoded("simple"), "simple");
        assert_eq!(urlencoded("a b#c"), "a%20b%23c");
    }

    #[tokio::test]
    async fn test_collect_assembles_snapshot() {
        let endpoint = serve(vec![
            ("/api/nodes", 200, NODES),
            ("/api/queues", 200, QUEUES),
            ("/api/vhosts", 200, VHOSTS),
            ("/api/consumers/shop", 200, SHOP_CONSUMERS),
            ("/api/consumers/billing", 200, "[]"),
        ])
        .await;

        let snapshot = client_for(&endpoint).collect().await.unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.queues.len(), 2);
        assert_eq!(snapshot.vhosts.len(), 2);
        assert_eq!(snapshot.consumers_in("shop").map(<[_]>::len), Some(1));
        assert_eq!(snapshot.consumers_in("billing").map(<[_]>::len), Some(0));
    }

    #[tokio::test]
    async fn test_collect_survives_failed_consumer_lookup() {
        let endpoint = serve(vec![
            ("/api/nodes", 200, NODES),
            ("/api/queues", 200, QUEUES),
            ("/api/vhosts", 200, VHOSTS),
            ("/api/consumers/shop", 200, SHOP_CONSUMERS),
            ("/api/consumers/billing", 500, "{}"),
        ])
        .await;

        let snapshot = client_for(&endpoint).collect().await.unwrap();
        assert!(snapshot.consumers_in("shop").is_some());
        assert!(snapshot.consumers_in("billing").is_none());
    }

    #[tokio::test]
    async fn test_collect_fails_when_listing_fails() {
        let endpoint = serve(vec![
            ("/api/nodes", 200, NODES),
            ("/api/queues", 500, "{}"),
            ("/api/vhosts", 200, VHOSTS),
        ])
        .await;

        let err = client_for(&endpoint).collect().await.unwrap_err();
        assert!(matches!(err, AdapterError::Http(_)));
    }

    #[tokio::test]
    async fn test_collect_vhost() {
        let endpoint = serve(vec![
            ("/api/vhosts/shop", 200, r#"{ "name": "shop", "messages_ready": 3 }"#),
            ("/api/queues/shop", 200, r#"[{ "name": "orders", "vhost": "shop" }]"#),
            ("/api/consumers/shop", 200, SHOP_CONSUMERS),
        ])
        .await;

        let snapshot = client_for(&endpoint).collect_vhost("shop").await.unwrap();
        assert_eq!(snapshot.vhosts.len(), 1);
        assert_eq!(snapshot.vhosts[0].messages_ready, 3);
        assert_eq!(snapshot.queues.len(), 1);
        assert!(snapshot.consumers_in("shop").is_some());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let endpoint = serve(vec![
            ("/api/nodes", 401, "{}"),
            ("/api/vhosts", 200, "not json"),
        ])
        .await;
        let client = client_for(&endpoint);

        assert!(matches!(client.list_nodes().await, Err(AdapterError::Auth(_))));
        assert!(matches!(
            client.get_queue("/", "missing").await,
            Err(AdapterError::NotFound(_))
        ));
        assert!(matches!(client.list_vhosts().await, Err(AdapterError::Parse(_))));
    }

    #[tokio::test]
    async fn test_default_vhost_is_encoded() {
        let endpoint = serve(vec![(
            "/api/queues/%2F/orders",
            200,
            r#"{ "name": "orders", "vhost": "/", "consumer_utilisation": "" }"#,
        )])
        .await;

        let queue = client_for(&endpoint).get_queue("/", "orders").await.unwrap();
        assert_eq!(queue.vhost, "/");
        assert_eq!(queue.consumer_utilisation.as_f64(), 0.0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.consumers_in("/").await.unwrap_err();
        assert!(matches!(err, AdapterError::Connection(_) | AdapterError::Http(_)));
    }
}

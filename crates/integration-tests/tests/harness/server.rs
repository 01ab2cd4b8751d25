//! Test server wrapper that starts Keel on a random port

use std::net::SocketAddr;

use keel_config::Config;
use keel_server::Server;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(config)?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET a path and decode the problem document
    pub async fn get_problem(&self, path: &str) -> Problem {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        Problem::read(resp).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Response status, headers, and decoded JSON body
pub struct Problem {
    pub status: u16,
    pub content_type: Option<String>,
    pub correlation_id: Option<String>,
    pub body: Value,
}

impl Problem {
    pub async fn read(resp: reqwest::Response) -> Self {
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned)
        };
        let status = resp.status().as_u16();
        let content_type = header("content-type");
        let correlation_id = header("x-correlation-id");
        let body = resp.json().await.unwrap();

        Self {
            status,
            content_type,
            correlation_id,
            body,
        }
    }

    /// Assert the invariants every problem document shares
    pub fn assert_well_formed(&self, instance: &str) {
        assert_eq!(self.content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(self.body["type"], "about:blank");
        assert_eq!(self.body["status"], self.status);
        assert_eq!(self.body["instance"], instance);
        assert!(self.body["title"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(self.body["detail"].as_str().is_some_and(|d| !d.is_empty()));
        assert!(self.body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
        assert_eq!(self.body["correlationId"].as_str(), self.correlation_id.as_deref());
    }
}

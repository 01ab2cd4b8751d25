//! Mock insurer registry for integration tests
//!
//! The requested id selects the behavior: `missing` answers 404,
//! `inactive` an inactive insurer, `slow` answers after a delay, `broken`
//! fails with 500. Any other id is an active insurer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// How long the `slow` insurer takes to answer
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

/// Body of the `broken` insurer's 500 response
pub const BROKEN_BODY: &str = "pool exhausted: jdbc:postgresql://db-primary:5432/insurers";

/// Mock registry that answers predictably per insurer id
pub struct MockInsurer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockInsurerState>,
}

struct MockInsurerState {
    request_count: AtomicU32,
}

impl MockInsurer {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockInsurerState {
            request_count: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/insurers/{id}", routing::get(handle_insurer))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the insurer client
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of lookups received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockInsurer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Base URL of a port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

async fn handle_insurer(State(state): State<Arc<MockInsurerState>>, Path(id): Path<String>) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    match id.as_str() {
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, BROKEN_BODY).into_response(),
        "inactive" => Json(json!({ "id": id, "name": "Retired Mutual", "active": false })).into_response(),
        "slow" => {
            tokio::time::sleep(SLOW_DELAY).await;
            Json(json!({ "id": id, "name": "Sluggish Health", "active": true })).into_response()
        }
        _ => Json(json!({ "id": id, "name": format!("Insurer {id}"), "active": true })).into_response(),
    }
}

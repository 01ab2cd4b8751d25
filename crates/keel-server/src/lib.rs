//! HTTP edge for Keel
//!
//! Classifies every failure that reaches the edge, binds it to a status, and
//! renders it as `application/problem+json` carrying the request's
//! correlation id.

mod circuit;
mod correlation;
mod extract;
mod failure;
mod insurer;
mod problem;
mod render;
mod routes;
mod status;
mod validation;

use std::net::SocketAddr;

use axum::Router;
use keel_config::Config;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use circuit::{CallNotPermitted, CircuitBreaker};
pub use correlation::{CORRELATION_ID, CorrelationSources, correlation_id_middleware};
pub use extract::{Path, Query, UNREADABLE_BODY, ValidatedJson};
pub use failure::{BINDING_REASON, Failure};
pub use insurer::{Insurer, InsurerClient};
pub use problem::{GENERIC_SERVER_DETAIL, PROBLEM_JSON, PROBLEM_TYPE, ProblemBody, ProblemItem};
pub use render::{ApiError, render_problem_middleware};
pub use routes::CreateTaskRequest;
pub use status::{reason_phrase, status_for_reason};
pub use validation::{BindingErrors, ConstraintViolation, FieldError, ObjectError, constraint_violations};

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the insurer client cannot be constructed
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let insurer = config
            .downstream
            .insurer
            .as_ref()
            .map(InsurerClient::new)
            .transpose()?;

        let mut app = routes::sample_router(insurer);

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(routes::health));
        }

        let app = app
            .fallback(render::not_found)
            .method_not_allowed_fallback(render::method_not_allowed);

        Ok(Self {
            router: with_error_handling(app),
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

/// Wrap a router with failure rendering and correlation propagation
///
/// Layers, innermost first: panic capture, problem rendering, request
/// tracing, correlation id assignment. Add routes and fallbacks before
/// calling this so they are covered too.
pub fn with_error_handling(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(render::panic_response))
        .layer(axum::middleware::from_fn(render_problem_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(correlation::request_span))
        .layer(axum::middleware::from_fn(correlation_id_middleware))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use tower::ServiceExt;

    use super::*;

    fn config(toml: &str) -> Config {
        Config::parse(toml).unwrap()
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let router = Server::new(Config::default()).unwrap().into_router();

        let response = router
            .oneshot(http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn disabled_health_route_is_a_problem() {
        let router = Server::new(config("[server.health]\nenabled = false\n"))
            .unwrap()
            .into_router();

        let response = router
            .oneshot(http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], PROBLEM_JSON);
    }

    #[tokio::test]
    async fn insurer_route_requires_configuration() {
        let router = Server::new(Config::default()).unwrap().into_router();

        let response = router
            .oneshot(http::Request::get("/api/insurers/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn default_listen_address() {
        let server = Server::new(Config::default()).unwrap();
        assert_eq!(server.listen_address(), SocketAddr::from(([0, 0, 0, 0], 3000)));
    }
}

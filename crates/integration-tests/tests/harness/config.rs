//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use keel_config::{Config, DownstreamConfig, HealthConfig, InsurerConfig, ServerConfig, TelemetryConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                },
                downstream: DownstreamConfig::default(),
                telemetry: TelemetryConfig::default(),
            },
        }
    }

    /// Point the insurer lookup at a registry
    pub fn with_insurer(mut self, base_url: &str) -> Self {
        self.config.downstream.insurer = Some(InsurerConfig {
            base_url: base_url.parse().expect("valid URL"),
            timeout: Duration::from_secs(2),
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
        });
        self
    }

    /// Set the insurer call timeout
    pub fn with_insurer_timeout(mut self, timeout: Duration) -> Self {
        if let Some(insurer) = self.config.downstream.insurer.as_mut() {
            insurer.timeout = timeout;
        }
        self
    }

    /// Set consecutive failures before the insurer circuit opens
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        if let Some(insurer) = self.config.downstream.insurer.as_mut() {
            insurer.failure_threshold = threshold;
        }
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

#![allow(clippy::must_use_candidate)]

pub mod downstream;
mod duration;
mod env;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use downstream::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level Keel configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Downstream dependencies called by the sample routes
    #[serde(default)]
    pub downstream: DownstreamConfig,
    /// Logging and trace export
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Downstream dependencies
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownstreamConfig {
    /// Insurer registry used by the insurer lookup route
    #[serde(default)]
    pub insurer: Option<InsurerConfig>,
}

/// Insurer registry client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsurerConfig {
    /// Base URL of the registry (e.g. `http://insurer:8080/`)
    pub base_url: Url,
    /// Per-call timeout (e.g. "5s", "500ms")
    #[serde(default = "default_timeout", deserialize_with = "crate::duration::deserialize")]
    pub timeout: Duration,
    /// Consecutive failures before the circuit opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls before allowing a probe
    #[serde(default = "default_recovery_timeout", deserialize_with = "crate::duration::deserialize")]
    pub recovery_timeout: Duration,
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

#[allow(clippy::missing_const_for_fn)]
fn default_failure_threshold() -> u32 {
    3
}

#[allow(clippy::missing_const_for_fn)]
fn default_recovery_timeout() -> Duration {
    Duration::from_secs(30)
}

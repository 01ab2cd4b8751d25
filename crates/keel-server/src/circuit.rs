use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

/// A call was refused because its circuit is open
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit breaker '{name}' is open and does not permit further calls")]
pub struct CallNotPermitted {
    pub name: String,
}

/// Circuit breaker that short-circuits calls to an unhealthy dependency
///
/// Opens after `failure_threshold` consecutive failures. Once open, calls
/// are refused until `recovery_timeout` has elapsed, after which a probe is
/// let through: success closes the circuit, failure restarts the timer.
#[derive(Clone)]
pub struct CircuitBreaker {
    name: Arc<str>,
    failure_threshold: u32,
    recovery_timeout: Duration,
    state: Arc<CircuitState>,
}

struct CircuitState {
    consecutive_failures: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
}

impl CircuitBreaker {
    /// Create a closed circuit breaker
    pub fn new(name: impl Into<Arc<str>>, failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold,
            recovery_timeout,
            state: Arc::new(CircuitState {
                consecutive_failures: AtomicU32::new(0),
                opened_at: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether the circuit lets a call through
    ///
    /// # Errors
    ///
    /// Returns [`CallNotPermitted`] while the circuit is open and the
    /// recovery timeout has not elapsed
    pub fn check(&self) -> Result<(), CallNotPermitted> {
        let opened_at = self.state.opened_at.lock().unwrap_or_else(PoisonError::into_inner);

        match *opened_at {
            None => Ok(()),
            Some(ts) if ts.elapsed() >= self.recovery_timeout => Ok(()),
            Some(_) => Err(CallNotPermitted {
                name: self.name.to_string(),
            }),
        }
    }

    /// Record a successful call, closing the circuit
    pub fn record_success(&self) {
        self.state.consecutive_failures.store(0, Ordering::Relaxed);

        let mut opened_at = self.state.opened_at.lock().unwrap_or_else(PoisonError::into_inner);
        if opened_at.take().is_some() {
            tracing::info!(circuit = %self.name, "circuit closed");
        }
    }

    /// Record a failed call, opening the circuit once the threshold is reached
    pub fn record_failure(&self) {
        let failures = self.state.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures < self.failure_threshold {
            return;
        }

        let mut opened_at = self.state.opened_at.lock().unwrap_or_else(PoisonError::into_inner);
        if opened_at.replace(Instant::now()).is_none() {
            tracing::warn!(circuit = %self.name, failures, "circuit opened");
        }
    }
}

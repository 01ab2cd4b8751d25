use anyhow::Context;
use keel_config::InsurerConfig;
use keel_core::{BusinessError, BusinessErrorMessage, TechnicalError, TechnicalErrorMessage};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::circuit::CircuitBreaker;

/// Insurer record as served by the insurer registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurer {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Client for the insurer registry, guarded by a circuit breaker
#[derive(Clone)]
pub struct InsurerClient {
    http: reqwest::Client,
    base_url: Url,
    circuit: CircuitBreaker,
}

impl InsurerClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: &InsurerConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build insurer HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            circuit: CircuitBreaker::new("insurer", config.failure_threshold, config.recovery_timeout),
        })
    }

    /// Fetch an active insurer by id
    ///
    /// Unknown and inactive insurers are business failures. Connection
    /// failures surface as an unavailable dependency, an unreadable payload
    /// as an internal error, timeouts and error statuses are passed on as
    /// is. Transport failures, timeouts and server-side errors count against
    /// the circuit.
    ///
    /// # Errors
    ///
    /// Returns an error for every outcome other than an active insurer
    pub async fn fetch(&self, id: &str) -> anyhow::Result<Insurer> {
        self.circuit.check()?;

        let url = self.insurer_url(id)?;
        tracing::debug!(%url, "fetching insurer");

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                self.circuit.record_failure();
                if e.is_connect() {
                    return Err(anyhow::Error::new(e).context(TechnicalError::from(
                        TechnicalErrorMessage::DependencyUnavailable,
                    )));
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_server_error() {
            self.circuit.record_failure();
        } else if status.is_client_error() {
            self.circuit.record_success();
        }

        if status == StatusCode::NOT_FOUND {
            return Err(BusinessError::from(BusinessErrorMessage::InsurerNotFound).into());
        }
        let response = response.error_for_status()?;

        let insurer: Insurer = match response.json().await {
            Ok(insurer) => insurer,
            Err(e) if e.is_timeout() => {
                self.circuit.record_failure();
                return Err(e.into());
            }
            Err(e) if e.is_decode() => {
                self.circuit.record_success();
                return Err(anyhow::Error::new(e).context(TechnicalError::from(TechnicalErrorMessage::InternalError)));
            }
            Err(e) => {
                self.circuit.record_failure();
                return Err(anyhow::Error::new(e).context(TechnicalError::from(
                    TechnicalErrorMessage::DependencyUnavailable,
                )));
            }
        };
        self.circuit.record_success();

        if !insurer.active {
            return Err(BusinessError::from(BusinessErrorMessage::InsurerNotActive).into());
        }

        Ok(insurer)
    }

    fn insurer_url(&self, id: &str) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("insurer base URL cannot have path segments"))?
            .pop_if_empty()
            .extend(["insurers", id]);
        Ok(url)
    }
}

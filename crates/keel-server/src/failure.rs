use std::fmt;
use std::io;

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use http::{Method, StatusCode};
use keel_core::{BusinessError, DomainError, TechnicalError};

use crate::circuit::CallNotPermitted;
use crate::extract::{json_rejection_failure, rejection_failure};
use crate::status::{reason_phrase, status_for_reason};
use crate::validation::{BindingErrors, ConstraintViolation, constraint_violations};

/// Caller-safe reason attached to binding failures
pub const BINDING_REASON: &str = "Validation failure";

/// Every failure the HTTP edge knows how to render
///
/// Produced by [`Failure::classify`] from an arbitrary error, or built
/// directly by extractors and fallbacks that already know what went wrong.
#[derive(Debug)]
pub enum Failure {
    /// A domain rule rejected the request
    Business(BusinessError),
    /// An infrastructure dependency failed
    Technical(TechnicalError),
    /// An outbound HTTP call answered with an error status
    Downstream { status: StatusCode, message: String },
    /// Request body bound but failed declarative validation
    Binding(BindingErrors),
    /// Constraint violations raised outside request binding
    ConstraintViolations(Vec<ConstraintViolation>),
    /// Request could not be read (malformed body, bad parameter)
    Input { reason: String },
    /// Payload decoding failed past the binding stage
    Decode { message: String },
    MethodNotAllowed { method: Method },
    UnsupportedMediaType { content_type: Option<String> },
    /// A bare status, optionally with a caller-safe reason
    Status { status: StatusCode, reason: Option<String> },
    /// An operation exceeded its deadline
    Timeout { message: String },
    /// A circuit breaker refused the call
    CircuitOpen { name: String },
    /// Anything not recognized above
    Unexpected(anyhow::Error),
}

impl Failure {
    /// Identify what kind of failure an error represents
    ///
    /// An error that already is a [`Failure`] is returned as is. Otherwise
    /// the cause chain is searched for known kinds in a fixed order: domain
    /// failures, outbound HTTP errors, extractor rejections, validation
    /// errors, decoding errors, timeouts, open circuits. The first kind found
    /// wins, even when a later kind sits closer to the root cause.
    /// Unrecognized errors become [`Failure::Unexpected`].
    pub fn classify(error: anyhow::Error) -> Self {
        let error = match error.downcast::<Self>() {
            Ok(failure) => return failure,
            Err(error) => error,
        };

        if let Some(business) = find::<BusinessError>(&error) {
            return Self::Business(business.clone());
        }
        if let Some(technical) = find::<TechnicalError>(&error) {
            return Self::Technical(technical.clone());
        }
        if let Some(failure) = find::<reqwest::Error>(&error).and_then(from_reqwest) {
            return failure;
        }
        if let Some(rejection) = find::<JsonRejection>(&error) {
            return json_rejection_failure(rejection, None);
        }
        if let Some(rejection) = find::<PathRejection>(&error) {
            return rejection_failure(rejection.status(), rejection.body_text());
        }
        if let Some(rejection) = find::<QueryRejection>(&error) {
            return rejection_failure(rejection.status(), rejection.body_text());
        }
        if let Some(rejection) = find::<FormRejection>(&error) {
            return rejection_failure(rejection.status(), rejection.body_text());
        }
        if let Some(errors) = find::<validator::ValidationErrors>(&error) {
            return Self::ConstraintViolations(constraint_violations(errors));
        }
        if let Some(decode) = find::<serde_json::Error>(&error) {
            return Self::Decode {
                message: decode.to_string(),
            };
        }
        if let Some(elapsed) = find::<tokio::time::error::Elapsed>(&error) {
            return Self::Timeout {
                message: elapsed.to_string(),
            };
        }
        if let Some(io) = find::<io::Error>(&error).filter(|e| e.kind() == io::ErrorKind::TimedOut) {
            return Self::Timeout { message: io.to_string() };
        }
        if let Some(refused) = find::<CallNotPermitted>(&error) {
            return Self::CircuitOpen {
                name: refused.name.clone(),
            };
        }

        Self::Unexpected(error)
    }

    /// Transport status for this failure
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Business(e) => status_for_reason(e.reason()),
            Self::Technical(e) => status_for_reason(e.reason()),
            Self::Downstream { status, .. } | Self::Status { status, .. } => *status,
            Self::Binding(_) | Self::ConstraintViolations(_) | Self::Input { .. } | Self::Decode { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::CircuitOpen { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Domain view of business and technical failures
    #[must_use]
    pub fn as_domain(&self) -> Option<&dyn DomainError> {
        match self {
            Self::Business(e) => Some(e),
            Self::Technical(e) => Some(e),
            _ => None,
        }
    }

    /// Reason text that is safe to show callers regardless of status
    ///
    /// Only failures raised at the request edge carry one. The returned
    /// text may be empty.
    #[must_use]
    pub fn caller_reason(&self) -> Option<String> {
        match self {
            Self::Binding(_) | Self::Input { .. } | Self::MethodNotAllowed { .. } | Self::UnsupportedMediaType { .. } => {
                Some(self.to_string())
            }
            Self::Status { reason, .. } => Some(reason.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Business(e) => fmt::Display::fmt(e, f),
            Self::Technical(e) => fmt::Display::fmt(e, f),
            Self::Downstream { message, .. } | Self::Decode { message } | Self::Timeout { message } => {
                f.write_str(message)
            }
            Self::Binding(_) => f.write_str(BINDING_REASON),
            Self::ConstraintViolations(violations) => {
                for (i, violation) in violations.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", violation.property_path, violation.message)?;
                }
                Ok(())
            }
            Self::Input { reason } => f.write_str(reason),
            Self::MethodNotAllowed { method } => write!(f, "Request method '{method}' is not supported"),
            Self::UnsupportedMediaType {
                content_type: Some(content_type),
            } => write!(f, "Content type '{content_type}' not supported"),
            Self::UnsupportedMediaType { content_type: None } => f.write_str("Content type not specified"),
            Self::Status { status, reason } => f.write_str(reason.as_deref().unwrap_or_else(|| reason_phrase(*status))),
            Self::CircuitOpen { name } => {
                write!(f, "circuit breaker '{name}' is open and does not permit further calls")
            }
            Self::Unexpected(e) => write!(f, "{e:#}"),
        }
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Business(e) => Some(e),
            Self::Technical(e) => Some(e),
            Self::Unexpected(e) => {
                let source: &(dyn std::error::Error + 'static) = e.as_ref();
                Some(source)
            }
            _ => None,
        }
    }
}

/// Search an error and its causes for a concrete type
///
/// `anyhow`'s own downcast sees context values, the cause chain sees
/// wrapped sources.
fn find<T>(error: &anyhow::Error) -> Option<&T>
where
    T: std::error::Error + Send + Sync + 'static,
{
    error
        .downcast_ref::<T>()
        .or_else(|| error.chain().find_map(|cause| cause.downcast_ref::<T>()))
}

fn from_reqwest(error: &reqwest::Error) -> Option<Failure> {
    if let Some(status) = error.status() {
        return Some(Failure::Downstream {
            status,
            message: error.to_string(),
        });
    }

    error.is_timeout().then(|| Failure::Timeout {
        message: error.to_string(),
    })
}

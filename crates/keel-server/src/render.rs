use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use keel_core::CorrelationId;

use crate::correlation::{CORRELATION_ID, CorrelationSources, request_header};
use crate::failure::Failure;
use crate::problem::{PROBLEM_JSON, ProblemBody};

/// Handler error that renders as a problem document
///
/// Any error converts into `ApiError` through [`Failure::classify`], so
/// handlers can use `?` on whatever they call. The response it produces is
/// only a marker; [`render_problem_middleware`] writes the actual body.
#[derive(Debug)]
pub struct ApiError(Failure);

impl ApiError {
    #[must_use]
    pub const fn new(failure: Failure) -> Self {
        Self(failure)
    }

    #[must_use]
    pub const fn failure(&self) -> &Failure {
        &self.0
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        Self(Failure::classify(error.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.0.status().into_response();
        response.extensions_mut().insert(PendingFailure(Arc::new(self.0)));
        response
    }
}

/// Failure awaiting rendering
#[derive(Clone)]
struct PendingFailure(Arc<Failure>);

/// Middleware that turns failed responses into problem documents
///
/// Picks up failures raised through [`ApiError`], and also normalizes any
/// other error-status response that is not already problem JSON, so that
/// framework rejections share the same shape.
pub async fn render_problem_middleware(request: Request, next: Next) -> Response {
    let instance = request.uri().path().to_owned();
    let inbound = request_header(request.headers());
    let context = request.extensions().get::<CorrelationId>().cloned();

    let mut response = next.run(request).await;

    let failure = match response.extensions_mut().remove::<PendingFailure>() {
        Some(PendingFailure(failure)) => failure,
        None if needs_rendering(&response) => Arc::new(Failure::Status {
            status: response.status(),
            reason: None,
        }),
        None => return response,
    };

    let sources = CorrelationSources {
        request_header: inbound,
        context,
        transport: response.extensions().get::<CorrelationId>().cloned(),
        response_header: request_header(response.headers()),
    };
    let correlation_id = sources.resolve().unwrap_or_else(CorrelationId::generate);

    let problem = ProblemBody::from_failure(&failure, instance, &correlation_id);
    log_failure(&failure, &problem);

    into_problem_response(response, failure.status(), &problem, &correlation_id)
}

/// Fallback for paths with no route
pub async fn not_found() -> ApiError {
    ApiError::new(Failure::Status {
        status: StatusCode::NOT_FOUND,
        reason: None,
    })
}

/// Fallback for routed paths hit with an unsupported method
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::new(Failure::MethodNotAllowed { method })
}

/// Response for a handler that panicked, for `CatchPanicLayer`
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());

    ApiError::new(Failure::Unexpected(anyhow::anyhow!("handler panicked: {message}"))).into_response()
}

fn needs_rendering(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error()) && !is_problem(response.headers())
}

fn is_problem(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(PROBLEM_JSON))
}

fn log_failure(failure: &Failure, problem: &ProblemBody) {
    if problem.status >= 500 {
        tracing::error!(
            status = problem.status,
            problem_type = problem.problem_type,
            code = problem.code.as_deref(),
            instance = %problem.instance,
            correlation_id = %problem.correlation_id,
            error = ?failure,
            "handled error"
        );
    } else {
        tracing::warn!(
            status = problem.status,
            problem_type = problem.problem_type,
            code = problem.code.as_deref(),
            instance = %problem.instance,
            correlation_id = %problem.correlation_id,
            "handled error"
        );
    }
}

fn into_problem_response(
    response: Response,
    status: StatusCode,
    problem: &ProblemBody,
    correlation_id: &CorrelationId,
) -> Response {
    let body = match serde_json::to_vec(problem) {
        Ok(body) => Body::from(body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize problem body");
            Body::empty()
        }
    };

    let (mut parts, _) = response.into_parts();
    parts.status = status;
    parts.headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
    parts.headers.remove(CONTENT_LENGTH);
    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        parts.headers.insert(CORRELATION_ID, value);
    }

    Response::from_parts(parts, body)
}

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::{HeaderMap, HeaderName, HeaderValue};
use keel_core::CorrelationId;
use tracing::Span;

/// Wire name of the correlation header, lowercased for `http`
pub const CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Middleware that assigns every request a correlation id
///
/// A non-blank inbound `X-Correlation-Id` is adopted as is, otherwise a
/// fresh id is generated. The id is written back onto the request header,
/// stored in request extensions for handlers and later middleware, and
/// echoed on the response.
pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = header_id(request.headers().get(CORRELATION_ID)).unwrap_or_else(CorrelationId::generate);
    let header_value = HeaderValue::from_str(correlation_id.as_str()).ok();

    if let Some(value) = &header_value {
        request.headers_mut().insert(CORRELATION_ID, value.clone());
    }
    request.extensions_mut().insert(correlation_id);

    let mut response = next.run(request).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(CORRELATION_ID, value);
    }

    response
}

/// Request span carrying the correlation id, for `TraceLayer`
pub fn request_span(request: &Request) -> Span {
    let correlation_id = request
        .extensions()
        .get::<CorrelationId>()
        .map_or("", CorrelationId::as_str);

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        correlation_id,
    )
}

/// Places a correlation id may be found while rendering a failure
#[derive(Debug, Clone, Default)]
pub struct CorrelationSources {
    /// Inbound request header
    pub request_header: Option<HeaderValue>,
    /// Id stored in request extensions by the middleware
    pub context: Option<CorrelationId>,
    /// Id attached to the response by the handler
    pub transport: Option<CorrelationId>,
    /// Header already set on the outgoing response
    pub response_header: Option<HeaderValue>,
}

impl CorrelationSources {
    /// First non-blank id, in declaration order
    #[must_use]
    pub fn resolve(&self) -> Option<CorrelationId> {
        header_id(self.request_header.as_ref())
            .or_else(|| self.context.clone())
            .or_else(|| self.transport.clone())
            .or_else(|| header_id(self.response_header.as_ref()))
    }
}

pub(crate) fn header_id(value: Option<&HeaderValue>) -> Option<CorrelationId> {
    value?.to_str().ok().and_then(CorrelationId::parse)
}

pub(crate) fn request_header(headers: &HeaderMap) -> Option<HeaderValue> {
    headers.get(CORRELATION_ID).cloned()
}

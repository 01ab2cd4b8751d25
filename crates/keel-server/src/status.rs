//! HTTP binding of the failure taxonomy
//!
//! The only place where a [`Reason`] becomes a transport status. Another
//! transport replaces this table and nothing else.

use http::StatusCode;
use keel_core::Reason;

/// Status code for a classified failure
#[must_use]
pub const fn status_for_reason(reason: Reason) -> StatusCode {
    match reason {
        Reason::NotFound => StatusCode::NOT_FOUND,
        Reason::InvalidInput => StatusCode::BAD_REQUEST,
        Reason::Conflict => StatusCode::CONFLICT,
        Reason::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        Reason::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Reason::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Standard reason phrase for a status (e.g. "Not Found")
#[must_use]
pub fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn reason_table() {
        let cases = [
            (Reason::NotFound, 404),
            (Reason::InvalidInput, 400),
            (Reason::Conflict, 409),
            (Reason::Unprocessable, 422),
            (Reason::ServiceUnavailable, 503),
            (Reason::InternalError, 500),
        ];

        for (reason, expected) in cases {
            assert_eq!(status_for_reason(reason).as_u16(), expected, "{reason}");
        }
    }

    #[test]
    fn every_reason_is_an_error_status() {
        for reason in Reason::iter() {
            let status = status_for_reason(reason);
            assert!(status.is_client_error() || status.is_server_error(), "{reason}");
        }
    }

    #[test]
    fn phrases() {
        assert_eq!(reason_phrase(StatusCode::INTERNAL_SERVER_ERROR), "Internal Server Error");
        assert_eq!(reason_phrase(StatusCode::GATEWAY_TIMEOUT), "Gateway Timeout");
        assert_eq!(reason_phrase(StatusCode::from_u16(599).unwrap()), "Unknown Status");
    }
}

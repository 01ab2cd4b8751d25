//! RFC 7807 problem documents
//!
//! Every failure that leaves the service is described by a [`ProblemBody`].
//! Building one is pure: the same failure, path, and correlation id always
//! yield the same document apart from its timestamp.

use http::StatusCode;
use jiff::Timestamp;
use keel_core::CorrelationId;
use serde::Serialize;

use crate::failure::Failure;
use crate::status::reason_phrase;

/// Media type of every rendered failure
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Problem type used for every document
pub const PROBLEM_TYPE: &str = "about:blank";

/// Detail shown for server-side failures in place of the real message
pub const GENERIC_SERVER_DETAIL: &str = "An unexpected error occurred";

const GENERIC_CLIENT_DETAIL: &str = "Unexpected error";
const DEFAULT_ITEM_MESSAGE: &str = "Invalid value";

const VALIDATION_CODE: &str = "VALIDATION_ERROR";
const VALIDATION_TITLE: &str = "Validation Failed";
const INPUT_CODE: &str = "INVALID_INPUT";
const INPUT_TITLE: &str = "Invalid Input";

/// Problem details document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemBody {
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    pub title: String,
    pub status: u16,
    pub detail: String,
    /// Request path the failure occurred on
    pub instance: String,
    pub timestamp: Timestamp,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Itemized detail, omitted rather than empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ProblemItem>>,
}

/// One entry in a problem's `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProblemItem {
    Field { field: String, message: String },
    Object { object: String, message: String },
    Code { code: String, message: String },
}

impl ProblemBody {
    /// Describe a failure that happened on `instance`
    pub fn from_failure(failure: &Failure, instance: impl Into<String>, correlation_id: &CorrelationId) -> Self {
        let status = failure.status();

        Self {
            problem_type: PROBLEM_TYPE,
            title: title(failure, status),
            status: status.as_u16(),
            detail: detail(failure, status),
            instance: instance.into(),
            timestamp: Timestamp::now(),
            correlation_id: correlation_id.to_string(),
            code: code(failure),
            errors: items(failure),
        }
    }
}

fn title(failure: &Failure, status: StatusCode) -> String {
    if let Some(domain) = failure.as_domain() {
        return domain.title().to_owned();
    }

    match failure {
        Failure::Binding(_) | Failure::ConstraintViolations(_) => VALIDATION_TITLE.to_owned(),
        Failure::Input { .. } => INPUT_TITLE.to_owned(),
        _ => reason_phrase(status).to_owned(),
    }
}

fn detail(failure: &Failure, status: StatusCode) -> String {
    if let Some(reason) = failure.caller_reason() {
        return if reason.trim().is_empty() {
            reason_phrase(status).to_owned()
        } else {
            reason
        };
    }

    if status.is_server_error() {
        return GENERIC_SERVER_DETAIL.to_owned();
    }

    let message = failure.to_string();
    if message.trim().is_empty() {
        GENERIC_CLIENT_DETAIL.to_owned()
    } else {
        message
    }
}

fn code(failure: &Failure) -> Option<String> {
    if let Some(domain) = failure.as_domain() {
        return Some(domain.code().to_owned());
    }

    match failure {
        Failure::Binding(_) | Failure::ConstraintViolations(_) => Some(VALIDATION_CODE.to_owned()),
        Failure::Input { .. } => Some(INPUT_CODE.to_owned()),
        _ => None,
    }
}

fn items(failure: &Failure) -> Option<Vec<ProblemItem>> {
    let items: Vec<_> = match failure {
        Failure::Binding(binding) => binding
            .field_errors
            .iter()
            .map(|e| ProblemItem::Field {
                field: e.field.clone(),
                message: item_message(e.message.as_deref()),
            })
            .chain(binding.object_errors.iter().map(|e| ProblemItem::Object {
                object: e.object.clone(),
                message: item_message(e.message.as_deref()),
            }))
            .collect(),
        Failure::ConstraintViolations(violations) => violations
            .iter()
            .map(|v| ProblemItem::Field {
                field: v.property_path.clone(),
                message: item_message(Some(&v.message)),
            })
            .collect(),
        _ => failure
            .as_domain()?
            .errors()
            .iter()
            .map(|e| ProblemItem::Code {
                code: e.code().to_owned(),
                message: e.message().to_owned(),
            })
            .collect(),
    };

    (!items.is_empty()).then_some(items)
}

fn item_message(message: Option<&str>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_ITEM_MESSAGE)
        .to_owned()
}

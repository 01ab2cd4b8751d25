use serde::{Deserialize, Serialize};

/// Abstract failure category, independent of any wire protocol
///
/// Every classified failure carries exactly one reason. Transport bindings
/// decide how a reason is represented on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// The requested resource does not exist
    NotFound,
    /// The request is syntactically or structurally invalid
    InvalidInput,
    /// The request conflicts with the current state (e.g. a duplicate)
    Conflict,
    /// The request is well formed but violates a business rule
    Unprocessable,
    /// A dependency is down or saturated
    ServiceUnavailable,
    /// Something went wrong that the caller cannot act on
    InternalError,
}

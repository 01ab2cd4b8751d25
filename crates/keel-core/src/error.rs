use thiserror::Error;

use crate::{BusinessErrorMessage, CatalogEntry, ErrorMessage, Reason, TechnicalErrorMessage};

/// Capability shared by every classified failure
///
/// The translation layer only needs these accessors (plus `Display` for the
/// message) to render a failure, whatever its origin.
pub trait DomainError: std::error::Error + Send + Sync + 'static {
    /// Stable machine identifier (e.g. `PRB-004`)
    fn code(&self) -> &str;

    /// Short semantic label
    fn title(&self) -> &str;

    /// Abstract failure category
    fn reason(&self) -> Reason;

    /// Itemized detail, possibly empty
    fn errors(&self) -> &[ErrorMessage];
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Classification {
    code: String,
    message: String,
    title: String,
    reason: Reason,
    errors: Vec<ErrorMessage>,
}

impl Classification {
    fn from_entry(entry: &CatalogEntry, errors: Option<Vec<ErrorMessage>>) -> Self {
        Self {
            code: entry.code.to_owned(),
            message: entry.message.to_owned(),
            title: entry.title.to_owned(),
            reason: entry.reason,
            errors: errors.unwrap_or_default(),
        }
    }
}

/// A domain rule rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.message)]
pub struct BusinessError(Classification);

/// An infrastructure dependency failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.message)]
pub struct TechnicalError(Classification);

macro_rules! classified {
    ($error:ident, $catalog:ident) => {
        impl $error {
            /// Build from a catalog entry with no itemized detail
            #[must_use]
            pub fn from_entry(entry: $catalog) -> Self {
                Self::with_errors(entry, None)
            }

            /// Build from a catalog entry with optional itemized detail
            ///
            /// `None` yields an empty detail list.
            #[must_use]
            pub fn with_errors(entry: $catalog, errors: Option<Vec<ErrorMessage>>) -> Self {
                Self(Classification::from_entry(entry.entry(), errors))
            }

            /// Build an uncatalogued failure from free-form fields
            ///
            /// Used for dynamic cases such as error text relayed from another
            /// system that still needs uniform rendering.
            pub fn new(
                code: impl Into<String>,
                message: impl Into<String>,
                title: impl Into<String>,
                reason: Reason,
                errors: Option<Vec<ErrorMessage>>,
            ) -> Self {
                Self(Classification {
                    code: code.into(),
                    message: message.into(),
                    title: title.into(),
                    reason,
                    errors: errors.unwrap_or_default(),
                })
            }

            #[must_use]
            pub fn message(&self) -> &str {
                &self.0.message
            }
        }

        impl From<$catalog> for $error {
            fn from(entry: $catalog) -> Self {
                Self::from_entry(entry)
            }
        }

        impl DomainError for $error {
            fn code(&self) -> &str {
                &self.0.code
            }

            fn title(&self) -> &str {
                &self.0.title
            }

            fn reason(&self) -> Reason {
                self.0.reason
            }

            fn errors(&self) -> &[ErrorMessage] {
                &self.0.errors
            }
        }
    };
}

classified!(BusinessError, BusinessErrorMessage);
classified!(TechnicalError, TechnicalErrorMessage);

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Identifier tying together one request, its response, and its log lines
///
/// Assigned once per request and never changed afterwards. Cloning is cheap
/// so every layer can hold its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Adopt a caller-supplied value
    ///
    /// Returns `None` for blank input so the caller can fall back to
    /// [`CorrelationId::generate`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        (!value.is_empty()).then(|| Self(value.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

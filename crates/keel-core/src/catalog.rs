use crate::Reason;

/// A fixed, named failure description
///
/// Entries are authored once, at build time. The `reason` is the only
/// signal a transport binding uses to pick a status for failures built from
/// this entry, and `title` is a semantic label distinct from the
/// transport's generic status phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable machine identifier, unique within its catalog (e.g. `PRB-001`)
    pub code: &'static str,
    /// Default human-readable failure text
    pub message: &'static str,
    /// Abstract failure category
    pub reason: Reason,
    /// Short semantic label
    pub title: &'static str,
}

macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => ($code:literal, $message:literal, $reason:ident, $title:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            strum::Display,
            strum::EnumString,
            strum::EnumIter,
            strum::IntoStaticStr,
        )]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Catalog entry for this symbolic name
            #[must_use]
            pub const fn entry(self) -> &'static CatalogEntry {
                match self {
                    $(
                        Self::$variant => &CatalogEntry {
                            code: $code,
                            message: $message,
                            reason: Reason::$reason,
                            title: $title,
                        },
                    )+
                }
            }
        }
    };
}

catalog! {
    /// Failures raised when a domain rule rejects a request
    BusinessErrorMessage {
        InsurerNotFound => ("PRB-001", "Insurer not found", NotFound, "Resource Not Found"),
        InsurerNotActive => ("PRB-002", "Insurer not active", Unprocessable, "Business Rule Violation"),
        InvalidBirthDate => ("PRB-003", "Invalid birth date", InvalidInput, "Invalid Input"),
        DuplicatePatient => ("PRB-004", "Patient already exists for DNI", Conflict, "Conflict"),
        PatientNotFound => ("PRB-005", "Patient not found for DNI", NotFound, "Resource Not Found"),
        InvalidInput => ("PRB-006", "Invalid input", InvalidInput, "Invalid Input"),
    }
}

catalog! {
    /// Failures raised by infrastructure: dependencies, storage, file output
    TechnicalErrorMessage {
        DependencyUnavailable => ("PRT-001", "Insurer service unavailable", ServiceUnavailable, "Service Unavailable"),
        InternalError => ("PRT-002", "Internal error", InternalError, "Internal Server Error"),
        DatabaseUnavailable => ("PRT-003", "Database service unavailable", ServiceUnavailable, "Service Unavailable"),
        FileGenerationError => ("PRT-004", "File generation error", InternalError, "Internal Server Error"),
    }
}

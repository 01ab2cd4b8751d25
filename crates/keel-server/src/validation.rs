use convert_case::{Case, Casing};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Key `validator` uses for struct-level (schema) errors
const SCHEMA_KEY: &str = "__all__";

/// A rejected request field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path to the field, e.g. `items[0].name`
    pub field: String,
    pub message: Option<String>,
}

/// A rejection of the request object as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectError {
    pub object: String,
    pub message: Option<String>,
}

/// Outcome of validating a bound request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingErrors {
    pub field_errors: Vec<FieldError>,
    pub object_errors: Vec<ObjectError>,
}

impl BindingErrors {
    /// Split `validator` output into field and object errors
    ///
    /// Fields are visited in name order so output is stable. Schema errors
    /// on nested structs are reported against the nested field's path;
    /// only top-level schema errors become object errors.
    #[must_use]
    pub fn from_validation(errors: &ValidationErrors, object: &str) -> Self {
        let mut binding = Self::default();

        for (path, error) in flatten(errors) {
            let message = message_of(error);
            if path.is_empty() {
                binding.object_errors.push(ObjectError {
                    object: object.to_owned(),
                    message,
                });
            } else {
                binding.field_errors.push(FieldError { field: path, message });
            }
        }

        binding
    }
}

/// A single failed constraint outside request binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Dotted path to the offending value, empty for the root object
    pub property_path: String,
    pub message: String,
}

/// Flatten `validator` output into violations, falling back to the error
/// code when no message was declared
#[must_use]
pub fn constraint_violations(errors: &ValidationErrors) -> Vec<ConstraintViolation> {
    flatten(errors)
        .into_iter()
        .map(|(property_path, error)| ConstraintViolation {
            property_path,
            message: message_of(error).unwrap_or_else(|| error.code.to_string()),
        })
        .collect()
}

/// Object name reported for a request type, e.g. `createTaskRequest`
pub(crate) fn object_name<T>() -> String {
    let name = std::any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name).to_case(Case::Camel)
}

fn flatten(errors: &ValidationErrors) -> Vec<(String, &ValidationError)> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out
}

fn collect<'a>(errors: &'a ValidationErrors, prefix: &str, out: &mut Vec<(String, &'a ValidationError)>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by_cached_key(|(field, _)| field.to_string());

    for (field, kind) in entries {
        let path = join(prefix, &field.to_string());
        match kind {
            ValidationErrorsKind::Field(list) => out.extend(list.iter().map(|error| (path.clone(), error))),
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn join(prefix: &str, field: &str) -> String {
    if field == SCHEMA_KEY {
        prefix.to_owned()
    } else if prefix.is_empty() {
        field.to_owned()
    } else {
        format!("{prefix}.{field}")
    }
}

fn message_of(error: &ValidationError) -> Option<String> {
    error.message.as_ref().map(ToString::to_string)
}

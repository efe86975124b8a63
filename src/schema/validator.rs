//! Field-indexed validation errors and the `Schema` contract

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::ClassLevel;

/// A validation failure attached to one field path
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{path}: {message}")]
#[diagnostic(code(enroll::schema::field))]
pub struct FieldError {
    path: String,
    message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Field path, e.g. `lastExamPercentage`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every failing field of one validation pass, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Diagnostic)]
#[error("Validation failed: {} field error(s)", .errors.len())]
#[diagnostic(
    code(enroll::schema::validation_error),
    help("Correct the listed fields and try again")
)]
pub struct FieldErrors {
    #[related]
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. A field keeps only its first error.
    pub fn push(&mut self, error: FieldError) {
        if !self.contains(error.path()) {
            self.errors.push(error);
        }
    }

    /// Record an error, replacing any earlier one for the same field
    pub fn replace(&mut self, error: FieldError) {
        match self.errors.iter_mut().find(|e| e.path == error.path) {
            Some(existing) => *existing = error,
            None => self.errors.push(error),
        }
    }

    /// Message for a field, if it failed
    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.path == path)
            .map(FieldError::message)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.errors.iter().map(FieldError::path).collect()
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Facts from other steps that a schema needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaContext {
    /// Class chosen in step 1; drives the subject minimum
    pub class: Option<ClassLevel>,
}

impl SchemaContext {
    pub fn with_class(class: Option<ClassLevel>) -> Self {
        Self { class }
    }
}

/// A step's validation rules.
///
/// Maps a candidate draft to either the normalized, strongly typed output or
/// the complete list of failing fields. Never panics.
pub trait Schema {
    type Output;

    fn validate(&self, ctx: &SchemaContext) -> Result<Self::Output, FieldErrors>;

    fn is_valid(&self, ctx: &SchemaContext) -> bool {
        self.validate(ctx).is_ok()
    }
}

/// Accumulates rule outcomes while a schema walks its fields
#[derive(Debug, Default)]
pub(crate) struct Checks {
    errors: FieldErrors,
}

impl Checks {
    /// Keep the value of a passing rule, or record its message against `path`
    pub(crate) fn field<T>(&mut self, path: &str, outcome: Result<T, String>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(message) => {
                self.fail(path, message);
                None
            }
        }
    }

    pub(crate) fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    pub(crate) fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keeps_first_error() {
        let mut errors = FieldErrors::new();
        errors.push(FieldError::new("email", "first"));
        errors.push(FieldError::new("email", "second"));
        errors.push(FieldError::new("mobile", "bad"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("first"));
        assert_eq!(errors.paths(), vec!["email", "mobile"]);
    }

    #[test]
    fn test_replace_overrides_existing() {
        let mut errors = FieldErrors::from(FieldError::new("weeklyStudyHours", "Required"));
        errors.replace(FieldError::new("weeklyStudyHours", "Expected a number"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("weeklyStudyHours"), Some("Expected a number"));
    }

    #[test]
    fn test_checks_finish() {
        let mut checks = Checks::default();
        assert_eq!(checks.field("a", Ok::<_, String>(1)), Some(1));
        assert!(Checks::default().finish().is_ok());

        assert_eq!(checks.field::<u8>("b", Err("nope".to_string())), None);
        let errors = checks.finish().unwrap_err();
        assert_eq!(errors.get("b"), Some("nope"));
    }

    #[test]
    fn test_display_counts_errors() {
        let mut errors = FieldErrors::new();
        errors.push(FieldError::new("city", "Please enter your city"));
        assert_eq!(errors.to_string(), "Validation failed: 1 field error(s)");
    }
}

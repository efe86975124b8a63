//! Structural check of a persisted state file against the embedded JSON Schema

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// JSON Schema for the durable envelope
pub const ENVELOPE_SCHEMA: &str = include_str!("../../schemas/envelope.schema.json");

/// A state file that does not match the envelope schema
#[derive(Debug, Error, Diagnostic)]
#[error("State file is not a valid enrollment envelope: {summary}")]
#[diagnostic(
    code(enroll::schema::envelope),
    help("Run `enroll reset` to discard the saved state")
)]
pub struct EnvelopeError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<EnvelopeViolation>,
}

impl EnvelopeError {
    fn new(filename: &str, source: &str, violations: Vec<EnvelopeViolation>) -> Self {
        let summary = if violations.len() == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", violations.len())
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[EnvelopeViolation] {
        &self.violations
    }
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct EnvelopeViolation {
    #[label("here")]
    span: SourceSpan,

    /// JSON pointer to the offending value
    pub path: String,

    pub message: String,
}

/// Problems preparing the validator itself
#[derive(Debug, Error)]
pub enum EnvelopeSchemaError {
    #[error("Embedded envelope schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Embedded envelope schema failed to compile: {0}")]
    Compile(String),
}

/// Compiled envelope schema
pub struct EnvelopeValidator {
    compiled: JsonValidator,
}

impl EnvelopeValidator {
    pub fn new() -> Result<Self, EnvelopeSchemaError> {
        let schema: JsonValue = serde_json::from_str(ENVELOPE_SCHEMA)?;
        let compiled =
            validator_for(&schema).map_err(|e| EnvelopeSchemaError::Compile(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Check envelope text, collecting every violation
    pub fn check(&self, content: &str, filename: &str) -> Result<(), EnvelopeError> {
        let value: JsonValue = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let offset = line_col_to_offset(content, e.line(), e.column());
                let violation = EnvelopeViolation {
                    span: (offset, 1).into(),
                    path: String::new(),
                    message: format!("JSON parse error: {}", e),
                };
                return Err(EnvelopeError::new(filename, content, vec![violation]));
            }
        };

        let violations: Vec<EnvelopeViolation> = self
            .compiled
            .iter_errors(&value)
            .map(|e| to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(EnvelopeError::new(filename, content, violations))
        }
    }
}

fn to_violation(content: &str, error: &JsonSchemaError) -> EnvelopeViolation {
    let path = error.instance_path.to_string();
    let location = if path.is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", path)
    };

    let message = match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", name, location)
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", location, kind)
        }
        _ => format!("{} at {}", error, location),
    };

    EnvelopeViolation {
        span: find_key_span(content, &path),
        path,
        message,
    }
}

/// Span of the last key named in a JSON pointer, or the start of the document
fn find_key_span(content: &str, pointer: &str) -> SourceSpan {
    let key = pointer.rsplit('/').find(|segment| {
        !segment.is_empty() && !segment.chars().all(|c| c.is_ascii_digit())
    });
    key.and_then(|key| {
        let quoted = format!("\"{}\"", key);
        content.find(&quoted).map(|start| (start, quoted.len()).into())
    })
    .unwrap_or_else(|| (0, 0).into())
}

/// Convert a 1-based line/column into a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return offset + column.saturating_sub(1).min(text.len());
        }
        offset += text.len();
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> EnvelopeValidator {
        EnvelopeValidator::new().unwrap()
    }

    #[test]
    fn test_empty_envelope_is_valid() {
        let json = r#"{"studentDetails":{},"academicDetails":{},"addressGuardian":{},"completedSteps":[]}"#;
        assert!(validator().check(json, "state.json").is_ok());
    }

    #[test]
    fn test_wrong_types_are_reported() {
        let json = r#"{
  "studentDetails": {"fullName": 42},
  "academicDetails": {"weeklyStudyHours": "ten"},
  "addressGuardian": {},
  "completedSteps": [1, 4]
}"#;
        let err = validator().check(json, "state.json").unwrap_err();
        assert_eq!(err.violation_count(), 3);
        let paths: Vec<&str> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"/studentDetails/fullName"));
        assert!(paths.contains(&"/academicDetails/weeklyStudyHours"));
        assert!(paths.contains(&"/completedSteps/1"));
    }

    #[test]
    fn test_missing_group_is_reported() {
        let json = r#"{"studentDetails":{},"academicDetails":{},"completedSteps":[]}"#;
        let err = validator().check(json, "state.json").unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message.contains("addressGuardian"));
    }

    #[test]
    fn test_malformed_json() {
        let err = validator().check("{ not json", "state.json").unwrap_err();
        assert!(err.violations()[0].message.starts_with("JSON parse error"));
    }
}

//! Schema system - per-step validation rules, envelope checks and prompts

pub mod academic;
pub mod address;
pub mod enrollment;
pub mod envelope;
pub mod rules;
pub mod student;
pub mod validator;
pub mod wizard;

pub use envelope::{EnvelopeError, EnvelopeValidator};
pub use validator::{FieldError, FieldErrors, Schema, SchemaContext};
pub use wizard::{FieldKind, FieldPrompt, StepWizard};

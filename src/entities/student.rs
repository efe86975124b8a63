//! Step 1 - student details

use serde::{Deserialize, Serialize};

use crate::core::store::PersistedState;
use crate::entities::{take_present, Board, ClassLevel, FormGroup, Group, GroupPatch, Language};
use crate::schema::validator::FieldError;

/// In-progress student details as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
}

/// Validated student details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    /// Full name, trimmed
    pub full_name: String,
    pub email: String,
    /// 10-digit mobile number without country prefix
    pub mobile: String,
    pub class: ClassLevel,
    pub board: Board,
    pub preferred_language: Language,
}

impl StudentDraft {
    /// The selected class, if it is one we offer
    pub fn class_level(&self) -> Option<ClassLevel> {
        self.class.as_deref().and_then(|c| c.parse().ok())
    }
}

impl From<&StudentDetails> for StudentDraft {
    fn from(details: &StudentDetails) -> Self {
        Self {
            full_name: Some(details.full_name.clone()),
            email: Some(details.email.clone()),
            mobile: Some(details.mobile.clone()),
            class: Some(details.class.to_string()),
            board: Some(details.board.to_string()),
            preferred_language: Some(details.preferred_language.to_string()),
        }
    }
}

impl From<StudentDraft> for GroupPatch {
    fn from(draft: StudentDraft) -> Self {
        GroupPatch::Student(draft)
    }
}

impl FormGroup for StudentDraft {
    const GROUP: Group = Group::Student;

    const FIELDS: &'static [&'static str] = &[
        "fullName",
        "email",
        "mobile",
        "class",
        "board",
        "preferredLanguage",
    ];

    fn set_field(&mut self, field: &str, raw: &str) -> Result<(), FieldError> {
        let value = Some(raw.to_string());
        match field {
            "fullName" => self.full_name = value,
            "email" => self.email = value,
            "mobile" => self.mobile = value,
            "class" => self.class = value,
            "board" => self.board = value,
            "preferredLanguage" => self.preferred_language = value,
            _ => return Err(FieldError::new(field, "Unknown field")),
        }
        Ok(())
    }

    fn clear_field(&mut self, field: &str) {
        match field {
            "fullName" => self.full_name = None,
            "email" => self.email = None,
            "mobile" => self.mobile = None,
            "class" => self.class = None,
            "board" => self.board = None,
            "preferredLanguage" => self.preferred_language = None,
            _ => {}
        }
    }

    fn has_value(&self, field: &str) -> bool {
        match field {
            "fullName" => self.full_name.is_some(),
            "email" => self.email.is_some(),
            "mobile" => self.mobile.is_some(),
            "class" => self.class.is_some(),
            "board" => self.board.is_some(),
            "preferredLanguage" => self.preferred_language.is_some(),
            _ => false,
        }
    }

    fn merge(&mut self, patch: Self) {
        take_present(&mut self.full_name, patch.full_name);
        take_present(&mut self.email, patch.email);
        take_present(&mut self.mobile, patch.mobile);
        take_present(&mut self.class, patch.class);
        take_present(&mut self.board, patch.board);
        take_present(&mut self.preferred_language, patch.preferred_language);
    }

    fn slice(state: &PersistedState) -> &Self {
        &state.student_details
    }
}

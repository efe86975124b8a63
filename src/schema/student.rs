//! Step 1 rules

use crate::entities::{Board, ClassLevel, Language, StudentDetails, StudentDraft};
use crate::schema::rules::{self, LengthMessages};
use crate::schema::validator::{Checks, FieldErrors, Schema, SchemaContext};

const FULL_NAME: LengthMessages<'static> = LengthMessages {
    too_short: "Name must be at least 2 characters",
    too_long: "Name must not exceed 60 characters",
};

/// Field rules for step 1; `None` if any field failed
pub(crate) fn student_fields(draft: &StudentDraft, checks: &mut Checks) -> Option<StudentDetails> {
    let full_name = checks.field(
        "fullName",
        rules::person_name(draft.full_name.as_deref(), 2, Some(60), &FULL_NAME),
    );
    let email = checks.field("email", rules::email(draft.email.as_deref()));
    let mobile = checks.field("mobile", rules::mobile(draft.mobile.as_deref()));
    let class = checks.field(
        "class",
        rules::selection::<ClassLevel>(draft.class.as_deref(), "Please select your class"),
    );
    let board = checks.field(
        "board",
        rules::selection::<Board>(draft.board.as_deref(), "Please select your board"),
    );
    let preferred_language = checks.field(
        "preferredLanguage",
        rules::selection::<Language>(
            draft.preferred_language.as_deref(),
            "Please select your preferred language",
        ),
    );

    let (Some(full_name), Some(email), Some(mobile), Some(class), Some(board), Some(preferred_language)) =
        (full_name, email, mobile, class, board, preferred_language)
    else {
        return None;
    };

    Some(StudentDetails {
        full_name,
        email,
        mobile,
        class,
        board,
        preferred_language,
    })
}

impl Schema for StudentDraft {
    type Output = StudentDetails;

    fn validate(&self, _ctx: &SchemaContext) -> Result<StudentDetails, FieldErrors> {
        let mut checks = Checks::default();
        let details = student_fields(self, &mut checks);
        checks.finish()?;
        details.ok_or_else(FieldErrors::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> StudentDraft {
        StudentDraft {
            full_name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            mobile: Some("9876543210".to_string()),
            class: Some("11".to_string()),
            board: Some("CBSE".to_string()),
            preferred_language: Some("Hinglish".to_string()),
        }
    }

    #[test]
    fn test_valid_student_is_normalized() {
        let mut draft = valid_draft();
        draft.full_name = Some("   Asha Rao  ".to_string());

        let details = draft.validate(&SchemaContext::default()).unwrap();
        assert_eq!(details.full_name, "Asha Rao");
        assert_eq!(details.class, ClassLevel::Eleven);
        assert_eq!(details.board, Board::Cbse);
        assert_eq!(details.preferred_language, Language::Hinglish);
    }

    #[test]
    fn test_invalid_mobile_reports_on_mobile_path() {
        for bad in ["1234567890", "98765", "98765432101", "abcdefghij"] {
            let mut draft = valid_draft();
            draft.mobile = Some(bad.to_string());
            let errors = draft.validate(&SchemaContext::default()).unwrap_err();
            assert_eq!(errors.paths(), vec!["mobile"], "mobile {bad}");
            assert_eq!(
                errors.get("mobile"),
                Some("Please enter a valid 10-digit mobile number")
            );
        }
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let errors = StudentDraft::default()
            .validate(&SchemaContext::default())
            .unwrap_err();
        assert_eq!(
            errors.paths(),
            vec!["fullName", "email", "mobile", "class", "board", "preferredLanguage"]
        );
        assert_eq!(errors.get("class"), Some("Please select your class"));
    }

    #[test]
    fn test_selection_outside_allowed_set() {
        let mut draft = valid_draft();
        draft.board = Some("IB".to_string());
        draft.class = Some("8".to_string());
        let errors = draft.validate(&SchemaContext::default()).unwrap_err();
        assert_eq!(errors.get("board"), Some("Please select your board"));
        assert_eq!(errors.get("class"), Some("Please select your class"));
    }
}

//! Step 2 rules, including the scholarship refinement

use crate::entities::catalog;
use crate::entities::{AcademicDetails, AcademicDraft, ExamGoal};
use crate::schema::rules::{self, RangeMessages};
use crate::schema::validator::{Checks, FieldErrors, Schema, SchemaContext};

const STUDY_HOURS: RangeMessages<'static> = RangeMessages {
    required: "Please enter your weekly study hours",
    too_small: "Study hours must be at least 1",
    too_large: "Study hours cannot exceed 40",
};

const LAST_EXAM_PERCENTAGE: RangeMessages<'static> = RangeMessages {
    required: "Last exam percentage is required for scholarship application",
    too_small: "Percentage cannot be below 0",
    too_large: "Percentage cannot exceed 100",
};

/// Per-field rules for step 2, without the cross-field refinement
pub(crate) fn academic_fields(
    draft: &AcademicDraft,
    ctx: &SchemaContext,
    checks: &mut Checks,
) -> Option<AcademicDetails> {
    let min = catalog::min_subjects(ctx.class);
    let subjects = checks.field("subjects", {
        let chosen = draft.subjects.clone().unwrap_or_default();
        if chosen.len() < min {
            Err(format!("Please select at least {} subjects", min))
        } else {
            Ok(chosen)
        }
    });

    let exam_goal = checks.field(
        "examGoal",
        rules::selection::<ExamGoal>(draft.exam_goal.as_deref(), "Please select your exam goal"),
    );

    let weekly_study_hours = checks.field(
        "weeklyStudyHours",
        rules::number_in_range(draft.weekly_study_hours, 1.0, 40.0, &STUDY_HOURS).and_then(
            |hours| {
                if hours.fract() == 0.0 {
                    Ok(hours as u8)
                } else {
                    Err("Study hours must be a whole number".to_string())
                }
            },
        ),
    );

    // Optional on its own; only range-checked when present
    let last_exam_percentage = match draft.last_exam_percentage {
        Some(pct) => checks
            .field(
                "lastExamPercentage",
                rules::number_in_range(Some(pct), 0.0, 100.0, &LAST_EXAM_PERCENTAGE),
            )
            .map(Some),
        None => Some(None),
    };

    let achievements = draft
        .achievements
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from);

    let (Some(subjects), Some(exam_goal), Some(weekly_study_hours), Some(last_exam_percentage)) =
        (subjects, exam_goal, weekly_study_hours, last_exam_percentage)
    else {
        return None;
    };

    Some(AcademicDetails {
        subjects,
        exam_goal,
        weekly_study_hours,
        scholarship_application: draft.scholarship_application.unwrap_or(false),
        last_exam_percentage,
        achievements,
    })
}

/// Scholarship applicants must state their last exam percentage.
///
/// The failure is reported on `lastExamPercentage`, never on the switch.
pub(crate) fn scholarship_rule(draft: &AcademicDraft, checks: &mut Checks) {
    if draft.scholarship_application == Some(true) && draft.last_exam_percentage.is_none() {
        checks.fail("lastExamPercentage", LAST_EXAM_PERCENTAGE.required);
    }
}

impl Schema for AcademicDraft {
    type Output = AcademicDetails;

    fn validate(&self, ctx: &SchemaContext) -> Result<AcademicDetails, FieldErrors> {
        let mut checks = Checks::default();
        let details = academic_fields(self, ctx, &mut checks);
        scholarship_rule(self, &mut checks);
        checks.finish()?;
        details.ok_or_else(FieldErrors::new)
    }
}

//! Step 2 - academic details and subject selection

use serde::{Deserialize, Serialize};

use crate::core::store::PersistedState;
use crate::entities::catalog;
use crate::entities::{
    parse_list, parse_number, parse_switch, take_present, ClassLevel, ExamGoal, FormGroup, Group,
    GroupPatch,
};
use crate::schema::validator::FieldError;

/// In-progress academic details as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_goal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_study_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_application: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exam_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
}

/// Validated academic details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicDetails {
    pub subjects: Vec<String>,
    pub exam_goal: ExamGoal,
    pub weekly_study_hours: u8,
    pub scholarship_application: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exam_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
}

impl From<&AcademicDetails> for AcademicDraft {
    fn from(details: &AcademicDetails) -> Self {
        Self {
            subjects: Some(details.subjects.clone()),
            exam_goal: Some(details.exam_goal.to_string()),
            weekly_study_hours: Some(f64::from(details.weekly_study_hours)),
            scholarship_application: Some(details.scholarship_application),
            last_exam_percentage: details.last_exam_percentage,
            achievements: details.achievements.clone(),
        }
    }
}

impl From<AcademicDraft> for GroupPatch {
    fn from(draft: AcademicDraft) -> Self {
        GroupPatch::Academic(draft)
    }
}

impl FormGroup for AcademicDraft {
    const GROUP: Group = Group::Academic;

    const FIELDS: &'static [&'static str] = &[
        "subjects",
        "examGoal",
        "weeklyStudyHours",
        "scholarshipApplication",
        "lastExamPercentage",
        "achievements",
    ];

    fn set_field(&mut self, field: &str, raw: &str) -> Result<(), FieldError> {
        match field {
            "subjects" => self.subjects = Some(parse_list(raw)),
            "examGoal" => self.exam_goal = Some(raw.to_string()),
            "weeklyStudyHours" => {
                self.weekly_study_hours = None;
                self.weekly_study_hours = parse_number(field, raw)?;
            }
            "scholarshipApplication" => {
                self.scholarship_application = Some(parse_switch(field, raw)?)
            }
            "lastExamPercentage" => {
                self.last_exam_percentage = None;
                self.last_exam_percentage = parse_number(field, raw)?;
            }
            "achievements" => self.achievements = Some(raw.to_string()),
            _ => return Err(FieldError::new(field, "Unknown field")),
        }
        Ok(())
    }

    fn clear_field(&mut self, field: &str) {
        match field {
            "subjects" => self.subjects = None,
            "examGoal" => self.exam_goal = None,
            "weeklyStudyHours" => self.weekly_study_hours = None,
            "scholarshipApplication" => self.scholarship_application = None,
            "lastExamPercentage" => self.last_exam_percentage = None,
            "achievements" => self.achievements = None,
            _ => {}
        }
    }

    fn has_value(&self, field: &str) -> bool {
        match field {
            "subjects" => self.subjects.is_some(),
            "examGoal" => self.exam_goal.is_some(),
            "weeklyStudyHours" => self.weekly_study_hours.is_some(),
            "scholarshipApplication" => self.scholarship_application.is_some(),
            "lastExamPercentage" => self.last_exam_percentage.is_some(),
            "achievements" => self.achievements.is_some(),
            _ => false,
        }
    }

    fn merge(&mut self, patch: Self) {
        take_present(&mut self.subjects, patch.subjects);
        take_present(&mut self.exam_goal, patch.exam_goal);
        take_present(&mut self.weekly_study_hours, patch.weekly_study_hours);
        take_present(&mut self.scholarship_application, patch.scholarship_application);
        take_present(&mut self.last_exam_percentage, patch.last_exam_percentage);
        take_present(&mut self.achievements, patch.achievements);
    }

    fn slice(state: &PersistedState) -> &Self {
        &state.academic_details
    }
}

/// Ordered set of chosen subjects, kept in step with the form's `subjects`
/// field.
///
/// The options on offer and the minimum count both depend on the class chosen
/// in step 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSelection {
    selected: Vec<String>,
    class: Option<ClassLevel>,
}

impl SubjectSelection {
    pub fn new(selected: Vec<String>, class: Option<ClassLevel>) -> Self {
        let mut selection = Self {
            selected: Vec::new(),
            class,
        };
        for subject in selected {
            if !selection.contains(&subject) {
                selection.selected.push(subject);
            }
        }
        selection
    }

    /// Add the subject if absent, remove it if present
    pub fn toggle(&mut self, subject: &str) {
        if self.contains(subject) {
            self.remove(subject);
        } else {
            self.selected.push(subject.to_string());
        }
    }

    /// Remove the subject; removing an absent subject does nothing
    pub fn remove(&mut self, subject: &str) {
        self.selected.retain(|s| s != subject);
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.selected.iter().any(|s| s == subject)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Subjects on offer for the student's class
    pub fn available(&self) -> &'static [&'static str] {
        catalog::subjects_for(self.class)
    }

    pub fn min_required(&self) -> usize {
        catalog::min_subjects(self.class)
    }

    pub fn is_satisfied(&self) -> bool {
        self.selected.len() >= self.min_required()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = SubjectSelection::new(Vec::new(), Some(ClassLevel::Eleven));
        selection.toggle("Physics");
        selection.toggle("Chemistry");
        assert_eq!(selection.selected(), ["Physics", "Chemistry"]);

        selection.toggle("Physics");
        assert_eq!(selection.selected(), ["Chemistry"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut selection =
            SubjectSelection::new(vec!["English".to_string()], Some(ClassLevel::Nine));
        selection.remove("English");
        selection.remove("English");
        selection.remove("Sanskrit");
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn test_minimum_follows_class() {
        let senior = SubjectSelection::new(
            vec!["Physics".to_string(), "Chemistry".to_string()],
            Some(ClassLevel::Twelve),
        );
        assert_eq!(senior.min_required(), 3);
        assert!(!senior.is_satisfied());

        let secondary = SubjectSelection::new(
            vec!["English".to_string(), "Science".to_string()],
            Some(ClassLevel::Ten),
        );
        assert!(secondary.is_satisfied());
        assert_eq!(secondary.available().len(), 6);
    }

    #[test]
    fn test_bad_number_clears_field() {
        let mut draft = AcademicDraft {
            weekly_study_hours: Some(10.0),
            ..Default::default()
        };
        let err = draft.set_field("weeklyStudyHours", "lots").unwrap_err();
        assert_eq!(err.path(), "weeklyStudyHours");
        assert_eq!(draft.weekly_study_hours, None);

        draft.set_field("weeklyStudyHours", "12").unwrap();
        assert_eq!(draft.weekly_study_hours, Some(12.0));
    }
}

//! Review of the collected data and final submission

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use ulid::Ulid;

use crate::core::navigation::{guard, Resolution, Route, Step};
use crate::core::notify::{Notifier, Toast};
use crate::core::store::EnrollmentStore;
use crate::entities::{EnrollmentDraft, EnrollmentRecord};
use crate::schema::validator::{FieldErrors, Schema, SchemaContext};

#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] FieldErrors),

    #[error("Submission was not accepted: {0}")]
    #[diagnostic(code(enroll::submit::remote))]
    Remote(String),
}

/// Acknowledgement of an accepted enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// `ENR-` followed by a ULID
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
}

impl Receipt {
    pub fn issue() -> Self {
        Self {
            reference: format!("ENR-{}", Ulid::new()),
            submitted_at: Utc::now(),
        }
    }
}

/// The terminal result of the wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub receipt: Receipt,
    pub record: EnrollmentRecord,
}

/// Delivers a validated record to wherever enrollments go
pub trait Submitter {
    fn submit(&self, record: &EnrollmentRecord) -> Result<Receipt, SubmitError>;
}

/// Stands in for a remote endpoint: waits, then accepts
#[derive(Debug, Clone, Copy)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit(&self, record: &EnrollmentRecord) -> Result<Receipt, SubmitError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let receipt = Receipt::issue();
        tracing::info!(
            reference = %receipt.reference,
            student = %record.student.full_name,
            "Enrollment submitted"
        );
        Ok(receipt)
    }
}

/// One labelled value in the review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub label: &'static str,
    pub value: String,
}

/// One group's block in the review, with the route that edits it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSection {
    pub title: &'static str,
    #[serde(serialize_with = "serialize_route")]
    pub edit: Route,
    pub rows: Vec<ReviewRow>,
}

fn serialize_route<S: serde::Serializer>(route: &Route, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(route.path())
}

fn row(label: &'static str, value: impl Into<String>) -> ReviewRow {
    ReviewRow {
        label,
        value: value.into(),
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// Human readable summary of everything entered so far
pub fn summarize(data: &EnrollmentDraft) -> Vec<ReviewSection> {
    let student = &data.student;
    let academic = &data.academic;
    let address = &data.address;

    let mut academic_rows = vec![
        row(
            "Selected Subjects",
            academic.subjects.clone().unwrap_or_default().join(", "),
        ),
        row("Exam Goal", text(&academic.exam_goal)),
        row(
            "Weekly Study Hours",
            format!("{} hours", number(academic.weekly_study_hours)),
        ),
    ];
    if academic.scholarship_application == Some(true) {
        academic_rows.push(row(
            "Last Exam Percentage",
            format!("{}%", number(academic.last_exam_percentage)),
        ));
        if let Some(achievements) = academic.achievements.as_deref().filter(|a| !a.is_empty()) {
            academic_rows.push(row("Achievements", achievements));
        }
    }

    vec![
        ReviewSection {
            title: "Student Details",
            edit: Step::Student.route(),
            rows: vec![
                row("Full Name", text(&student.full_name)),
                row("Email", text(&student.email)),
                row("Mobile", format!("+91 {}", text(&student.mobile))),
                row(
                    "Class & Board",
                    format!("Class {} ({})", text(&student.class), text(&student.board)),
                ),
                row("Preferred Language", text(&student.preferred_language)),
            ],
        },
        ReviewSection {
            title: "Academic Details",
            edit: Step::Academic.route(),
            rows: academic_rows,
        },
        ReviewSection {
            title: "Address & Guardian Details",
            edit: Step::AddressGuardian.route(),
            rows: vec![
                row(
                    "Address",
                    format!(
                        "{}, {}, {} - {}",
                        text(&address.address_line),
                        text(&address.city),
                        text(&address.state),
                        text(&address.pin_code)
                    ),
                ),
                row("Guardian Name", text(&address.guardian_name)),
                row("Guardian Mobile", format!("+91 {}", text(&address.guardian_mobile))),
                row("Payment Plan", text(&address.payment_plan)),
                row("Payment Mode", text(&address.payment_mode)),
            ],
        },
    ]
}

/// Controller for the review step
pub struct ReviewController<'a> {
    store: &'a mut EnrollmentStore,
    notifier: &'a dyn Notifier,
    submitter: &'a dyn Submitter,
    submitted: Option<Submission>,
}

impl<'a> ReviewController<'a> {
    /// Open the review, or return the route the guard sent the user to
    pub fn open(
        store: &'a mut EnrollmentStore,
        notifier: &'a dyn Notifier,
        submitter: &'a dyn Submitter,
    ) -> Result<Self, Route> {
        if let Resolution::Redirect { to, notice } = guard(&Route::Review, store.completed_steps())
        {
            notifier.notify(&notice);
            return Err(to);
        }
        Ok(Self {
            store,
            notifier,
            submitter,
            submitted: None,
        })
    }

    pub fn summary(&self) -> Vec<ReviewSection> {
        summarize(&self.store.get_all())
    }

    /// Validate everything and submit it.
    ///
    /// Once a submission succeeds the controller is terminal: later calls
    /// return the same submission without submitting again.
    pub fn submit(&mut self) -> Result<&Submission, SubmitError> {
        let submission = match self.submitted.take() {
            Some(existing) => existing,
            None => self.attempt()?,
        };
        Ok(self.submitted.insert(submission))
    }

    fn attempt(&self) -> Result<Submission, SubmitError> {
        let result = self
            .store
            .get_all()
            .validate(&SchemaContext::default())
            .map_err(SubmitError::from)
            .and_then(|record| {
                let receipt = self.submitter.submit(&record)?;
                Ok(Submission { receipt, record })
            });

        match &result {
            Ok(_) => self.notifier.notify(&Toast::success(
                "Enrollment Successful!",
                "Your registration has been submitted successfully.",
            )),
            Err(e) => {
                tracing::warn!("Submission failed: {}", e);
                self.notifier.notify(&Toast::destructive(
                    "Submission Failed",
                    "Please check all fields and try again.",
                ));
            }
        }
        result
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted.is_some()
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submitted.as_ref()
    }

    /// Erase all state and go back to the first step
    pub fn start_over(&mut self) -> Route {
        self.store.clear_all();
        self.submitted = None;
        tracing::info!("Enrollment cleared");
        Step::Student.route()
    }

    pub fn back(&self) -> Route {
        Step::AddressGuardian.route()
    }

    /// Route that edits the given step
    pub fn edit(&self, step: Step) -> Route {
        step.route()
    }
}

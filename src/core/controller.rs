//! Step controllers: form binding, live validation, auto-save and gating
//!
//! A controller holds the only private copy of a step's form. Every change is
//! validated at once and written straight back into the store, valid or not,
//! so nothing typed is ever lost. Proceeding is the only way to mark a step
//! complete.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::autofill::{
    AddressAutoFill, AutoFillOutcome, LookupDispatcher, LookupReply, PostalLookup,
};
use crate::core::navigation::{guard, Resolution, Route, Step};
use crate::core::notify::{Notifier, Toast};
use crate::core::store::EnrollmentStore;
use crate::entities::academic::SubjectSelection;
use crate::entities::{
    AcademicDraft, AddressGuardianDraft, ClassLevel, FormGroup, Group, StudentDraft,
};
use crate::schema::validator::{FieldError, FieldErrors, Schema, SchemaContext};

#[derive(Debug, Error)]
pub enum StepError {
    #[error("Unknown field '{field}' for {group}")]
    UnknownField { group: Group, field: String },

    #[error("{0}")]
    Rejected(FieldError),
}

/// A single form event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Raw text as typed or selected
    Set(String),
    /// The input was emptied
    Clear,
}

impl From<Option<String>> for FieldEdit {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => FieldEdit::Set(text),
            None => FieldEdit::Clear,
        }
    }
}

/// Controller for one data step
pub struct StepController<'a, G> {
    store: &'a mut EnrollmentStore,
    notifier: &'a dyn Notifier,
    form: G,
    errors: FieldErrors,
    can_proceed: bool,
}

impl<'a, G> StepController<'a, G>
where
    G: FormGroup + Schema,
    for<'x> G: From<&'x <G as Schema>::Output>,
{
    /// Open the step, or return the route the guard sent the user to
    pub fn open(store: &'a mut EnrollmentStore, notifier: &'a dyn Notifier) -> Result<Self, Route> {
        let step = Step::for_group(G::GROUP);
        if let Resolution::Redirect { to, notice } = guard(&step.route(), store.completed_steps()) {
            notifier.notify(&notice);
            return Err(to);
        }

        let form = store.group::<G>().clone();
        let mut controller = Self {
            store,
            notifier,
            form,
            errors: FieldErrors::new(),
            can_proceed: false,
        };
        controller.revalidate();
        Ok(controller)
    }

    pub fn step(&self) -> Step {
        Step::for_group(G::GROUP)
    }

    pub fn form(&self) -> &G {
        &self.form
    }

    /// Errors from the latest validation pass
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn can_proceed(&self) -> bool {
        self.can_proceed
    }

    /// Context for this step's schema, taken from the stored step 1 data
    pub fn context(&self) -> SchemaContext {
        SchemaContext::with_class(self.store.group::<StudentDraft>().class_level())
    }

    /// Apply one field change; returns whether the step may now proceed
    pub fn on_change(&mut self, field: &str, change: FieldEdit) -> Result<bool, StepError> {
        if !G::FIELDS.iter().any(|f| *f == field) {
            return Err(StepError::UnknownField {
                group: G::GROUP,
                field: field.to_string(),
            });
        }

        let mut input_error = None;
        self.edit(|form| match change {
            FieldEdit::Set(raw) => {
                if let Err(e) = form.set_field(field, &raw) {
                    input_error = Some(e);
                }
            }
            FieldEdit::Clear => form.clear_field(field),
        });

        if let Some(e) = input_error {
            self.errors.replace(e);
            self.can_proceed = false;
        }
        Ok(self.can_proceed)
    }

    /// Mutate the form directly, then save and revalidate
    pub fn edit(&mut self, apply: impl FnOnce(&mut G)) -> bool {
        apply(&mut self.form);
        self.save();
        self.revalidate();
        self.can_proceed
    }

    /// Validate and, on success, complete the step.
    ///
    /// Returns the route to move to, or the failing fields.
    pub fn proceed(&mut self) -> Result<Route, FieldErrors> {
        let step = self.step();
        match self.form.validate(&self.context()) {
            Ok(valid) => {
                self.form = G::from(&valid);
                self.save();
                self.errors = FieldErrors::new();
                self.can_proceed = true;
                self.store.mark_step_completed(step);
                tracing::info!("{} completed", step);
                self.notifier.notify(&Toast::success(
                    format!("Step {} completed!", step.number()),
                    step.completion_message(),
                ));
                Ok(step.next())
            }
            Err(errors) => {
                tracing::debug!("{} not complete: {}", step, errors);
                self.errors = errors.clone();
                self.can_proceed = false;
                Err(errors)
            }
        }
    }

    /// Previous route; nothing is validated or un-marked
    pub fn back(&self) -> Route {
        self.step().previous()
    }

    fn revalidate(&mut self) {
        let ctx = self.context();
        match self.form.validate(&ctx) {
            Ok(_) => {
                self.errors = FieldErrors::new();
                self.can_proceed = true;
            }
            Err(errors) => {
                self.errors = errors;
                self.can_proceed = false;
            }
        }
    }

    /// Write the whole form back, removing fields the form no longer holds
    fn save(&mut self) {
        self.store.update_group(self.form.clone());
        let stored = self.store.group::<G>().clone();
        for field in G::FIELDS {
            if !self.form.has_value(field) && stored.has_value(field) {
                self.store.clear_field(G::GROUP, field);
            }
        }
    }
}

/// Step 2 controller with subject toggling
pub struct AcademicStepController<'a> {
    inner: StepController<'a, AcademicDraft>,
    subjects: SubjectSelection,
}

impl<'a> AcademicStepController<'a> {
    pub fn open(store: &'a mut EnrollmentStore, notifier: &'a dyn Notifier) -> Result<Self, Route> {
        let inner = StepController::<AcademicDraft>::open(store, notifier)?;
        let subjects = SubjectSelection::new(
            inner.form().subjects.clone().unwrap_or_default(),
            inner.context().class,
        );
        Ok(Self { inner, subjects })
    }

    pub fn subjects(&self) -> &SubjectSelection {
        &self.subjects
    }

    /// Add the subject if absent, remove it if present
    pub fn toggle_subject(&mut self, subject: &str) -> bool {
        self.subjects.toggle(subject);
        self.sync_subjects()
    }

    /// Remove the subject; removing an unselected subject changes nothing
    pub fn remove_subject(&mut self, subject: &str) -> bool {
        self.subjects.remove(subject);
        self.sync_subjects()
    }

    pub fn on_change(&mut self, field: &str, edit: FieldEdit) -> Result<bool, StepError> {
        let can_proceed = self.inner.on_change(field, edit)?;
        if field == "subjects" {
            self.subjects = SubjectSelection::new(
                self.inner.form().subjects.clone().unwrap_or_default(),
                self.subjects_class(),
            );
        }
        Ok(can_proceed)
    }

    pub fn proceed(&mut self) -> Result<Route, FieldErrors> {
        self.inner.proceed()
    }

    pub fn back(&self) -> Route {
        self.inner.back()
    }

    pub fn form(&self) -> &AcademicDraft {
        self.inner.form()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.inner.errors()
    }

    pub fn can_proceed(&self) -> bool {
        self.inner.can_proceed()
    }

    fn subjects_class(&self) -> Option<ClassLevel> {
        self.inner.context().class
    }

    fn sync_subjects(&mut self) -> bool {
        let selected = self.subjects.selected().to_vec();
        self.inner.edit(|form| form.subjects = Some(selected))
    }
}

/// Step 3 controller with PIN auto-fill
pub struct AddressStepController<'a> {
    inner: StepController<'a, AddressGuardianDraft>,
    autofill: AddressAutoFill,
    dispatcher: LookupDispatcher,
}

impl<'a> AddressStepController<'a> {
    /// Open step 3. A stored complete PIN is looked up again so the state
    /// lock comes back with the page.
    pub fn open(
        store: &'a mut EnrollmentStore,
        notifier: &'a dyn Notifier,
        lookup: Arc<dyn PostalLookup>,
    ) -> Result<Self, Route> {
        let inner = StepController::<AddressGuardianDraft>::open(store, notifier)?;
        let mut controller = Self {
            inner,
            autofill: AddressAutoFill::new(),
            dispatcher: LookupDispatcher::new(lookup),
        };

        let pin = controller.inner.form().pin_code.clone();
        if let Some(ticket) = controller.autofill.on_pin_change(pin.as_deref()) {
            controller.dispatcher.dispatch(ticket);
        }
        Ok(controller)
    }

    /// Apply one field change. A complete PIN starts a background lookup.
    pub fn on_change(&mut self, field: &str, edit: FieldEdit) -> Result<bool, StepError> {
        if field == "state" && self.autofill.is_locked() {
            return Err(StepError::Rejected(FieldError::new(
                "state",
                "State was detected from the PIN code and cannot be changed",
            )));
        }

        let can_proceed = self.inner.on_change(field, edit)?;
        if field == "pinCode" {
            let pin = self.inner.form().pin_code.clone();
            if let Some(ticket) = self.autofill.on_pin_change(pin.as_deref()) {
                self.dispatcher.dispatch(ticket);
            }
        }
        Ok(can_proceed)
    }

    /// Apply lookup results that have already arrived
    pub fn poll(&mut self) -> Vec<AutoFillOutcome> {
        let replies = self.dispatcher.try_recv_all();
        replies.into_iter().map(|r| self.apply(r)).collect()
    }

    /// Wait for outstanding lookups, applying each as it arrives
    pub fn wait(&mut self, timeout: Duration) -> Vec<AutoFillOutcome> {
        let replies = self.dispatcher.drain(timeout);
        replies.into_iter().map(|r| self.apply(r)).collect()
    }

    pub fn is_state_locked(&self) -> bool {
        self.autofill.is_locked()
    }

    pub fn pending_lookups(&self) -> usize {
        self.dispatcher.in_flight()
    }

    pub fn proceed(&mut self) -> Result<Route, FieldErrors> {
        self.inner.proceed()
    }

    pub fn back(&self) -> Route {
        self.inner.back()
    }

    pub fn form(&self) -> &AddressGuardianDraft {
        self.inner.form()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.inner.errors()
    }

    pub fn can_proceed(&self) -> bool {
        self.inner.can_proceed()
    }

    fn apply(&mut self, reply: LookupReply) -> AutoFillOutcome {
        let outcome = self.autofill.apply(reply);
        if let AutoFillOutcome::Filled { city, state } = &outcome {
            let (city, state) = (city.clone(), state.clone());
            self.inner.edit(|form| {
                form.city = Some(city);
                form.state = Some(state);
            });
        }
        if let Some(toast) = outcome.toast() {
            self.inner.notifier.notify(&toast);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::autofill::{LookupError, PostOffice};
    use crate::core::notify::RecordingNotifier;
    use crate::core::store::MemoryStorage;

    struct TableLookup;

    impl PostalLookup for TableLookup {
        fn lookup(&self, pin: &str) -> Result<PostOffice, LookupError> {
            match pin {
                "110001" => Ok(PostOffice {
                    district: "New Delhi".to_string(),
                    state: "Delhi".to_string(),
                }),
                _ => Err(LookupError::NoResults(pin.to_string())),
            }
        }
    }

    fn fill_student(store: &mut EnrollmentStore, notifier: &RecordingNotifier, class: &str) {
        let mut step = StepController::<StudentDraft>::open(store, notifier).unwrap();
        for (field, value) in [
            ("fullName", "  Asha Rao  "),
            ("email", "asha@example.com"),
            ("mobile", "9876543210"),
            ("class", class),
            ("board", "CBSE"),
            ("preferredLanguage", "Hindi"),
        ] {
            step.on_change(field, FieldEdit::Set(value.to_string())).unwrap();
        }
        assert_eq!(step.proceed().unwrap(), Route::Step(Step::Academic));
    }

    fn fill_academic(store: &mut EnrollmentStore, notifier: &RecordingNotifier) {
        let mut step = AcademicStepController::open(store, notifier).unwrap();
        step.toggle_subject("Physics");
        step.toggle_subject("Chemistry");
        step.toggle_subject("Mathematics");
        step.on_change("examGoal", FieldEdit::Set("Concept Mastery".into()))
            .unwrap();
        step.on_change("weeklyStudyHours", FieldEdit::Set("12".into()))
            .unwrap();
        assert!(step.proceed().is_ok());
    }

    #[test]
    fn test_every_change_is_saved() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        {
            let mut step = StepController::<StudentDraft>::open(&mut store, &notifier).unwrap();
            let ok = step
                .on_change("email", FieldEdit::Set("not-an-email".into()))
                .unwrap();
            assert!(!ok);
            assert_eq!(step.errors().get("email"), Some("Please enter a valid email address"));
        }
        assert_eq!(
            store.group::<StudentDraft>().email.as_deref(),
            Some("not-an-email")
        );
        assert!(!store.is_completed(Step::Student));
    }

    #[test]
    fn test_proceed_stores_normalized_values() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "10");

        assert_eq!(
            store.group::<StudentDraft>().full_name.as_deref(),
            Some("Asha Rao")
        );
        assert!(store.is_completed(Step::Student));
        let toast = notifier.last().unwrap();
        assert_eq!(toast.title, "Step 1 completed!");
        assert_eq!(toast.description, "Moving to academic details.");
    }

    #[test]
    fn test_invalid_proceed_stays() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        let mut step = StepController::<StudentDraft>::open(&mut store, &notifier).unwrap();
        let errors = step.proceed().unwrap_err();
        assert_eq!(errors.len(), 6);
        drop(step);
        assert!(store.completed_steps().is_empty());
    }

    #[test]
    fn test_guard_redirects_and_notifies() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        let redirect = AcademicStepController::open(&mut store, &notifier).err();
        assert_eq!(redirect, Some(Route::Step(Step::Student)));
        assert_eq!(notifier.titles(), vec!["Please complete Step 1 first"]);
    }

    #[test]
    fn test_unknown_field() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        let mut step = StepController::<StudentDraft>::open(&mut store, &notifier).unwrap();
        assert!(matches!(
            step.on_change("nickname", FieldEdit::Set("A".into())),
            Err(StepError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_non_numeric_input_clears_field() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "9");

        let mut step = AcademicStepController::open(&mut store, &notifier).unwrap();
        step.on_change("weeklyStudyHours", FieldEdit::Set("10".into()))
            .unwrap();
        step.on_change("weeklyStudyHours", FieldEdit::Set("ten".into()))
            .unwrap();
        assert_eq!(step.errors().get("weeklyStudyHours"), Some("Expected a number"));
        assert_eq!(step.form().weekly_study_hours, None);
        drop(step);
        assert_eq!(store.group::<AcademicDraft>().weekly_study_hours, None);
    }

    #[test]
    fn test_subject_minimum_follows_stored_class() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "11");

        let mut step = AcademicStepController::open(&mut store, &notifier).unwrap();
        assert_eq!(step.subjects().min_required(), 3);
        step.toggle_subject("Physics");
        step.toggle_subject("Chemistry");
        step.on_change("examGoal", FieldEdit::Set("Competitive Prep".into()))
            .unwrap();
        let ok = step
            .on_change("weeklyStudyHours", FieldEdit::Set("20".into()))
            .unwrap();
        assert!(!ok);
        assert_eq!(step.errors().get("subjects"), Some("Please select at least 3 subjects"));

        assert!(step.toggle_subject("Biology"));
        step.remove_subject("Biology");
        step.remove_subject("Biology");
        assert!(!step.can_proceed());
        assert_eq!(step.form().subjects.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_scholarship_error_on_percentage() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "9");

        let mut step = AcademicStepController::open(&mut store, &notifier).unwrap();
        step.toggle_subject("Science");
        step.toggle_subject("Mathematics");
        step.on_change("examGoal", FieldEdit::Set("Board Excellence".into()))
            .unwrap();
        step.on_change("weeklyStudyHours", FieldEdit::Set("8".into()))
            .unwrap();
        step.on_change("scholarshipApplication", FieldEdit::Set("yes".into()))
            .unwrap();

        let errors = step.proceed().unwrap_err();
        assert_eq!(errors.paths(), vec!["lastExamPercentage"]);

        step.on_change("lastExamPercentage", FieldEdit::Set("91".into()))
            .unwrap();
        assert_eq!(step.proceed().unwrap(), Route::Step(Step::AddressGuardian));
    }

    #[test]
    fn test_back_does_not_unmark() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "9");
        let step = AcademicStepController::open(&mut store, &notifier).unwrap();
        assert_eq!(step.back(), Route::Step(Step::Student));
        drop(step);
        assert!(store.is_completed(Step::Student));
    }

    #[test]
    fn test_pin_autofill_locks_state() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "12");
        fill_academic(&mut store, &notifier);

        let mut step =
            AddressStepController::open(&mut store, &notifier, Arc::new(TableLookup)).unwrap();
        step.on_change("pinCode", FieldEdit::Set("110001".into()))
            .unwrap();
        let outcomes = step.wait(Duration::from_secs(5));
        assert_eq!(outcomes.len(), 1);
        assert_eq!(step.form().city.as_deref(), Some("New Delhi"));
        assert_eq!(step.form().state.as_deref(), Some("Delhi"));
        assert!(step.is_state_locked());
        assert!(matches!(
            step.on_change("state", FieldEdit::Set("Goa".into())),
            Err(StepError::Rejected(_))
        ));

        step.on_change("pinCode", FieldEdit::Set("11000".into()))
            .unwrap();
        assert!(!step.is_state_locked());
        assert!(step
            .on_change("state", FieldEdit::Set("Goa".into()))
            .is_ok());
        drop(step);

        assert!(notifier.titles().contains(&"Address auto-filled".to_string()));
    }

    #[test]
    fn test_pin_lookup_failure_keeps_values() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "12");
        fill_academic(&mut store, &notifier);

        let mut step =
            AddressStepController::open(&mut store, &notifier, Arc::new(TableLookup)).unwrap();
        step.on_change("city", FieldEdit::Set("Pune".into())).unwrap();
        step.on_change("pinCode", FieldEdit::Set("999999".into()))
            .unwrap();
        step.wait(Duration::from_secs(5));

        assert_eq!(step.form().city.as_deref(), Some("Pune"));
        assert!(!step.is_state_locked());
        drop(step);
        assert_eq!(notifier.last().unwrap().title, "Invalid PIN code");
    }

    #[test]
    fn test_reopen_restores_state_lock() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "12");
        fill_academic(&mut store, &notifier);

        let mut step =
            AddressStepController::open(&mut store, &notifier, Arc::new(TableLookup)).unwrap();
        assert_eq!(step.pending_lookups(), 0);
        step.on_change("pinCode", FieldEdit::Set("110001".into()))
            .unwrap();
        step.wait(Duration::from_secs(5));
        assert!(step.is_state_locked());
        drop(step);

        let mut step =
            AddressStepController::open(&mut store, &notifier, Arc::new(TableLookup)).unwrap();
        assert_eq!(step.pending_lookups(), 1);
        step.wait(Duration::from_secs(5));
        assert!(step.is_state_locked());
        assert_eq!(step.form().state.as_deref(), Some("Delhi"));
        assert!(matches!(
            step.on_change("state", FieldEdit::Set("Goa".into())),
            Err(StepError::Rejected(_))
        ));

        // same PIN again does not start another lookup
        step.on_change("pinCode", FieldEdit::Set("110001".into()))
            .unwrap();
        assert_eq!(step.pending_lookups(), 0);
    }

    #[test]
    fn test_unparsable_input_blocks_proceed() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier, "9");

        let mut step = AcademicStepController::open(&mut store, &notifier).unwrap();
        step.toggle_subject("Science");
        step.toggle_subject("Mathematics");
        step.on_change("examGoal", FieldEdit::Set("Board Excellence".into()))
            .unwrap();
        let ok = step
            .on_change("weeklyStudyHours", FieldEdit::Set("8".into()))
            .unwrap();
        assert!(ok);

        let ok = step
            .on_change("lastExamPercentage", FieldEdit::Set("abc".into()))
            .unwrap();
        assert!(!ok);
        assert!(!step.can_proceed());
        assert_eq!(step.errors().get("lastExamPercentage"), Some("Expected a number"));
    }
}

//! `enroll start` command - the interactive wizard
//!
//! Walks the steps in order from wherever the saved progress left off. Every
//! answer goes through the same step controllers the one-shot commands use, so
//! each one is validated and saved as it is given.

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{print_field_errors, print_route, print_summary, Session, LOOKUP_WAIT};
use crate::cli::GlobalOpts;
use crate::core::navigation::first_incomplete;
use crate::core::{
    AcademicStepController, AddressStepController, Config, ConsoleNotifier, EnrollmentStore,
    FieldEdit, Notifier, ReviewController, Route, SimulatedSubmitter, Step, StepController,
    StepError,
};
use crate::entities::StudentDraft;
use crate::schema::validator::FieldErrors;
use crate::schema::wizard::{current_value, prompts_for, FieldPrompt};
use crate::schema::StepWizard;

#[derive(clap::Args, Debug)]
pub struct StartArgs {
    /// Begin at this step instead of the first incomplete one
    #[arg(long)]
    pub step: Option<Step>,
}

pub fn run(args: StartArgs, global: &GlobalOpts) -> Result<()> {
    if !Term::stdout().is_term() {
        return Err(miette::miette!(
            help = "Use `enroll set`, `enroll next` and `enroll submit` from scripts",
            "The interactive wizard needs a terminal"
        ));
    }

    let mut session = Session::open(global);
    let lookup = session.postal_lookup()?;
    let notifier = ConsoleNotifier;
    let wizard = StepWizard::new();

    let mut route = match args.step {
        Some(step) => step.route(),
        None => first_incomplete(session.store.completed_steps())
            .map(Step::route)
            .unwrap_or(Route::Review),
    };

    loop {
        // Subjects on offer depend on the class saved in step 1
        let class = session.store.group::<StudentDraft>().class_level();
        let prompts = match &route {
            Route::Step(step) => prompts_for(step.group(), class),
            _ => Vec::new(),
        };
        let store = &mut session.store;

        route = match route {
            Route::Step(step @ Step::Student) => {
                match StepController::<StudentDraft>::open(store, &notifier) {
                    Ok(mut form) => fill(&wizard, &mut form, &prompts, step)?,
                    Err(to) => to,
                }
            }
            Route::Step(step @ Step::Academic) => {
                match AcademicStepController::open(store, &notifier) {
                    Ok(mut form) => fill(&wizard, &mut form, &prompts, step)?,
                    Err(to) => to,
                }
            }
            Route::Step(step @ Step::AddressGuardian) => {
                match AddressStepController::open(store, &notifier, lookup.clone()) {
                    Ok(mut form) => {
                        // A saved PIN is looked up again on open
                        if form.pending_lookups() > 0 {
                            form.wait(LOOKUP_WAIT);
                        }
                        fill(&wizard, &mut form, &prompts, step)?
                    }
                    Err(to) => to,
                }
            }
            Route::Review => return review(store, &notifier, &session.config),
            Route::Home | Route::NotFound(_) => return Ok(()),
        };
    }
}

/// The parts of a step controller the wizard drives
trait WizardForm {
    fn value(&self, field: &str) -> Option<String>;

    fn error(&self, field: &str) -> Option<String>;

    /// Fields that are not asked in the form's current state
    fn skips(&self, _field: &str) -> bool {
        false
    }

    fn change(&mut self, field: &str, edit: FieldEdit) -> Result<(), StepError>;

    fn finish(&mut self) -> Result<Route, FieldErrors>;
}

impl WizardForm for StepController<'_, StudentDraft> {
    fn value(&self, field: &str) -> Option<String> {
        current_value(self.form(), field)
    }

    fn error(&self, field: &str) -> Option<String> {
        self.errors().get(field).map(str::to_string)
    }

    fn change(&mut self, field: &str, edit: FieldEdit) -> Result<(), StepError> {
        self.on_change(field, edit).map(|_| ())
    }

    fn finish(&mut self) -> Result<Route, FieldErrors> {
        self.proceed()
    }
}

impl WizardForm for AcademicStepController<'_> {
    fn value(&self, field: &str) -> Option<String> {
        current_value(self.form(), field)
    }

    fn error(&self, field: &str) -> Option<String> {
        self.errors().get(field).map(str::to_string)
    }

    fn skips(&self, field: &str) -> bool {
        matches!(field, "lastExamPercentage" | "achievements")
            && self.form().scholarship_application != Some(true)
    }

    fn change(&mut self, field: &str, edit: FieldEdit) -> Result<(), StepError> {
        self.on_change(field, edit).map(|_| ())
    }

    fn finish(&mut self) -> Result<Route, FieldErrors> {
        self.proceed()
    }
}

impl WizardForm for AddressStepController<'_> {
    fn value(&self, field: &str) -> Option<String> {
        current_value(self.form(), field)
    }

    fn error(&self, field: &str) -> Option<String> {
        self.errors().get(field).map(str::to_string)
    }

    fn skips(&self, field: &str) -> bool {
        field == "state" && self.is_state_locked()
    }

    fn change(&mut self, field: &str, edit: FieldEdit) -> Result<(), StepError> {
        self.on_change(field, edit)?;
        if self.pending_lookups() > 0 {
            eprintln!("  {} Looking up PIN code...", style("→").blue());
            self.wait(LOOKUP_WAIT);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Route, FieldErrors> {
        self.proceed()
    }
}

/// Ask every field of a step until it validates, then proceed
fn fill<F: WizardForm>(
    wizard: &StepWizard,
    form: &mut F,
    prompts: &[FieldPrompt],
    step: Step,
) -> Result<Route> {
    wizard.header(step.number(), step.title());

    for prompt in prompts {
        ask_field(wizard, form, prompt, false)?;
    }

    loop {
        let errors = match form.finish() {
            Ok(route) => return Ok(route),
            Err(errors) => errors,
        };
        println!();
        print_field_errors(&errors);

        let retry = retry_prompts(prompts, &errors);
        if retry.is_empty() {
            // Errors on fields without a prompt cannot be fixed here
            return Err(errors.into());
        }
        for prompt in retry {
            ask_field(wizard, form, prompt, true)?;
        }
    }
}

/// Prompts for the fields that failed, in form order.
///
/// A failing field is asked again even when the form would normally hide it,
/// e.g. an out-of-range percentage left behind after the scholarship switch
/// was turned off.
fn retry_prompts<'p>(prompts: &'p [FieldPrompt], errors: &FieldErrors) -> Vec<&'p FieldPrompt> {
    prompts.iter().filter(|p| errors.contains(p.name)).collect()
}

/// Ask one field, re-asking while its own rule fails.
///
/// With `force` the field is asked even if the form skips it, and a rejected
/// answer is an error instead of a notice.
fn ask_field<F: WizardForm>(
    wizard: &StepWizard,
    form: &mut F,
    prompt: &FieldPrompt,
    force: bool,
) -> Result<()> {
    let mut shown_error: Option<String> = None;
    loop {
        if !force && form.skips(prompt.name) {
            return Ok(());
        }

        let current = form.value(prompt.name);
        let answer = wizard.ask(prompt, current.as_deref(), shown_error.as_deref())?;

        match form.change(prompt.name, FieldEdit::from(answer)) {
            Ok(()) => {}
            Err(StepError::Rejected(error)) if !force => {
                println!("  {} {}", style("!").yellow(), error.message());
                return Ok(());
            }
            Err(e) => return Err(e).into_diagnostic(),
        }

        match form.error(prompt.name) {
            Some(message) => shown_error = Some(message),
            None => return Ok(()),
        }
    }
}

fn review(store: &mut EnrollmentStore, notifier: &dyn Notifier, config: &Config) -> Result<()> {
    let submitter = SimulatedSubmitter::new(config.submit_delay());
    let mut review = match ReviewController::open(store, notifier, &submitter) {
        Ok(review) => review,
        Err(to) => {
            print_route(&to);
            return Ok(());
        }
    };

    println!();
    println!("{}", style("Review & Submit").bold().underlined());
    println!();
    print_summary(&review.summary());

    let theme = ColorfulTheme::default();
    let submit = Confirm::with_theme(&theme)
        .with_prompt("Submit this enrollment?")
        .default(true)
        .interact()
        .into_diagnostic()?;
    if !submit {
        println!(
            "Your answers are saved. Edit a step with {} or submit later with {}",
            style("enroll start --step <n>").bold(),
            style("enroll submit").bold()
        );
        return Ok(());
    }

    eprintln!("{} Submitting...", style("→").blue());
    let submission = review.submit()?;
    println!(
        "{} Reference {}",
        style("✓").green().bold(),
        style(&submission.receipt.reference).cyan()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&submission.record).into_diagnostic()?
    );

    let again = Confirm::with_theme(&theme)
        .with_prompt("Start a new enrollment?")
        .default(false)
        .interact()
        .into_diagnostic()?;
    if again {
        let route = review.start_over();
        print_route(&route);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryStorage, RecordingNotifier};
    use crate::entities::{ClassLevel, Group};

    fn fill_student(store: &mut EnrollmentStore, notifier: &RecordingNotifier) {
        let mut step = StepController::<StudentDraft>::open(store, notifier).unwrap();
        for (field, value) in [
            ("fullName", "Ravi Kumar"),
            ("email", "ravi@example.com"),
            ("mobile", "9123456780"),
            ("class", "11"),
            ("board", "ICSE"),
            ("preferredLanguage", "English"),
        ] {
            step.on_change(field, FieldEdit::Set(value.to_string())).unwrap();
        }
        assert_eq!(step.proceed().unwrap(), Route::Step(Step::Academic));
    }

    #[test]
    fn test_retry_asks_hidden_failing_field() {
        let mut store = EnrollmentStore::load(MemoryStorage::new());
        let notifier = RecordingNotifier::new();
        fill_student(&mut store, &notifier);

        let mut form = AcademicStepController::open(&mut store, &notifier).unwrap();
        for subject in ["Physics", "Chemistry", "Mathematics"] {
            form.toggle_subject(subject);
        }
        for (field, value) in [
            ("examGoal", "Competitive Prep"),
            ("weeklyStudyHours", "15"),
            ("scholarshipApplication", "yes"),
            ("lastExamPercentage", "150"),
            ("scholarshipApplication", "no"),
        ] {
            form.change(field, FieldEdit::Set(value.to_string())).unwrap();
        }

        assert!(form.skips("lastExamPercentage"));
        let errors = form.finish().unwrap_err();
        assert_eq!(errors.paths(), vec!["lastExamPercentage"]);

        let prompts = prompts_for(Group::Academic, Some(ClassLevel::Eleven));
        let retry = retry_prompts(&prompts, &errors);
        let names: Vec<&str> = retry.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["lastExamPercentage"]);

        // Clearing the hidden value is enough to move on
        form.change("lastExamPercentage", FieldEdit::Clear).unwrap();
        assert_eq!(form.finish().unwrap(), Route::Step(Step::AddressGuardian));
    }

    #[test]
    fn test_retry_without_prompt_stops() {
        let prompts = prompts_for(Group::Student, None);
        let mut errors = FieldErrors::new();
        errors.replace(crate::schema::validator::FieldError::new("nickname", "Not asked"));
        assert!(retry_prompts(&prompts, &errors).is_empty());
    }
}

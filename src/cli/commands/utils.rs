//! Shared utilities for CLI commands
//!
//! Each one-shot command opens the step it acts on exactly as the wizard
//! would (guard included), sends one event, and prints what changed.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{self, redirected, Session, LOOKUP_WAIT};
use crate::core::{
    AcademicStepController, AddressStepController, FieldEdit, Notifier, ReviewController,
    Route, SimulatedSubmitter, Step, StepController,
};
use crate::entities::StudentDraft;
use crate::schema::validator::FieldErrors;

/// Apply one field change to a step
pub fn apply_change(
    session: &mut Session,
    notifier: &dyn Notifier,
    step: Step,
    field: &str,
    edit: FieldEdit,
) -> Result<()> {
    match step {
        Step::Student => {
            let mut form = StepController::<StudentDraft>::open(&mut session.store, notifier)
                .map_err(|to| redirected(&to))?;
            let can_proceed = form.on_change(field, edit).into_diagnostic()?;
            report_change(step, field, can_proceed, form.errors());
        }
        Step::Academic => {
            let mut form = AcademicStepController::open(&mut session.store, notifier)
                .map_err(|to| redirected(&to))?;
            let can_proceed = form.on_change(field, edit).into_diagnostic()?;
            report_change(step, field, can_proceed, form.errors());
        }
        Step::AddressGuardian => {
            let lookup = session.postal_lookup()?;
            let mut form = AddressStepController::open(&mut session.store, notifier, lookup)
                .map_err(|to| redirected(&to))?;
            // Let the saved PIN's lookup settle so a restored lock applies to this edit
            if field != "pinCode" && form.pending_lookups() > 0 {
                form.wait(LOOKUP_WAIT);
            }
            form.on_change(field, edit).into_diagnostic()?;
            if form.pending_lookups() > 0 {
                form.wait(LOOKUP_WAIT);
            }
            report_change(step, field, form.can_proceed(), form.errors());
        }
    }
    Ok(())
}

/// Print the outcome of a field change
pub fn report_change(step: Step, field: &str, can_proceed: bool, errors: &FieldErrors) {
    match errors.get(field) {
        Some(message) => println!(
            "{} {} saved, but: {}",
            style("!").yellow(),
            style(field).cyan(),
            style(message).red()
        ),
        None => println!("{} {} saved", style("✓").green(), style(field).cyan()),
    }
    if can_proceed {
        println!(
            "{} Step {} is complete; continue with {}",
            style("✓").green(),
            step.number(),
            style(format!("enroll next {}", step.number())).bold()
        );
    }
}

/// Print the page at `route`; the route must already have passed its guard
pub fn show_page(session: &mut Session, notifier: &dyn Notifier, route: &Route) -> Result<()> {
    match route {
        Route::Home => helpers::print_home(session.store.completed_steps()),
        Route::Step(step) => show_step(session, notifier, *step)?,
        Route::Review => {
            let submitter = SimulatedSubmitter::new(session.config.submit_delay());
            let review = ReviewController::open(&mut session.store, notifier, &submitter)
                .map_err(|to| redirected(&to))?;
            helpers::print_summary(&review.summary());
            println!(
                "Submit with {}",
                style("enroll submit").bold()
            );
        }
        Route::NotFound(path) => {
            return Err(miette::miette!(
                help = "Known pages: /, /enroll/step-1, /enroll/step-2, /enroll/step-3, /enroll/review",
                "404: page not found: {}",
                path
            ));
        }
    }
    Ok(())
}

fn show_step(session: &mut Session, notifier: &dyn Notifier, step: Step) -> Result<()> {
    match step {
        Step::Student => {
            let form = StepController::<StudentDraft>::open(&mut session.store, notifier)
                .map_err(|to| redirected(&to))?;
            helpers::print_form(step, form.form(), form.errors());
        }
        Step::Academic => {
            let form = AcademicStepController::open(&mut session.store, notifier)
                .map_err(|to| redirected(&to))?;
            helpers::print_form(step, form.form(), form.errors());
            let subjects = form.subjects();
            println!(
                "  {} {} of {} subjects chosen (at least {} required)",
                style("·").dim(),
                subjects.selected().len(),
                subjects.available().len(),
                subjects.min_required()
            );
        }
        Step::AddressGuardian => {
            let lookup = session.postal_lookup()?;
            let mut form = AddressStepController::open(&mut session.store, notifier, lookup)
                .map_err(|to| redirected(&to))?;
            if form.pending_lookups() > 0 {
                form.wait(LOOKUP_WAIT);
            }
            helpers::print_form(step, form.form(), form.errors());
            if form.is_state_locked() {
                println!("  {} State detected from PIN code", style("·").dim());
            }
        }
    }
    Ok(())
}

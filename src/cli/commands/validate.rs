//! `enroll validate` command - check a state file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::{print_field_errors, state_path};
use crate::cli::GlobalOpts;
use crate::core::{Config, PersistedState, Step};
use crate::entities::EnrollmentDraft;
use crate::schema::validator::{FieldErrors, Schema, SchemaContext};
use crate::schema::EnvelopeValidator;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// State file to check (default: the active state file)
    pub file: Option<PathBuf>,

    /// Also re-run the step rules for every completed step
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let path = match args.file {
        Some(path) => path,
        None => state_path(global, &Config::load()),
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        miette::miette!(
            help = "Nothing has been saved yet, or the path is wrong",
            "Cannot read {}: {}",
            path.display(),
            e
        )
    })?;

    let validator = EnvelopeValidator::new().into_diagnostic()?;
    validator.check(&content, &path.display().to_string())?;
    println!(
        "{} {} matches the envelope schema",
        style("✓").green(),
        path.display()
    );

    if !args.strict {
        return Ok(());
    }

    let state = PersistedState::from_json(&content).into_diagnostic()?;
    let ctx = SchemaContext::with_class(state.student_details.class_level());
    let mut failed = 0;

    for step in Step::ALL {
        if !state.completed_steps.contains(&step.number()) {
            println!("{} {} not completed", style("○").dim(), step);
            continue;
        }
        let outcome = match step {
            Step::Student => check(&state.student_details, &ctx),
            Step::Academic => check(&state.academic_details, &ctx),
            Step::AddressGuardian => check(&state.address_guardian, &ctx),
        };
        match outcome {
            Ok(()) => println!("{} {} passes its rules", style("✓").green(), step),
            Err(errors) => {
                failed += 1;
                println!(
                    "{} {} is marked complete but fails {} rule(s)",
                    style("✗").red(),
                    step,
                    errors.len()
                );
                print_field_errors(&errors);
            }
        }
    }

    if Step::ALL
        .iter()
        .all(|s| state.completed_steps.contains(&s.number()))
    {
        let draft = EnrollmentDraft {
            student: state.student_details.clone(),
            academic: state.academic_details.clone(),
            address: state.address_guardian.clone(),
        };
        if let Err(errors) = check(&draft, &ctx) {
            failed += 1;
            println!(
                "{} The merged enrollment fails {} rule(s)",
                style("✗").red(),
                errors.len()
            );
            print_field_errors(&errors);
        }
    }

    if failed > 0 {
        return Err(miette::miette!(
            help = "Fix the fields with `enroll set`, or run `enroll reset`",
            "{} check(s) failed",
            failed
        ));
    }
    Ok(())
}

fn check<S: Schema>(draft: &S, ctx: &SchemaContext) -> Result<(), FieldErrors> {
    draft.validate(ctx).map(|_| ())
}

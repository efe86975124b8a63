//! `enroll subjects` command - pick academic subjects for step 2

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{redirected, Session};
use crate::cli::GlobalOpts;
use crate::core::{AcademicStepController, ConsoleNotifier};

#[derive(Subcommand, Debug)]
pub enum SubjectsCommands {
    /// List the subjects on offer for the chosen class
    List,

    /// Select a subject, or deselect it if already chosen
    Toggle {
        /// Subject name, e.g. Physics
        subject: String,
    },

    /// Deselect a subject
    Remove {
        /// Subject name
        subject: String,
    },
}

pub fn run(cmd: SubjectsCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);
    let notifier = ConsoleNotifier;
    let mut form = AcademicStepController::open(&mut session.store, &notifier)
        .map_err(|to| redirected(&to))?;

    match cmd {
        SubjectsCommands::List => {}
        SubjectsCommands::Toggle { subject } => {
            let offered = form.subjects().available();
            let Some(name) = offered.iter().find(|s| s.eq_ignore_ascii_case(&subject)) else {
                return Err(miette::miette!(
                    help = format!("Available: {}", offered.join(", ")),
                    "'{}' is not offered for this class",
                    subject
                ));
            };
            form.toggle_subject(name);
        }
        SubjectsCommands::Remove { subject } => {
            let chosen = form
                .subjects()
                .selected()
                .iter()
                .find(|s| s.eq_ignore_ascii_case(&subject))
                .cloned()
                .unwrap_or(subject);
            form.remove_subject(&chosen);
        }
    }

    let subjects = form.subjects();
    if subjects.available().is_empty() {
        println!(
            "{} No subjects on offer until a class is chosen in step 1",
            style("!").yellow()
        );
    }
    for subject in subjects.available() {
        let marker = if subjects.contains(subject) {
            style("[x]").green()
        } else {
            style("[ ]").dim()
        };
        println!("  {} {}", marker, subject);
    }
    println!();

    let chosen = subjects.selected().len();
    let min = subjects.min_required();
    if subjects.is_satisfied() {
        println!("{} {} selected", style("✓").green(), chosen);
    } else {
        println!(
            "{} {} selected, at least {} required",
            style("!").yellow(),
            chosen,
            min
        );
    }
    Ok(())
}

//! Shared helper functions for CLI commands
//!
//! Opening the store from the layered configuration, and the terminal
//! renderings that several commands print.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::GlobalOpts;
use crate::core::navigation::{first_incomplete, Route, Step};
use crate::core::review::ReviewSection;
use crate::core::{Config, EnrollmentStore, FileStorage, HttpPostalLookup, PostalLookup};
use crate::entities::FormGroup;
use crate::schema::validator::FieldErrors;
use crate::schema::wizard::{current_value, prompts_for};

/// How long a one-shot command waits for a PIN lookup
pub const LOOKUP_WAIT: Duration = Duration::from_secs(15);

/// Configuration plus the store it points at
pub struct Session {
    pub config: Config,
    pub store: EnrollmentStore,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Self {
        let config = Config::load();
        let path = state_path(global, &config);
        tracing::debug!("Using state file {}", path.display());
        let store = EnrollmentStore::load(FileStorage::new(path));
        Self { config, store }
    }

    /// PIN lookup client for the configured service
    pub fn postal_lookup(&self) -> Result<Arc<dyn PostalLookup>> {
        let lookup = HttpPostalLookup::new(self.config.lookup_url()).into_diagnostic()?;
        Ok(Arc::new(lookup))
    }
}

/// State file chosen by `--state`, then configuration
pub fn state_path(global: &GlobalOpts, config: &Config) -> PathBuf {
    global
        .state
        .clone()
        .unwrap_or_else(|| config.state_file())
}

/// Error for a command whose page the guard refused to open
pub fn redirected(route: &Route) -> miette::Report {
    miette::miette!(
        help = format!("Continue with `enroll go {}`", route.path()),
        "Redirected to {}",
        route
    )
}

/// Print where navigation landed
pub fn print_route(route: &Route) {
    println!("{} {}", style("→").cyan(), style(route.path()).bold());
}

/// Print the failing fields of a validation pass
pub fn print_field_errors(errors: &FieldErrors) {
    for error in errors.iter() {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            style(error.path()).cyan(),
            error.message()
        );
    }
}

/// Print a step's form with the current value and error of each field
pub fn print_form<G: FormGroup>(step: Step, form: &G, errors: &FieldErrors) {
    println!(
        "{} Step {} of 3: {}",
        style("◆").cyan(),
        step.number(),
        style(step.title()).bold()
    );
    println!("{}", style("─".repeat(50)).dim());
    for prompt in prompts_for(G::GROUP, None) {
        let value = current_value(form, prompt.name);
        let shown = match value {
            Some(v) => style(v).yellow().to_string(),
            None => style("(empty)".to_string()).dim().to_string(),
        };
        println!("  {:<24} {}", style(prompt.name).cyan(), shown);
        if let Some(message) = errors.get(prompt.name) {
            println!("  {:<24} {}", "", style(message).red());
        }
    }
    println!();
    if errors.is_empty() {
        println!("{} Ready to continue", style("✓").green());
    } else {
        println!(
            "{} {} field(s) need attention",
            style("!").yellow(),
            errors.len()
        );
    }
}

/// Print the home page: every step with its status and where to resume
pub fn print_home(completed: &BTreeSet<u8>) {
    println!("{}", style("Student Enrollment").bold().underlined());
    println!();
    for step in Step::ALL {
        let marker = if completed.contains(&step.number()) {
            style("✓").green()
        } else {
            style("○").dim()
        };
        println!(
            "  {} {}  {}",
            marker,
            style(format!("{:<16}", step.route().path())).cyan(),
            step.title()
        );
    }
    println!(
        "  {} {}  Review & Submit",
        style("○").dim(),
        style(format!("{:<16}", Route::Review.path())).cyan()
    );
    println!();

    let resume = first_incomplete(completed)
        .map(Step::route)
        .unwrap_or(Route::Review);
    println!(
        "Resume with {}",
        style(format!("enroll go {}", resume.path())).bold()
    );
}

/// Print the review summary
pub fn print_summary(sections: &[ReviewSection]) {
    for section in sections {
        println!(
            "{} {}  {}",
            style("◆").cyan(),
            style(section.title).bold(),
            style(format!("(edit: enroll go {})", section.edit.path())).dim()
        );
        for row in &section.rows {
            println!("  {:<22} {}", style(row.label).dim(), row.value);
        }
        println!();
    }
}

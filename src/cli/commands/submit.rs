//! `enroll submit` command - validate everything and submit

use console::style;
use miette::{IntoDiagnostic, Result};
use std::time::Duration;

use crate::cli::helpers::{print_route, redirected, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{ConsoleNotifier, ReviewController, SimulatedSubmitter};

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
    /// Simulated submission delay in milliseconds (overrides config)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Erase the saved state once the enrollment is accepted
    #[arg(long)]
    pub start_over: bool,
}

pub fn run(args: SubmitArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);
    let notifier = ConsoleNotifier;

    let delay = args
        .delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| session.config.submit_delay());
    let submitter = SimulatedSubmitter::new(delay);

    let mut review = ReviewController::open(&mut session.store, &notifier, &submitter)
        .map_err(|to| redirected(&to))?;

    if !global.quiet && global.format != OutputFormat::Json {
        eprintln!("{} Submitting...", style("→").blue());
    }
    let submission = review.submit()?;

    if global.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(submission).into_diagnostic()?
        );
    } else {
        println!(
            "{} Enrollment submitted",
            style("✓").green().bold()
        );
        println!(
            "  {:<14} {}",
            style("Reference").dim(),
            style(&submission.receipt.reference).cyan()
        );
        println!(
            "  {:<14} {}",
            style("Submitted at").dim(),
            submission.receipt.submitted_at.to_rfc3339()
        );
        println!();
        println!("{}", style("Submitted data").bold());
        println!(
            "{}",
            serde_json::to_string_pretty(&submission.record).into_diagnostic()?
        );
    }

    if args.start_over {
        let route = review.start_over();
        if global.format != OutputFormat::Json {
            print_route(&route);
        }
    }
    Ok(())
}

//! `enroll reset` command - erase all saved progress

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{print_route, Session};
use crate::cli::GlobalOpts;
use crate::core::Step;

#[derive(clap::Args, Debug)]
pub struct ResetArgs {
    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);

    if !args.yes {
        if !Term::stdout().is_term() {
            return Err(miette::miette!(
                help = "Pass --yes to erase without a prompt",
                "Refusing to erase saved progress without confirmation"
            ));
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Erase all saved enrollment progress?")
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{}", style("Nothing changed").dim());
            return Ok(());
        }
    }

    session.store.clear_all();
    if !global.quiet {
        println!(
            "{} Cleared saved progress in {}",
            style("✓").green(),
            style(session.store.location()).dim()
        );
    }
    print_route(&Step::Student.route());
    Ok(())
}

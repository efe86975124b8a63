//! `enroll next` command - validate a step and move on

use miette::Result;

use crate::cli::helpers::{print_route, redirected, Session};
use crate::cli::GlobalOpts;
use crate::core::{
    AcademicStepController, AddressStepController, ConsoleNotifier, Step, StepController,
};
use crate::entities::StudentDraft;

#[derive(clap::Args, Debug)]
pub struct NextArgs {
    /// Step to complete: 1, 2, 3 (or student, academic, address)
    pub step: Step,
}

pub fn run(args: NextArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);
    let notifier = ConsoleNotifier;

    let outcome = match args.step {
        Step::Student => StepController::<StudentDraft>::open(&mut session.store, &notifier)
            .map_err(|to| redirected(&to))?
            .proceed(),
        Step::Academic => AcademicStepController::open(&mut session.store, &notifier)
            .map_err(|to| redirected(&to))?
            .proceed(),
        Step::AddressGuardian => {
            let lookup = session.postal_lookup()?;
            AddressStepController::open(&mut session.store, &notifier, lookup)
                .map_err(|to| redirected(&to))?
                .proceed()
        }
    };

    let route = outcome?;
    print_route(&route);
    Ok(())
}

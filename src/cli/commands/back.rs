//! `enroll back` command - leave a step or the review without validating

use miette::Result;

use crate::cli::helpers::{print_route, redirected, Session};
use crate::cli::GlobalOpts;
use crate::core::{guard, ConsoleNotifier, Notifier, Resolution, Route, Step};

#[derive(clap::Args, Debug)]
pub struct BackArgs {
    /// Page to go back from: 1, 2, 3 or review
    pub from: String,
}

pub fn run(args: BackArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global);
    let notifier = ConsoleNotifier;

    let from = Route::parse(&args.from);
    if let Resolution::Redirect { to, notice } = guard(&from, session.store.completed_steps()) {
        notifier.notify(&notice);
        return Err(redirected(&to));
    }

    let route = match from {
        Route::Step(step) => step.previous(),
        Route::Review => Step::AddressGuardian.route(),
        other => {
            return Err(miette::miette!(
                "Cannot go back from {}; expected a step or review",
                other
            ))
        }
    };
    print_route(&route);
    Ok(())
}

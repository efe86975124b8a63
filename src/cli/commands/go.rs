//! `enroll go` command - open a page the way the browser would

use miette::Result;

use crate::cli::commands::utils::show_page;
use crate::cli::helpers::{print_route, Session};
use crate::cli::GlobalOpts;
use crate::core::{guard, ConsoleNotifier, Notifier, Resolution, Route};

#[derive(clap::Args, Debug)]
pub struct GoArgs {
    /// Page to open: a path such as /enroll/step-2, or home, 1, 2, 3, review
    #[arg(default_value = "/")]
    pub page: String,
}

pub fn run(args: GoArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);
    let notifier = ConsoleNotifier;

    let requested = Route::parse(&args.page);
    let route = match guard(&requested, session.store.completed_steps()) {
        Resolution::Allowed(route) => route,
        Resolution::Redirect { to, notice } => {
            notifier.notify(&notice);
            to
        }
    };

    if !global.quiet {
        print_route(&route);
        println!();
    }
    show_page(&mut session, &notifier, &route)
}

//! `enroll pin` command - enter the PIN code and auto-fill the address

use miette::Result;

use crate::cli::commands::utils::apply_change;
use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::{ConsoleNotifier, FieldEdit, Step};

#[derive(clap::Args, Debug)]
pub struct PinArgs {
    /// 6-digit postal PIN code
    pub code: String,
}

pub fn run(args: PinArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);
    apply_change(
        &mut session,
        &ConsoleNotifier,
        Step::AddressGuardian,
        "pinCode",
        FieldEdit::Set(args.code),
    )
}

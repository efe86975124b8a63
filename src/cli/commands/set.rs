//! `enroll set` command - change one form field

use miette::Result;

use crate::cli::commands::utils::apply_change;
use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::{ConsoleNotifier, FieldEdit, Step};

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Step: 1, 2, 3 (or student, academic, address)
    pub step: Step,

    /// Field name, e.g. fullName, weeklyStudyHours, guardianMobile
    pub field: String,

    /// New value; omit to clear the field
    pub value: Option<String>,
}

pub fn run(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global);
    apply_change(
        &mut session,
        &ConsoleNotifier,
        args.step,
        &args.field,
        FieldEdit::from(args.value),
    )
}

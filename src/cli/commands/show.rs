//! `enroll show` command - print the saved state

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::Group;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Only this group (student, academic, address)
    #[arg(long, short = 'g')]
    pub group: Option<Group>,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global);
    let state = session.store.state();

    let format = match global.format {
        OutputFormat::Auto => match session.config.default_format.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        },
        other => other,
    };

    match args.group {
        None => print_value(state, format),
        Some(Group::Student) => print_value(&state.student_details, format),
        Some(Group::Academic) => print_value(&state.academic_details, format),
        Some(Group::AddressGuardian) => print_value(&state.address_guardian, format),
    }
}

fn print_value<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Yaml | OutputFormat::Auto => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
        }
    }
    Ok(())
}

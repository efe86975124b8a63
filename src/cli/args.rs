//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    back::BackArgs, completions::CompletionsArgs, config::ConfigCommands, go::GoArgs,
    next::NextArgs, pin::PinArgs, reset::ResetArgs, schema::SchemaCommands, set::SetArgs,
    show::ShowArgs, start::StartArgs, subjects::SubjectsCommands, submit::SubmitArgs,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "enroll")]
#[command(author, version, about = "Student enrollment wizard")]
#[command(
    long_about = "A four-step enrollment wizard: student details, academic details, address and guardian, then review and submit. Progress is saved after every change."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// State file (default: ENROLL_STATE_FILE, config, or the user data dir)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive wizard from where you left off
    Start(StartArgs),

    /// Open a page (/, step-1..3, review) and show it
    Go(GoArgs),

    /// Change one field of a step's form
    Set(SetArgs),

    /// Pick academic subjects
    #[command(subcommand)]
    Subjects(SubjectsCommands),

    /// Enter the PIN code and auto-fill city and state
    Pin(PinArgs),

    /// Validate a step and move on
    Next(NextArgs),

    /// Go back from a step or the review
    Back(BackArgs),

    /// Print the saved enrollment state
    Show(ShowArgs),

    /// Validate everything and submit the enrollment
    Submit(SubmitArgs),

    /// Erase all saved progress and start over
    Reset(ResetArgs),

    /// Check a state file against the envelope schema
    Validate(ValidateArgs),

    /// Inspect the state file schema and step fields
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable text (yaml for `show`)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// JSON format (for programming)
    Json,
}

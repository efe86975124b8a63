use clap::Parser;
use miette::Result;

use enroll::cli::commands::{
    back, completions, config, go, next, pin, reset, schema, set, show, start, subjects, submit,
    validate,
};
use enroll::cli::{logging, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Start(args) => start::run(args, &global),
        Commands::Go(args) => go::run(args, &global),
        Commands::Set(args) => set::run(args, &global),
        Commands::Subjects(cmd) => subjects::run(cmd, &global),
        Commands::Pin(args) => pin::run(args, &global),
        Commands::Next(args) => next::run(args, &global),
        Commands::Back(args) => back::run(args, &global),
        Commands::Show(args) => show::run(args, &global),
        Commands::Submit(args) => submit::run(args, &global),
        Commands::Reset(args) => reset::run(args, &global),
        Commands::Validate(args) => validate::run(args, &global),
        Commands::Schema(cmd) => schema::run(cmd, &global),
        Commands::Config(cmd) => config::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

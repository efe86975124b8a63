//! Diagnostic logging to stderr via `tracing-subscriber`
//!
//! Default level is `warn`; `-v` raises it to `debug` and `-q` lowers it to
//! `error`. `RUST_LOG` overrides both.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level implied by the global verbosity flags
pub fn level_for(verbose: bool, quiet: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Dependencies stay at warn so a verbose run is not flooded by HTTP internals
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,enroll={level}"))
    });

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(false, false), Level::WARN);
        assert_eq!(level_for(true, false), Level::DEBUG);
        assert_eq!(level_for(false, true), Level::ERROR);
        assert_eq!(level_for(true, true), Level::DEBUG);
    }
}

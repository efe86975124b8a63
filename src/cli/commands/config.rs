//! `enroll config` command - configuration management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::state_path;
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show {
        /// Show only this key's value
        key: Option<String>,

        /// Show the global config file as written
        #[arg(long = "global-only")]
        global_only: bool,
    },

    /// Show the path of the global config file
    Path,

    /// List all configuration keys
    Keys,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("state_file", "Where in-progress enrollment data is saved"),
    ("lookup_url", "Base URL of the PIN code lookup service"),
    ("submit_delay_ms", "Simulated submission delay in milliseconds"),
    ("default_format", "Default output format for `enroll show` (yaml, json)"),
];

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show { key, global_only } => run_show(key, global_only, global),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(key: Option<String>, global_only: bool, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();

    if let Some(key) = &key {
        return match get_config_value(&config, global, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!(
                help = "Run `enroll config keys` to list valid keys",
                "Unknown configuration key '{}'",
                key
            )),
        };
    }

    if global_only {
        return show_global_config();
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        let value = get_config_value(&config, global, key);
        print_config_value(key, value.as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command line (--state)");
    println!("  2. Environment variables (ENROLL_STATE_FILE, ENROLL_LOOKUP_URL, ENROLL_SUBMIT_DELAY_MS)");
    println!("  3. Global config (config.yaml in the user config dir)");
    println!("  4. Built-in defaults");
    Ok(())
}

fn run_path() -> Result<()> {
    let path = Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("{}", style("(not created)").dim());
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<18} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Set them in the file shown by 'enroll config path'.").dim()
    );
    Ok(())
}

fn get_config_value(config: &Config, global: &GlobalOpts, key: &str) -> Option<String> {
    match key {
        "state_file" => Some(state_path(global, config).display().to_string()),
        "lookup_url" => Some(config.lookup_url().to_string()),
        "submit_delay_ms" => Some(config.submit_delay().as_millis().to_string()),
        "default_format" => Some(
            config
                .default_format
                .clone()
                .unwrap_or_else(|| "yaml".to_string()),
        ),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn show_global_config() -> Result<()> {
    let path = Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))?;

    println!(
        "{} {}",
        style("Global config:").bold(),
        style(path.display()).dim()
    );
    println!();

    if path.exists() {
        let content = fs::read_to_string(&path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }
    Ok(())
}

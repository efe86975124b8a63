//! Schema introspection
//!
//! Shows the JSON Schema of the state file and the fields each step asks for,
//! so scripts can drive `enroll set` without reading the docs.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::Step;
use crate::entities::StudentDraft;
use crate::schema::envelope::ENVELOPE_SCHEMA;
use crate::schema::wizard::{prompts_for, FieldKind};

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Show the state file schema
    Show {
        /// Print the raw JSON schema instead of a summary
        #[arg(long)]
        raw: bool,
    },

    /// List the fields of a step and the values they accept
    Fields {
        /// Step: 1, 2, 3 (or student, academic, address)
        step: Step,
    },
}

pub fn run(cmd: SchemaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SchemaCommands::Show { raw } => show_envelope(raw),
        SchemaCommands::Fields { step } => show_fields(step, global),
    }
}

fn show_envelope(raw: bool) -> Result<()> {
    if raw {
        println!("{}", ENVELOPE_SCHEMA);
        return Ok(());
    }

    let schema: Value = serde_json::from_str(ENVELOPE_SCHEMA).into_diagnostic()?;
    let title = schema["title"].as_str().unwrap_or("Enrollment State");
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    if let Some(desc) = schema["description"].as_str() {
        println!("{}\n", desc);
    }

    let Some(props) = schema["properties"].as_object() else {
        return Ok(());
    };
    for (name, prop) in props {
        println!(
            "{:<18} {:<8} {}",
            style(name).cyan(),
            type_str(prop),
            prop["description"].as_str().unwrap_or("")
        );
        if let Some(fields) = prop["properties"].as_object() {
            for (field, field_prop) in fields {
                println!("  {:<24} {}", field, type_str(field_prop));
            }
        }
    }

    println!("\nUse --raw for the full JSON schema");
    Ok(())
}

fn show_fields(step: Step, global: &GlobalOpts) -> Result<()> {
    // Subjects on offer depend on the class already entered
    let session = Session::open(global);
    let class = session.store.group::<StudentDraft>().class_level();

    println!(
        "{} {}",
        style(step).bold(),
        style(step.title()).bold()
    );
    println!("{:<24} {:<10} {}", "FIELD", "REQUIRED", "ACCEPTS");
    println!("{}", "-".repeat(70));

    for prompt in prompts_for(step.group(), class) {
        let accepts = match &prompt.kind {
            FieldKind::Text => "text".to_string(),
            FieldKind::Number => "number".to_string(),
            FieldKind::Switch => "yes | no".to_string(),
            FieldKind::Choice(values) => values.join(" | "),
            FieldKind::MultiChoice(values) if values.is_empty() => {
                "comma-separated list (choose a class first)".to_string()
            }
            FieldKind::MultiChoice(values) => format!("any of: {}", values.join(", ")),
        };
        println!(
            "{:<24} {:<10} {}",
            prompt.name,
            if prompt.required { "yes" } else { "" },
            accepts
        );
    }
    Ok(())
}

fn type_str(prop: &Value) -> String {
    match prop["type"].as_str() {
        Some("array") => match prop["items"]["type"].as_str() {
            Some(items) => format!("{}[]", items),
            None => "array".to_string(),
        },
        Some(t) => t.to_string(),
        None => "any".to_string(),
    }
}

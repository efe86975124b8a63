//! Interactive terminal prompts for the wizard steps
//!
//! Every field of a group is described by a [`FieldPrompt`]; the
//! [`StepWizard`] asks for one field at a time and hands back the raw text the
//! user entered, which the caller feeds to the step controller exactly like a
//! form change event.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::entities::catalog;
use crate::entities::{
    Board, ClassLevel, ExamGoal, FormGroup, Group, Language, PaymentMode, PaymentPlan,
};

/// How a field is asked for
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Switch,
    Choice(Vec<String>),
    MultiChoice(Vec<String>),
}

/// Prompt description for one form field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPrompt {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldPrompt {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

fn choices<T: ToString>(values: &[T]) -> FieldKind {
    FieldKind::Choice(values.iter().map(ToString::to_string).collect())
}

/// Prompts for a group's fields, in form order.
///
/// The subject list on offer depends on the class chosen in step 1.
pub fn prompts_for(group: Group, class: Option<ClassLevel>) -> Vec<FieldPrompt> {
    match group {
        Group::Student => vec![
            FieldPrompt::new("fullName", "Full name", FieldKind::Text),
            FieldPrompt::new("email", "Email", FieldKind::Text),
            FieldPrompt::new("mobile", "Mobile number (+91)", FieldKind::Text),
            FieldPrompt::new("class", "Class", choices(ClassLevel::ALL)),
            FieldPrompt::new("board", "Board", choices(Board::ALL)),
            FieldPrompt::new("preferredLanguage", "Preferred language", choices(Language::ALL)),
        ],
        Group::Academic => vec![
            FieldPrompt::new(
                "subjects",
                "Subjects",
                FieldKind::MultiChoice(
                    catalog::subjects_for(class)
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            ),
            FieldPrompt::new("examGoal", "Exam goal", choices(ExamGoal::ALL)),
            FieldPrompt::new("weeklyStudyHours", "Weekly study hours (1-40)", FieldKind::Number),
            FieldPrompt::new(
                "scholarshipApplication",
                "Apply for scholarship?",
                FieldKind::Switch,
            ),
            FieldPrompt::new("lastExamPercentage", "Last exam percentage", FieldKind::Number)
                .optional(),
            FieldPrompt::new("achievements", "Achievements", FieldKind::Text).optional(),
        ],
        Group::AddressGuardian => vec![
            FieldPrompt::new("pinCode", "PIN code", FieldKind::Text),
            FieldPrompt::new("state", "State", choices(catalog::INDIAN_STATES)),
            FieldPrompt::new("city", "City", FieldKind::Text),
            FieldPrompt::new("addressLine", "Address", FieldKind::Text),
            FieldPrompt::new("guardianName", "Guardian name", FieldKind::Text),
            FieldPrompt::new("guardianMobile", "Guardian mobile (+91)", FieldKind::Text),
            FieldPrompt::new("paymentPlan", "Payment plan", choices(PaymentPlan::ALL)),
            FieldPrompt::new("paymentMode", "Payment mode", choices(PaymentMode::ALL)),
        ],
    }
}

/// Current value of a draft field rendered as prompt text
pub fn current_value<G: FormGroup>(draft: &G, field: &str) -> Option<String> {
    let value = serde_json::to_value(draft).ok()?;
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

/// Asks for field values on the terminal
pub struct StepWizard {
    theme: ColorfulTheme,
}

impl StepWizard {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Print a step heading
    pub fn header(&self, number: u8, title: &str) {
        println!();
        println!(
            "{} Step {} of 3: {}",
            style("◆").cyan(),
            number,
            style(title).bold()
        );
        println!("{}", style("─".repeat(50)).dim());
    }

    /// Ask for one field. `current` pre-fills the answer; `error` is the
    /// message from the last validation pass, shown above the prompt.
    ///
    /// Returns `None` when an optional field is left blank.
    pub fn ask(
        &self,
        field: &FieldPrompt,
        current: Option<&str>,
        error: Option<&str>,
    ) -> Result<Option<String>> {
        if let Some(message) = error {
            println!("  {} {}", style("✗").red(), style(message).red());
        }

        let prompt = if field.required {
            field.label.to_string()
        } else {
            format!("{} {}", field.label, style("(optional)").dim())
        };

        match &field.kind {
            FieldKind::Text | FieldKind::Number => {
                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .allow_empty(!field.required);
                if let Some(value) = current.filter(|v| !v.is_empty()) {
                    input = input.with_initial_text(value);
                }
                let value = input.interact_text().into_diagnostic()?;
                if value.trim().is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value))
                }
            }

            FieldKind::Switch => {
                let default = matches!(current, Some("yes"));
                let answer = Confirm::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .default(default)
                    .interact()
                    .into_diagnostic()?;
                Ok(Some(if answer { "yes" } else { "no" }.to_string()))
            }

            FieldKind::Choice(values) => {
                let default = current
                    .and_then(|c| values.iter().position(|v| v.eq_ignore_ascii_case(c)))
                    .unwrap_or(0);
                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(values)
                    .default(default)
                    .interact()
                    .into_diagnostic()?;
                Ok(Some(values[selection].clone()))
            }

            FieldKind::MultiChoice(values) => {
                let chosen: Vec<&str> = current
                    .map(|c| c.split(',').map(str::trim).collect())
                    .unwrap_or_default();
                let defaults: Vec<bool> = values
                    .iter()
                    .map(|v| chosen.contains(&v.as_str()))
                    .collect();
                let picked = MultiSelect::with_theme(&self.theme)
                    .with_prompt(format!("{} (space to toggle)", prompt))
                    .items(values)
                    .defaults(&defaults)
                    .interact()
                    .into_diagnostic()?;
                let joined = picked
                    .into_iter()
                    .map(|i| values[i].as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Some(joined))
            }
        }
    }
}

impl Default for StepWizard {
    fn default() -> Self {
        Self::new()
    }
}

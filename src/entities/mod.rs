//! Enrollment data groups
//!
//! Each wizard step owns one group. A group exists in two shapes: a *draft*
//! (every field optional, selections kept as the raw chosen string) that the
//! store persists and the form edits, and a *validated* record produced only by
//! the group's schema.

pub mod academic;
pub mod address;
pub mod catalog;
pub mod enrollment;
pub mod student;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::store::PersistedState;
use crate::schema::validator::FieldError;

pub use academic::{AcademicDetails, AcademicDraft};
pub use address::{AddressGuardian, AddressGuardianDraft};
pub use enrollment::{EnrollmentDraft, EnrollmentRecord};
pub use student::{StudentDetails, StudentDraft};

/// Declares a closed set of selectable values with their display strings.
macro_rules! select_options {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every allowed value, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The value as shown to users and persisted
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| format!("Unknown {}: {}", $what, s))
            }
        }
    };
}

select_options! {
    /// School class the student is enrolling into
    ClassLevel, "class" {
        Nine => "9",
        Ten => "10",
        Eleven => "11",
        Twelve => "12",
    }
}

select_options! {
    /// Examination board
    Board, "board" {
        Cbse => "CBSE",
        Icse => "ICSE",
        StateBoard => "State Board",
    }
}

select_options! {
    /// Language of instruction
    Language, "language" {
        English => "English",
        Hindi => "Hindi",
        Hinglish => "Hinglish",
    }
}

select_options! {
    /// Primary academic goal for the year
    ExamGoal, "exam goal" {
        BoardExcellence => "Board Excellence",
        ConceptMastery => "Concept Mastery",
        CompetitivePrep => "Competitive Prep",
    }
}

select_options! {
    /// Fee payment frequency
    PaymentPlan, "payment plan" {
        Quarterly => "Quarterly",
        HalfYearly => "Half-Yearly",
        Annual => "Annual",
    }
}

select_options! {
    /// Fee payment method
    PaymentMode, "payment mode" {
        Upi => "UPI",
        Card => "Card",
        NetBanking => "NetBanking",
    }
}

/// The three data groups, in wizard order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    Student,
    Academic,
    AddressGuardian,
}

impl Group {
    /// Key of this group inside the persisted envelope
    pub fn key(&self) -> &'static str {
        match self {
            Group::Student => "studentDetails",
            Group::Academic => "academicDetails",
            Group::AddressGuardian => "addressGuardian",
        }
    }

    /// Human readable section title
    pub fn title(&self) -> &'static str {
        match self {
            Group::Student => "Student Details",
            Group::Academic => "Academic Details",
            Group::AddressGuardian => "Address & Guardian Details",
        }
    }

    pub fn all() -> &'static [Group] {
        &[Group::Student, Group::Academic, Group::AddressGuardian]
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" | "studentdetails" => Ok(Group::Student),
            "academic" | "academicdetails" => Ok(Group::Academic),
            "address" | "guardian" | "addressguardian" => Ok(Group::AddressGuardian),
            _ => Err(format!("Unknown group: {}", s)),
        }
    }
}

/// A partial update addressed to exactly one group
#[derive(Debug, Clone, PartialEq)]
pub enum GroupPatch {
    Student(StudentDraft),
    Academic(AcademicDraft),
    AddressGuardian(AddressGuardianDraft),
}

impl GroupPatch {
    pub fn group(&self) -> Group {
        match self {
            GroupPatch::Student(_) => Group::Student,
            GroupPatch::Academic(_) => Group::Academic,
            GroupPatch::AddressGuardian(_) => Group::AddressGuardian,
        }
    }
}

/// Form-side behaviour shared by the three group drafts
pub trait FormGroup:
    Clone + Default + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Into<GroupPatch>
{
    /// Which group this draft belongs to
    const GROUP: Group;

    /// Field names in form order
    const FIELDS: &'static [&'static str];

    /// Apply raw user input to one field.
    ///
    /// Unparseable numeric input clears the field and reports the problem, so
    /// the form never holds a value it cannot represent.
    fn set_field(&mut self, field: &str, raw: &str) -> Result<(), FieldError>;

    /// Remove a field's value
    fn clear_field(&mut self, field: &str);

    /// Whether the field currently holds a value
    fn has_value(&self, field: &str) -> bool;

    /// Shallow merge: every field present in `patch` overwrites ours
    fn merge(&mut self, patch: Self);

    /// This group's slice of the persisted state
    fn slice(state: &PersistedState) -> &Self;
}

/// Parse a numeric form input. Blank input means "no value".
pub(crate) fn parse_number(field: &str, raw: &str) -> Result<Option<f64>, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(FieldError::new(field, "Expected a number")),
    }
}

/// Parse a switch/checkbox input
pub(crate) fn parse_switch(field: &str, raw: &str) -> Result<bool, FieldError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "no" | "n" | "off" | "0" | "" => Ok(false),
        _ => Err(FieldError::new(field, "Expected yes or no")),
    }
}

/// Parse a comma-separated list into an ordered set
pub(crate) fn parse_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Overwrite `target` when the patch carries a value
pub(crate) fn take_present<T>(target: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *target = patch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_options_roundtrip_strings() {
        assert_eq!("State Board".parse::<Board>().unwrap(), Board::StateBoard);
        assert_eq!(PaymentPlan::HalfYearly.as_str(), "Half-Yearly");
        assert_eq!(ClassLevel::ALL.len(), 4);
        assert!("state board".parse::<Board>().is_err());
    }

    #[test]
    fn test_select_options_serialize_as_display_text() {
        let json = serde_json::to_string(&ExamGoal::CompetitivePrep).unwrap();
        assert_eq!(json, "\"Competitive Prep\"");
        let class: ClassLevel = serde_json::from_str("\"11\"").unwrap();
        assert_eq!(class, ClassLevel::Eleven);
    }

    #[test]
    fn test_group_from_str() {
        assert_eq!("student".parse::<Group>().unwrap(), Group::Student);
        assert_eq!("addressGuardian".parse::<Group>().unwrap(), Group::AddressGuardian);
        assert!("billing".parse::<Group>().is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("x", " 12 ").unwrap(), Some(12.0));
        assert_eq!(parse_number("x", "").unwrap(), None);
        assert!(parse_number("x", "twelve").is_err());
        assert!(parse_number("x", "NaN").is_err());
    }

    #[test]
    fn test_parse_list_dedupes_in_order() {
        assert_eq!(
            parse_list("Physics, Chemistry,,Physics , Biology"),
            vec!["Physics", "Chemistry", "Biology"]
        );
    }
}

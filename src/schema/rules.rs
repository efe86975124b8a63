//! Reusable field rules. Each returns the normalized value or the message to
//! show against the field.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static LETTERS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("valid name pattern"));

static INDIAN_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("valid mobile pattern"));

static PIN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("valid PIN pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("valid email pattern")
});

pub const NAME_CHARSET_MESSAGE: &str = "Name can only contain letters and spaces";
pub const MOBILE_MESSAGE: &str = "Please enter a valid 10-digit mobile number";

/// Messages for the length checks of a trimmed text field
pub struct LengthMessages<'a> {
    pub too_short: &'a str,
    pub too_long: &'a str,
}

/// Trim, then enforce a character-count window
pub fn trimmed_length(
    value: Option<&str>,
    min: usize,
    max: Option<usize>,
    messages: &LengthMessages<'_>,
) -> Result<String, String> {
    let trimmed = value.unwrap_or_default().trim();
    let count = trimmed.chars().count();
    if count < min {
        return Err(messages.too_short.to_string());
    }
    if max.is_some_and(|max| count > max) {
        return Err(messages.too_long.to_string());
    }
    Ok(trimmed.to_string())
}

/// A person's name: trimmed, length-checked, letters and spaces only
pub fn person_name(
    value: Option<&str>,
    min: usize,
    max: Option<usize>,
    messages: &LengthMessages<'_>,
) -> Result<String, String> {
    let name = trimmed_length(value, min, max, messages)?;
    if !LETTERS_AND_SPACES.is_match(&name) {
        return Err(NAME_CHARSET_MESSAGE.to_string());
    }
    Ok(name)
}

/// Ten digits starting with 6, 7, 8 or 9
pub fn mobile(value: Option<&str>) -> Result<String, String> {
    matching(value, &INDIAN_MOBILE, MOBILE_MESSAGE)
}

pub fn email(value: Option<&str>) -> Result<String, String> {
    const MESSAGE: &str = "Please enter a valid email address";
    let address = matching(value, &EMAIL, MESSAGE)?;
    if address.starts_with('.') || address.contains("..") {
        return Err(MESSAGE.to_string());
    }
    Ok(address)
}

/// Exactly six digits
pub fn pin_code(value: Option<&str>) -> Result<String, String> {
    matching(value, &PIN_CODE, "PIN code must be exactly 6 digits")
}

/// Whether a raw PIN input is complete enough to look up
pub fn is_complete_pin(value: &str) -> bool {
    PIN_CODE.is_match(value)
}

/// One of a closed set of options. Absent and unknown values share `message`.
pub fn selection<T: FromStr>(value: Option<&str>, message: &str) -> Result<T, String> {
    value
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| message.to_string())
}

/// Messages for a bounded number
pub struct RangeMessages<'a> {
    pub required: &'a str,
    pub too_small: &'a str,
    pub too_large: &'a str,
}

/// A number within the closed range `min..=max`
pub fn number_in_range(
    value: Option<f64>,
    min: f64,
    max: f64,
    messages: &RangeMessages<'_>,
) -> Result<f64, String> {
    let n = value.ok_or_else(|| messages.required.to_string())?;
    if n < min {
        return Err(messages.too_small.to_string());
    }
    if n > max {
        return Err(messages.too_large.to_string());
    }
    Ok(n)
}

fn matching(value: Option<&str>, pattern: &Regex, message: &str) -> Result<String, String> {
    match value {
        Some(v) if pattern.is_match(v) => Ok(v.to_string()),
        _ => Err(message.to_string()),
    }
}

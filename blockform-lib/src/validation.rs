//! Field checks as pure functions. `events` attaches them to the DOM.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A problem shown inline under a field. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Email addresses do not match.")]
    EmailMismatch,
    #[error("You must be at least {0} years old.")]
    Underage(u32),
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

/// Empty values pass; anything else must look like `local@domain.tld`.
pub fn validate_email(value: &str) -> Option<ValidationError> {
    (!value.is_empty() && !is_valid_email(value)).then_some(ValidationError::InvalidEmail)
}

pub fn validate_email_match(primary: &str, confirm: &str) -> Option<ValidationError> {
    (primary != confirm).then_some(ValidationError::EmailMismatch)
}

/// Cuts `value` down to `max_length` characters. `None` when it already fits.
pub fn truncate_to_max_length(value: &str, max_length: usize) -> Option<String> {
    (value.chars().count() > max_length).then(|| value.chars().take(max_length).collect())
}

/// The date `years` years before `today`. A day that does not exist in the
/// target year rolls over into the next month (29 Feb becomes 1 Mar).
pub fn years_before(today: NaiveDate, years: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(today.year() - years as i32, today.month(), 1)?;
    first.checked_add_signed(Duration::days(i64::from(today.day()) - 1))
}

/// Flags a `YYYY-MM-DD` birth date later than `today` minus `years`.
///
/// Exactly `years` old today passes. Values that are not dates pass too;
/// `required` handles empty input.
pub fn validate_minimum_age(value: &str, today: NaiveDate, years: u32) -> Option<ValidationError> {
    let birth = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let threshold = years_before(today, years)?;
    (birth > threshold).then_some(ValidationError::Underage(years))
}

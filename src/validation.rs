use chrono::{Months, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MIN_LENGTH: usize = 10;
pub const EMAIL_MAX_LENGTH: usize = 50;
/// Oldest a student may be on the day their birthday is assigned.
pub const MAX_STUDENT_AGE_YEARS: u32 = 65;

lazy_static! {
    // OWASP validation regex repository, "email" entry.
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$"
    )
    .expect("email pattern is a valid regex");
}

/// Raised by a [`Student`](crate::student::Student) mutator when the value
/// it was handed violates a field constraint. The field keeps its previous
/// value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is blank")]
    Blank { field: &'static str },

    #[error("{field} length must be between {min} and {max}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{field} format is invalid")]
    Format { field: &'static str },

    #[error("{field} is null")]
    Missing { field: &'static str },

    #[error("{field} is in the future")]
    InFuture { field: &'static str },

    #[error("Student is too old, maximum age is {max_years} years")]
    TooOld { max_years: u32 },
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Blank { field: "Name" });
    }
    if !has_length_between(name, NAME_MIN_LENGTH, NAME_MAX_LENGTH) {
        return Err(ValidationError::Length {
            field: "Name",
            min: NAME_MIN_LENGTH,
            max: NAME_MAX_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Blank { field: "Email" });
    }
    if !has_length_between(email, EMAIL_MIN_LENGTH, EMAIL_MAX_LENGTH) {
        return Err(ValidationError::Length {
            field: "Email",
            min: EMAIL_MIN_LENGTH,
            max: EMAIL_MAX_LENGTH,
        });
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::Format { field: "Email" });
    }
    Ok(())
}

/// Checks `birthday` against the window `[today - MAX_STUDENT_AGE_YEARS, today]`.
pub fn validate_birthday(
    birthday: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    let birthday = birthday.ok_or(ValidationError::Missing { field: "Birthday" })?;
    if birthday > today {
        return Err(ValidationError::InFuture { field: "Birthday" });
    }
    if birthday < earliest_birthday(today) {
        return Err(ValidationError::TooOld {
            max_years: MAX_STUDENT_AGE_YEARS,
        });
    }
    Ok(birthday)
}

/// Feb 29 minus whole years lands on Feb 28 when the target year has no leap day.
pub fn earliest_birthday(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(MAX_STUDENT_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MIN)
}

// Counting stops one past `max`, so oversized input is rejected without a full scan.
fn has_length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().take(max + 1).count();
    len >= min && len <= max
}

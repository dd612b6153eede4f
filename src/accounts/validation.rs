use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 40;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)^[\w+\-.]+@[a-z\d\-]+(\.[a-z\d\-]+)*\.[a-z]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Name and email checks. Uniqueness needs storage and is checked by the service.
pub fn check_profile(
    first_name: &str,
    last_name: &str,
    email: &str,
    errors: &mut Vec<FieldError>,
) {
    if is_blank(first_name) {
        errors.push(FieldError::FirstNameBlank);
    }
    if is_blank(last_name) {
        errors.push(FieldError::LastNameBlank);
    }
    if is_blank(email) {
        errors.push(FieldError::EmailBlank);
    } else if !is_valid_email(email) {
        errors.push(FieldError::EmailInvalid);
    }
}

pub fn check_password(password: &str, confirmation: &str, errors: &mut Vec<FieldError>) {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        errors.push(FieldError::PasswordLength { len });
    }
    if password != confirmation {
        errors.push(FieldError::PasswordConfirmation);
    }
}

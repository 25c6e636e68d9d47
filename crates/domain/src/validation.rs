// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::Date;

/// Validates that a required text field is not blank.
///
/// # Arguments
///
/// * `field` - The field name reported in the error
/// * `value` - The submitted value
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the trimmed value is empty.
pub fn validate_required(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_field(field, "cannot be empty"));
    }
    Ok(())
}

/// Validates the shape of an email address.
///
/// Only the structure is checked: one `@`, a non-empty local part and a
/// dotted domain without whitespace.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the address is malformed.
pub fn validate_email(field: &'static str, value: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::invalid_field(field, format!("'{value}' is not an email address"));

    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dotted = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'));
    if !dotted {
        return Err(invalid());
    }
    Ok(())
}

/// Validates that a contract's end date is not before its start date.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeWindow` if `end < start`.
pub fn validate_date_window(start: Date, end: Date) -> Result<(), DomainError> {
    if end < start {
        return Err(DomainError::InvalidTimeWindow { subject: "contract" });
    }
    Ok(())
}

/// Validates an optional matricule: when present it must be non-blank
/// and alphanumeric.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` for a malformed matricule.
pub fn validate_matricule(value: Option<&str>) -> Result<(), DomainError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_empty() || !value.chars().all(char::is_alphanumeric) {
        return Err(DomainError::invalid_field(
            "matricule",
            format!("'{value}' must be non-empty and alphanumeric"),
        ));
    }
    Ok(())
}

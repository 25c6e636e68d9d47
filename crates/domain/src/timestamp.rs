// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! RFC 3339 helpers for storing and transporting instants.

use crate::error::DomainError;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset};

/// Formats an instant as RFC 3339 in UTC.
///
/// Falls back to the unix timestamp for instants RFC 3339 cannot express
/// (years outside 0..=9999).
#[must_use]
pub fn format_timestamp(value: OffsetDateTime) -> String {
    let utc = value.to_offset(UtcOffset::UTC);
    utc.format(&Rfc3339)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Parses an RFC 3339 instant and normalizes it to UTC.
///
/// # Errors
///
/// Returns `DomainError::TimestampParseError` if the value is not RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|ts| ts.to_offset(UtcOffset::UTC))
        .map_err(|e| DomainError::TimestampParseError {
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(value: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        value.year(),
        u8::from(value.month()),
        value.day()
    )
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::TimestampParseError` if the value is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|e| DomainError::TimestampParseError {
        value: value.to_string(),
        error: e.to_string(),
    })
}

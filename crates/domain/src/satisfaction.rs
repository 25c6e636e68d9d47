// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::OffsetDateTime;

/// A client rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Creates a rating.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRating` if `value` is outside 1..=5.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(DomainError::InvalidRating(value))
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

/// A client's satisfaction record for a finished ticket.
///
/// At most one per ticket; read-only once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Satisfaction {
    pub satisfaction_id: i64,
    pub ticket_id: i64,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Satisfaction {
    /// True if a resubmission carries the same rating and comment.
    ///
    /// Blank comments compare equal to no comment.
    #[must_use]
    pub fn matches(&self, rating: Rating, comment: Option<&str>) -> bool {
        fn normalize(c: Option<&str>) -> Option<&str> {
            c.map(str::trim).filter(|c| !c.is_empty())
        }

        self.rating == rating && normalize(self.comment.as_deref()) == normalize(comment)
    }
}

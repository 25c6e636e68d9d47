// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Rating, Satisfaction};
use time::macros::datetime;

#[test]
fn test_rating_bounds() {
    for value in 1..=5 {
        assert_eq!(i64::from(Rating::new(value).unwrap().value()), value);
    }
    assert_eq!(Rating::new(0), Err(DomainError::InvalidRating(0)));
    assert_eq!(Rating::new(6), Err(DomainError::InvalidRating(6)));
    assert_eq!(Rating::new(-1), Err(DomainError::InvalidRating(-1)));
    assert_eq!(Rating::new(261), Err(DomainError::InvalidRating(261)));
}

#[test]
fn test_resubmission_matching() {
    let existing = Satisfaction {
        satisfaction_id: 1,
        ticket_id: 10,
        rating: Rating::new(5).unwrap(),
        comment: Some(String::from("Rapide et propre")),
        created_at: datetime!(2026-02-12 17:00 UTC),
    };

    assert!(existing.matches(Rating::new(5).unwrap(), Some("Rapide et propre")));
    assert!(existing.matches(Rating::new(5).unwrap(), Some("  Rapide et propre ")));
    assert!(!existing.matches(Rating::new(4).unwrap(), Some("Rapide et propre")));
    assert!(!existing.matches(Rating::new(5).unwrap(), None));
}

#[test]
fn test_blank_comment_matches_missing_comment() {
    let existing = Satisfaction {
        satisfaction_id: 1,
        ticket_id: 10,
        rating: Rating::new(3).unwrap(),
        comment: None,
        created_at: datetime!(2026-02-12 17:00 UTC),
    };

    assert!(existing.matches(Rating::new(3).unwrap(), Some("   ")));
    assert!(existing.matches(Rating::new(3).unwrap(), None));
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CoreError, Mutation, submit_satisfaction};
use fieldops_domain::{DomainError, ErrorKind, Rating, Satisfaction, TicketState};

use super::helpers::{NOW, create_test_context, create_test_ticket};

#[test]
fn test_submit_on_finished_ticket() {
    let ticket = create_test_ticket(TicketState::Termine);

    let result = submit_satisfaction(
        &ticket,
        None,
        5,
        Some(String::from(" Très bien ")),
        &create_test_context(),
    )
    .unwrap();
    let Mutation::CreateSatisfaction(satisfaction) = result.mutation else {
        panic!("expected CreateSatisfaction");
    };
    assert_eq!(satisfaction.rating.value(), 5);
    assert_eq!(satisfaction.comment.as_deref(), Some("Très bien"));
    assert_eq!(satisfaction.created_at, NOW);
}

#[test]
fn test_submit_requires_finished_ticket() {
    let ticket = create_test_ticket(TicketState::EnCours);

    let err = submit_satisfaction(&ticket, None, 4, None, &create_test_context()).unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::TicketNotFinished {
            ticket_id: 10,
            state: TicketState::EnCours
        })
    );
}

#[test]
fn test_submit_rejects_out_of_range_rating() {
    let ticket = create_test_ticket(TicketState::Termine);
    let ctx = create_test_context();

    for rating in [0, 6, -3] {
        let err = submit_satisfaction(&ticket, None, rating, None, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn test_second_submission_conflicts() {
    let ticket = create_test_ticket(TicketState::Termine);
    let existing = Satisfaction {
        satisfaction_id: 1,
        ticket_id: 10,
        rating: Rating::new(5).unwrap(),
        comment: None,
        created_at: NOW,
    };

    let err = submit_satisfaction(&ticket, Some(&existing), 3, None, &create_test_context())
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::SatisfactionAlreadySubmitted { ticket_id: 10 })
    );
}

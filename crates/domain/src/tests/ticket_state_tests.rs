// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Ticket, TicketState, displayed_state};
use std::str::FromStr;
use time::macros::datetime;

fn ticket_in(state: TicketState) -> Ticket {
    Ticket {
        ticket_id: 10,
        title: String::from("Fuite toiture"),
        description: String::new(),
        site_id: 7,
        demande_id: Some(1),
        affaire_id: Some(2),
        doe_id: Some(3),
        state,
        responsable_id: None,
        started_at: datetime!(2026-02-11 08:00 UTC),
        ended_at: None,
    }
}

#[test]
fn test_state_string_round_trip() {
    for state in [
        TicketState::PasCommence,
        TicketState::EnAttente,
        TicketState::EnCours,
        TicketState::Bloque,
        TicketState::Termine,
    ] {
        assert_eq!(TicketState::from_str(state.as_str()).unwrap(), state);
    }
    assert!(TicketState::from_str("termine").is_err());
}

#[test]
fn test_valid_transitions() {
    use TicketState::{Bloque, EnAttente, EnCours, PasCommence, Termine};

    assert!(PasCommence.can_transition_to(EnAttente));
    assert!(PasCommence.can_transition_to(EnCours));
    assert!(EnAttente.can_transition_to(EnCours));
    assert!(EnCours.can_transition_to(Bloque));
    assert!(EnCours.can_transition_to(Termine));
    assert!(Bloque.can_transition_to(EnCours));
    assert!(Bloque.can_transition_to(Termine));
}

#[test]
fn test_invalid_transitions() {
    use TicketState::{Bloque, EnAttente, EnCours, PasCommence, Termine};

    assert!(!PasCommence.can_transition_to(Termine));
    assert!(!PasCommence.can_transition_to(Bloque));
    assert!(!EnAttente.can_transition_to(Termine));
    assert!(!EnCours.can_transition_to(PasCommence));
    assert!(!Termine.can_transition_to(EnCours));
    assert!(!EnCours.can_transition_to(EnCours));
}

#[test]
fn test_displayed_state_overrides_only_not_started() {
    assert_eq!(
        displayed_state(TicketState::PasCommence, 0),
        TicketState::PasCommence
    );
    assert_eq!(
        displayed_state(TicketState::PasCommence, 1),
        TicketState::EnCours
    );
    assert_eq!(
        displayed_state(TicketState::EnAttente, 3),
        TicketState::EnAttente
    );
    assert_eq!(displayed_state(TicketState::Termine, 3), TicketState::Termine);
}

#[test]
fn test_displayed_state_leaves_stored_state_untouched() {
    let ticket = ticket_in(TicketState::PasCommence);
    assert_eq!(ticket.displayed_state(2), TicketState::EnCours);
    assert_eq!(ticket.state, TicketState::PasCommence);
}

#[test]
fn test_transition_checked_against_effective_state() {
    let ticket = ticket_in(TicketState::PasCommence);

    // With interventions the ticket is effectively En_cours.
    assert!(ticket.validate_transition(1, TicketState::Termine).is_ok());
    assert_eq!(
        ticket.validate_transition(0, TicketState::Termine),
        Err(DomainError::InvalidTicketTransition {
            ticket_id: 10,
            from: TicketState::PasCommence,
            to: TicketState::Termine,
        })
    );
}

#[test]
fn test_open_tickets_are_not_finished() {
    assert!(ticket_in(TicketState::Bloque).is_open());
    assert!(!ticket_in(TicketState::Termine).is_open());
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket state machine and display-state derivation.
//!
//! Valid transitions, evaluated on the effective state:
//!
//! ```text
//! Pas_commence → En_attente | En_cours
//! En_attente   → En_cours
//! En_cours     → Bloque | Termine
//! Bloque       → En_cours | Termine
//! Termine      → (terminal)
//! ```
//!
//! A ticket whose stored state is `Pas_commence` but which already has
//! interventions is displayed as `En_cours`. That override is a pure view
//! function; it never writes back to the stored state.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Work state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketState {
    #[default]
    #[serde(rename = "Pas_commence")]
    PasCommence,
    #[serde(rename = "En_attente")]
    EnAttente,
    #[serde(rename = "En_cours")]
    EnCours,
    #[serde(rename = "Bloque")]
    Bloque,
    #[serde(rename = "Termine")]
    Termine,
}

impl TicketState {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PasCommence => "Pas_commence",
            Self::EnAttente => "En_attente",
            Self::EnCours => "En_cours",
            Self::Bloque => "Bloque",
            Self::Termine => "Termine",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Termine)
    }

    /// Checks the state machine, ignoring reopen policy.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::PasCommence, Self::EnAttente | Self::EnCours)
                | (Self::EnAttente | Self::Bloque, Self::EnCours)
                | (Self::EnCours, Self::Bloque | Self::Termine)
                | (Self::Bloque, Self::Termine)
        )
    }
}

impl FromStr for TicketState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pas_commence" => Ok(Self::PasCommence),
            "En_attente" => Ok(Self::EnAttente),
            "En_cours" => Ok(Self::EnCours),
            "Bloque" => Ok(Self::Bloque),
            "Termine" => Ok(Self::Termine),
            _ => Err(DomainError::UnknownStatus {
                family: "ticket",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the state shown to users from the stored state.
///
/// Any intervention means work has begun, so `Pas_commence` is shown as
/// `En_cours`. Every other stored state is shown as is.
#[must_use]
pub const fn displayed_state(stored: TicketState, intervention_count: usize) -> TicketState {
    match stored {
        TicketState::PasCommence if intervention_count > 0 => TicketState::EnCours,
        other => other,
    }
}

/// The actionable unit of work executed against a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub ticket_id: i64,
    pub title: String,
    pub description: String,
    pub site_id: i64,
    /// The demande this ticket was converted from, if any.
    pub demande_id: Option<i64>,
    pub affaire_id: Option<i64>,
    pub doe_id: Option<i64>,
    /// Stored state; see [`Ticket::displayed_state`] for what users see.
    pub state: TicketState,
    /// User id of the primary responsable.
    pub responsable_id: Option<i64>,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
}

impl Ticket {
    #[must_use]
    pub const fn displayed_state(&self, intervention_count: usize) -> TicketState {
        displayed_state(self.state, intervention_count)
    }

    /// Open tickets are all tickets that are not finished.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Validates a transition against the effective state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTicketTransition` if the state machine
    /// does not allow moving from the effective state to `target`.
    pub const fn validate_transition(
        &self,
        intervention_count: usize,
        target: TicketState,
    ) -> Result<(), DomainError> {
        let from = self.displayed_state(intervention_count);
        if from.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTicketTransition {
                ticket_id: self.ticket_id,
                from,
                to: target,
            })
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Interventions and elapsed-time computation.

use crate::error::DomainError;
use crate::ticket::TicketState;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Status of a single intervention.
///
/// A subset of the ticket states: an intervention is never "not started".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterventionStatus {
    #[serde(rename = "En_attente")]
    EnAttente,
    #[default]
    #[serde(rename = "En_cours")]
    EnCours,
    #[serde(rename = "Bloque")]
    Bloque,
    #[serde(rename = "Termine")]
    Termine,
}

impl InterventionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.as_ticket_state().as_str()
    }

    #[must_use]
    pub const fn as_ticket_state(&self) -> TicketState {
        match self {
            Self::EnAttente => TicketState::EnAttente,
            Self::EnCours => TicketState::EnCours,
            Self::Bloque => TicketState::Bloque,
            Self::Termine => TicketState::Termine,
        }
    }
}

impl FromStr for InterventionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "En_attente" => Ok(Self::EnAttente),
            "En_cours" => Ok(Self::EnCours),
            "Bloque" => Ok(Self::Bloque),
            "Termine" => Ok(Self::Termine),
            _ => Err(DomainError::UnknownStatus {
                family: "intervention",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of field work performed against a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervention {
    pub intervention_id: i64,
    pub ticket_id: i64,
    pub description: String,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    pub status: InterventionStatus,
    /// Earlier intervention of the same ticket this one continues.
    pub previous_intervention_id: Option<i64>,
}

impl Intervention {
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Elapsed time measured against the wall clock.
    #[must_use]
    pub fn elapsed(&self) -> Elapsed {
        elapsed(self.started_at, self.ended_at)
    }
}

/// A duration split into whole days, hours and minutes.
///
/// `duration` keeps full precision; the components are truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub duration: Duration,
}

impl Elapsed {
    #[must_use]
    pub const fn from_duration(duration: Duration) -> Self {
        let duration = if duration.is_negative() {
            Duration::ZERO
        } else {
            duration
        };
        let total_minutes = duration.whole_minutes();
        Self {
            days: total_minutes / (24 * 60),
            hours: (total_minutes / 60) % 24,
            minutes: total_minutes % 60,
            duration,
        }
    }
}

/// Computes elapsed time from `start` to `end`, or to now when `end` is unset.
///
/// Never persisted; recomputed on every read.
#[must_use]
pub fn elapsed(start: OffsetDateTime, end: Option<OffsetDateTime>) -> Elapsed {
    elapsed_at(start, end, OffsetDateTime::now_utc())
}

/// Same as [`elapsed`] with an explicit "now".
///
/// An end before the start yields zero.
#[must_use]
pub fn elapsed_at(
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Elapsed {
    Elapsed::from_duration(end.unwrap_or(now) - start)
}

/// Rejects a window whose end precedes its start.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeWindow` when `end < start`.
pub fn validate_window(
    subject: &'static str,
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
) -> Result<(), DomainError> {
    match end {
        Some(end) if end < start => Err(DomainError::InvalidTimeWindow { subject }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_elapsed_splits_components() {
        let start = datetime!(2026-03-01 08:00 UTC);
        let end = datetime!(2026-03-02 10:35 UTC);

        let e = elapsed_at(start, Some(end), end);
        assert_eq!(e.days, 1);
        assert_eq!(e.hours, 2);
        assert_eq!(e.minutes, 35);
        assert_eq!(e.duration, Duration::minutes(26 * 60 + 35));
    }

    #[test]
    fn test_elapsed_without_end_uses_now() {
        let start = datetime!(2026-03-01 08:00 UTC);
        let now = datetime!(2026-03-01 08:45 UTC);

        let e = elapsed_at(start, None, now);
        assert_eq!(e.days, 0);
        assert_eq!(e.hours, 0);
        assert_eq!(e.minutes, 45);
    }

    #[test]
    fn test_elapsed_clamps_negative_to_zero() {
        let start = datetime!(2026-03-01 08:00 UTC);
        let now = datetime!(2026-03-01 07:00 UTC);

        let e = elapsed_at(start, None, now);
        assert_eq!(e.duration, Duration::ZERO);
        assert_eq!((e.days, e.hours, e.minutes), (0, 0, 0));
    }

    #[test]
    fn test_validate_window() {
        let start = datetime!(2026-03-01 08:00 UTC);
        assert!(validate_window("intervention", start, None).is_ok());
        assert!(validate_window("intervention", start, Some(start)).is_ok());
        assert!(matches!(
            validate_window("intervention", start, Some(start - Duration::minutes(1))),
            Err(DomainError::InvalidTimeWindow {
                subject: "intervention"
            })
        ));
    }
}

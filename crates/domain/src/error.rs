// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::demande::DemandeStatus;
use crate::ticket::TicketState;

/// Broad classification of a domain error.
///
/// The transport layer maps each kind to a status code; the domain never
/// knows about HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// An identifier did not resolve.
    NotFound,
    /// The request duplicates something that may exist only once.
    Conflict,
    /// The entity is frozen and cannot be edited.
    Locked,
    /// The entity is not in a state that permits the operation.
    Precondition,
}

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is empty or malformed.
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// A satisfaction rating outside 1..=5.
    InvalidRating(i64),
    /// An end instant precedes its start instant.
    InvalidTimeWindow {
        /// What the window describes (e.g. "intervention").
        subject: &'static str,
    },
    /// A stored or submitted status string is not recognized.
    UnknownStatus {
        /// The status family ("ticket", "demande", ...).
        family: &'static str,
        /// The unrecognized value.
        value: String,
    },
    /// Failed to parse a timestamp.
    TimestampParseError {
        /// The invalid timestamp string.
        value: String,
        /// The parser message.
        error: String,
    },
    /// A conversation identifier is not of the form `<kind>-<id>`.
    InvalidConversationId(String),
    /// A message carries neither a body nor attachments.
    EmptyMessage,
    /// An attachment is missing its file name or storage reference.
    InvalidAttachment(String),
    /// The message receiver does not resolve to a known user.
    UnknownReceiver(String),
    /// No default counterpart could be inferred for a message.
    NoDefaultReceiver {
        /// The conversation the message was posted to.
        conversation_id: String,
    },
    /// The site belongs to a different client than the demande.
    SiteClientMismatch {
        /// The site.
        site_id: i64,
        /// The client the demande is filed for.
        client_id: i64,
    },
    /// A chained intervention points at an intervention of another ticket.
    InterventionChainMismatch {
        /// The referenced previous intervention.
        previous_id: i64,
        /// The ticket the new intervention belongs to.
        ticket_id: i64,
    },
    /// A user does not hold a role permitted for an assignment.
    InvalidAssignee {
        /// The user's login or matricule.
        user: String,
        /// Why the user cannot be assigned.
        reason: String,
    },
    /// An entity was not found.
    EntityNotFound {
        /// The entity type ("client", "ticket", ...).
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },
    /// The demande already has a ticket.
    DemandeAlreadyConverted {
        /// The demande.
        demande_id: i64,
        /// The ticket created by the earlier conversion.
        ticket_id: i64,
    },
    /// The ticket already carries a satisfaction record.
    SatisfactionAlreadySubmitted {
        /// The ticket.
        ticket_id: i64,
    },
    /// The intervention already has an end time.
    InterventionAlreadyClosed {
        /// The intervention.
        intervention_id: i64,
    },
    /// A unique value is already taken.
    DuplicateValue {
        /// The unique field.
        field: &'static str,
        /// The duplicated value.
        value: String,
    },
    /// The demande was converted to a ticket and is frozen.
    DemandeLocked {
        /// The demande.
        demande_id: i64,
        /// The ticket it was converted into.
        ticket_id: i64,
    },
    /// The demande was rejected or cancelled.
    DemandeClosed {
        /// The demande.
        demande_id: i64,
        /// Its terminal status.
        status: DemandeStatus,
    },
    /// The ticket state machine forbids the requested transition.
    InvalidTicketTransition {
        /// The ticket.
        ticket_id: i64,
        /// The effective state.
        from: TicketState,
        /// The requested state.
        to: TicketState,
    },
    /// Satisfaction requires a finished ticket.
    TicketNotFinished {
        /// The ticket.
        ticket_id: i64,
        /// Its stored state.
        state: TicketState,
    },
    /// The ticket is finished; its interventions are frozen.
    TicketClosed {
        /// The ticket.
        ticket_id: i64,
    },
    /// Reopening finished tickets is disabled.
    ReopenNotAllowed {
        /// The ticket.
        ticket_id: i64,
    },
}

impl DomainError {
    /// Convenience constructor for [`DomainError::InvalidField`].
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`DomainError::EntityNotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::EntityNotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField { .. }
            | Self::InvalidRating(_)
            | Self::InvalidTimeWindow { .. }
            | Self::UnknownStatus { .. }
            | Self::TimestampParseError { .. }
            | Self::InvalidConversationId(_)
            | Self::EmptyMessage
            | Self::InvalidAttachment(_)
            | Self::UnknownReceiver(_)
            | Self::NoDefaultReceiver { .. }
            | Self::SiteClientMismatch { .. }
            | Self::InterventionChainMismatch { .. }
            | Self::InvalidAssignee { .. } => ErrorKind::Validation,
            Self::EntityNotFound { .. } => ErrorKind::NotFound,
            Self::DemandeAlreadyConverted { .. }
            | Self::SatisfactionAlreadySubmitted { .. }
            | Self::InterventionAlreadyClosed { .. }
            | Self::DuplicateValue { .. } => ErrorKind::Conflict,
            Self::DemandeLocked { .. } => ErrorKind::Locked,
            Self::DemandeClosed { .. }
            | Self::InvalidTicketTransition { .. }
            | Self::TicketNotFinished { .. }
            | Self::TicketClosed { .. }
            | Self::ReopenNotAllowed { .. } => ErrorKind::Precondition,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::InvalidRating(rating) => {
                write!(f, "Invalid rating: {rating}. Must be between 1 and 5")
            }
            Self::InvalidTimeWindow { subject } => {
                write!(f, "Invalid {subject} window: end precedes start")
            }
            Self::UnknownStatus { family, value } => {
                write!(f, "Unknown {family} status: '{value}'")
            }
            Self::TimestampParseError { value, error } => {
                write!(f, "Failed to parse timestamp '{value}': {error}")
            }
            Self::InvalidConversationId(value) => write!(
                f,
                "Invalid conversation id '{value}': expected 'demande-<id>' or 'ticket-<id>'"
            ),
            Self::EmptyMessage => write!(f, "A message needs a body or at least one attachment"),
            Self::InvalidAttachment(reason) => write!(f, "Invalid attachment: {reason}"),
            Self::UnknownReceiver(receiver) => {
                write!(f, "Receiver '{receiver}' is not a known user")
            }
            Self::NoDefaultReceiver { conversation_id } => write!(
                f,
                "No receiver given and none could be inferred for conversation '{conversation_id}'"
            ),
            Self::SiteClientMismatch { site_id, client_id } => {
                write!(f, "Site {site_id} does not belong to client {client_id}")
            }
            Self::InterventionChainMismatch {
                previous_id,
                ticket_id,
            } => write!(
                f,
                "Previous intervention {previous_id} does not belong to ticket {ticket_id}"
            ),
            Self::InvalidAssignee { user, reason } => {
                write!(f, "User '{user}' cannot be assigned: {reason}")
            }
            Self::EntityNotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::DemandeAlreadyConverted {
                demande_id,
                ticket_id,
            } => write!(
                f,
                "Demande {demande_id} was already converted into ticket {ticket_id}"
            ),
            Self::SatisfactionAlreadySubmitted { ticket_id } => {
                write!(f, "Ticket {ticket_id} already has a satisfaction record")
            }
            Self::InterventionAlreadyClosed { intervention_id } => {
                write!(f, "Intervention {intervention_id} is already closed")
            }
            Self::DuplicateValue { field, value } => {
                write!(f, "A record with {field} '{value}' already exists")
            }
            Self::DemandeLocked {
                demande_id,
                ticket_id,
            } => write!(
                f,
                "Demande {demande_id} is locked: it was converted into ticket {ticket_id}"
            ),
            Self::DemandeClosed { demande_id, status } => {
                write!(f, "Demande {demande_id} is closed with status '{status}'")
            }
            Self::InvalidTicketTransition {
                ticket_id,
                from,
                to,
            } => write!(
                f,
                "Ticket {ticket_id} cannot move from '{from}' to '{to}'"
            ),
            Self::TicketNotFinished { ticket_id, state } => write!(
                f,
                "Ticket {ticket_id} is '{state}': satisfaction requires a finished ticket"
            ),
            Self::TicketClosed { ticket_id } => {
                write!(f, "Ticket {ticket_id} is finished; its interventions are frozen")
            }
            Self::ReopenNotAllowed { ticket_id } => {
                write!(f, "Ticket {ticket_id} is finished and reopening is disabled")
            }
        }
    }
}

impl std::error::Error for DomainError {}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API error types and their translation from lower layers.

use fieldops::CoreError;
use fieldops_domain::{DomainError, ErrorKind};
use fieldops_persistence::PersistenceError;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The actor header was missing or named an unknown login.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role does not permit the action.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Each variant maps to exactly one HTTP status in the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource.
        resource_type: String,
        /// A human-readable description.
        message: String,
    },
    /// The request duplicates something that may exist only once, or lost a race.
    #[error("Conflict on '{rule}': {message}")]
    Conflict {
        /// The uniqueness rule involved.
        rule: String,
        /// A human-readable description.
        message: String,
    },
    /// The entity is frozen.
    #[error("Locked: {message}")]
    Locked {
        /// A human-readable description.
        message: String,
    },
    /// The entity is not in a state that permits the operation.
    #[error("Precondition '{rule}' failed: {message}")]
    PreconditionFailed {
        /// The rule that was not satisfied.
        rule: String,
        /// A human-readable description.
        message: String,
    },
    /// An uploaded CSV could not be read at all.
    #[error("Invalid CSV format: {reason}")]
    InvalidCsvFormat {
        /// Why the file was rejected.
        reason: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A human-readable description.
        message: String,
    },
}

impl ApiError {
    /// Stable machine-readable name of the error class.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "unauthenticated",
            Self::Unauthorized { .. } => "forbidden",
            Self::InvalidInput { .. } | Self::InvalidCsvFormat { .. } => "validation",
            Self::ResourceNotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Locked { .. } => "locked",
            Self::PreconditionFailed { .. } => "precondition",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Name of the input field a validation error refers to.
const fn validation_field(err: &DomainError) -> &'static str {
    match err {
        DomainError::InvalidField { field, .. } => *field,
        DomainError::InvalidRating(_) => "rating",
        DomainError::InvalidTimeWindow { .. } => "ended_at",
        DomainError::UnknownStatus { .. } => "status",
        DomainError::TimestampParseError { .. } => "timestamp",
        DomainError::InvalidConversationId(_) => "conversation_id",
        DomainError::EmptyMessage => "body",
        DomainError::InvalidAttachment(_) => "attachments",
        DomainError::UnknownReceiver(_) | DomainError::NoDefaultReceiver { .. } => "receiver_id",
        DomainError::SiteClientMismatch { .. } => "site_id",
        DomainError::InterventionChainMismatch { .. } => "previous_intervention_id",
        DomainError::InvalidAssignee { .. } => "matricule",
        _ => "request",
    }
}

/// Rule name reported for conflict and precondition errors.
const fn rule_name(err: &DomainError) -> &'static str {
    match err {
        DomainError::DemandeAlreadyConverted { .. } => "single_conversion",
        DomainError::SatisfactionAlreadySubmitted { .. } => "single_satisfaction",
        DomainError::InterventionAlreadyClosed { .. } => "intervention_open",
        DomainError::DuplicateValue { field, .. } => *field,
        DomainError::DemandeClosed { .. } => "demande_open",
        DomainError::InvalidTicketTransition { .. } => "ticket_transition",
        DomainError::TicketNotFinished { .. } => "ticket_finished",
        DomainError::TicketClosed { .. } => "ticket_open",
        DomainError::ReopenNotAllowed { .. } => "ticket_reopen",
        _ => "domain_rule",
    }
}

/// Translates a domain error into an API error.
///
/// The error's [`ErrorKind`] selects the API variant; the message is the
/// domain error's own description.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message = err.to_string();
    match err.kind() {
        ErrorKind::Validation => ApiError::InvalidInput {
            field: String::from(validation_field(&err)),
            message,
        },
        ErrorKind::NotFound => {
            let resource_type = match &err {
                DomainError::EntityNotFound { entity, .. } => String::from(*entity),
                _ => String::from("resource"),
            };
            ApiError::ResourceNotFound {
                resource_type,
                message,
            }
        }
        ErrorKind::Conflict => ApiError::Conflict {
            rule: String::from(rule_name(&err)),
            message,
        },
        ErrorKind::Locked => ApiError::Locked { message },
        ErrorKind::Precondition => ApiError::PreconditionFailed {
            rule: String::from(rule_name(&err)),
            message,
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Constraint failures surface as conflicts or validation errors; anything
/// else is an internal error and is logged.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(message) => ApiError::Conflict {
            rule: String::from("unique_constraint"),
            message,
        },
        PersistenceError::ConditionalWriteFailed { entity, id } => ApiError::Conflict {
            rule: String::from("concurrent_modification"),
            message: format!("{entity} {id} changed while the request was processed"),
        },
        PersistenceError::EntityNotFound { entity, id } => ApiError::ResourceNotFound {
            resource_type: String::from(entity),
            message: format!("{entity} {id} not found"),
        },
        PersistenceError::EventNotFound(event_id) => ApiError::ResourceNotFound {
            resource_type: String::from("audit event"),
            message: format!("audit event {event_id} not found"),
        },
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("resource"),
            message,
        },
        PersistenceError::ForeignKeyViolation(message) => ApiError::InvalidInput {
            field: String::from("reference"),
            message,
        },
        other => {
            tracing::error!(error = %other, "Persistence failure");
            ApiError::Internal {
                message: other.to_string(),
            }
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use fieldops_domain::{DomainError, UserRole};
use std::str::FromStr;
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// The authenticated user performing an action.
///
/// The role is resolved from the user store, never taken from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The user's store id.
    pub user_id: i64,
    /// The user's login.
    pub login: String,
    /// The role held when the action was performed.
    pub role: UserRole,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's store id
    /// * `login` - The user's login
    /// * `role` - The user's role
    #[must_use]
    pub const fn new(user_id: i64, login: String, role: UserRole) -> Self {
        Self {
            user_id,
            login,
            role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`ConvertDemande`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A compact textual rendering of an entity before or after a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Snapshot of an entity that did not exist yet.
    #[must_use]
    pub fn absent() -> Self {
        Self::new(String::from("absent"))
    }
}

/// The kinds of entity an audit event can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Address,
    Affaire,
    Association,
    Client,
    Contract,
    Demande,
    Doe,
    Intervention,
    Message,
    Representative,
    Satisfaction,
    Site,
    Ticket,
    User,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Affaire => "affaire",
            Self::Association => "association",
            Self::Client => "client",
            Self::Contract => "contract",
            Self::Demande => "demande",
            Self::Doe => "doe",
            Self::Intervention => "intervention",
            Self::Message => "message",
            Self::Representative => "representative",
            Self::Satisfaction => "satisfaction",
            Self::Site => "site",
            Self::Ticket => "ticket",
            Self::User => "user",
        }
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "address" => Ok(Self::Address),
            "affaire" => Ok(Self::Affaire),
            "association" => Ok(Self::Association),
            "client" => Ok(Self::Client),
            "contract" => Ok(Self::Contract),
            "demande" => Ok(Self::Demande),
            "doe" => Ok(Self::Doe),
            "intervention" => Ok(Self::Intervention),
            "message" => Ok(Self::Message),
            "representative" => Ok(Self::Representative),
            "satisfaction" => Ok(Self::Satisfaction),
            "site" => Ok(Self::Site),
            "ticket" => Ok(Self::Ticket),
            "user" => Ok(Self::User),
            _ => Err(DomainError::invalid_field(
                "entity kind",
                format!("'{s}' is not an audited entity"),
            )),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity an audit event is about.
///
/// `id` is `None` for creations until the store assigns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Option<i64>,
}

impl EntityRef {
    #[must_use]
    pub const fn existing(kind: EntityKind, id: i64) -> Self {
        Self { kind, id: Some(id) }
    }

    #[must_use]
    pub const fn pending(kind: EntityKind) -> Self {
        Self { kind, id: None }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful mutation produces exactly one audit event, written in
/// the same transaction as the mutation. It captures:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - Which entity it concerns (entity)
/// - The entity before and after the transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The event ID assigned by the store. `None` before persistence.
    pub event_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub entity: EntityRef,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent` without a persisted ID.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `entity` - The entity the change concerns
    /// * `before` - The entity before the transition
    /// * `after` - The entity after the transition
    /// * `occurred_at` - When the change was made
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        entity: EntityRef,
        before: StateSnapshot,
        after: StateSnapshot,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            entity,
            before,
            after,
            occurred_at,
        }
    }

    /// Returns a copy with the store-assigned entity id filled in.
    #[must_use]
    pub const fn with_entity_id(mut self, entity_id: i64) -> Self {
        self.entity.id = Some(entity_id);
        self
    }

    /// Returns a copy carrying the persisted event id.
    #[must_use]
    pub const fn with_event_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! The upstream gateway authenticates the caller and forwards a login. That
//! login is resolved against the user table here; the role that governs
//! every authorization decision is the stored one, never a value carried by
//! the request.

use fieldops::OperationContext;
use fieldops_audit::{Actor, Cause};
use fieldops_domain::{User, UserRole};
use fieldops_persistence::Persistence;
use time::OffsetDateTime;

use crate::error::{ApiError, AuthError, translate_persistence_error};

/// An authenticated actor: a stored user resolved from the gateway login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The stored user record.
    pub user: User,
}

impl AuthenticatedActor {
    /// Wraps a stored user.
    #[must_use]
    pub const fn new(user: User) -> Self {
        Self { user }
    }

    /// The role held by this actor.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.user.role
    }

    /// The client the actor belongs to, for client-role users.
    #[must_use]
    pub const fn client_id(&self) -> Option<i64> {
        self.user.client_id
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.user.user_id, self.user.login.clone(), self.user.role)
    }
}

/// Everything a handler needs to know about the request it serves.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Who is calling.
    pub actor: AuthenticatedActor,
    /// Why (request id and description), recorded in audit events.
    pub cause: Cause,
    /// The instant the request is processed at.
    pub now: OffsetDateTime,
}

impl RequestContext {
    #[must_use]
    pub const fn new(actor: AuthenticatedActor, cause: Cause, now: OffsetDateTime) -> Self {
        Self { actor, cause, now }
    }

    /// Builds the lifecycle engine context for this request.
    #[must_use]
    pub fn operation(&self) -> OperationContext {
        OperationContext::new(self.actor.to_audit_actor(), self.cause.clone(), self.now)
    }
}

/// Resolves gateway logins to stored users.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Authenticates a caller by login.
    ///
    /// # Errors
    ///
    /// * `AuthenticationFailed` if the login is blank or unknown
    /// * `Internal` if the lookup fails
    pub fn authenticate(
        persistence: &mut Persistence,
        login: Option<&str>,
    ) -> Result<AuthenticatedActor, ApiError> {
        let login = login.map(str::trim).filter(|l| !l.is_empty()).ok_or_else(|| {
            AuthError::AuthenticationFailed {
                reason: String::from("missing actor login"),
            }
        })?;

        let user = persistence
            .find_user_by_login(login)
            .map_err(translate_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("unknown actor '{login}'"),
            })?;

        tracing::debug!(login = %user.login, role = %user.role, "Actor authenticated");
        Ok(AuthenticatedActor::new(user))
    }
}

/// Authorization service for enforcing role-based access control.
///
/// `admin` may do everything. `agent` works tickets and interventions,
/// messages and reads. `client` files and manages its own demandes, rates
/// its own finished tickets, messages and reads its own aggregates.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the Admin role.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for any other role.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role() {
            UserRole::Admin => Ok(()),
            UserRole::Agent | UserRole::Client => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Requires a staff role (admin or agent).
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for clients.
    pub fn require_staff(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role().is_staff() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("agent"),
            })
        }
    }

    /// Requires a client actor acting for `client_id`, or an admin.
    ///
    /// Agents never file or manage demandes.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for agents and for clients of another client.
    pub fn authorize_demande_owner(
        actor: &AuthenticatedActor,
        client_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        match actor.role() {
            UserRole::Admin => Ok(()),
            UserRole::Client if actor.client_id() == Some(client_id) => Ok(()),
            UserRole::Agent | UserRole::Client => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("owning client"),
            }),
        }
    }

    /// Checks read or message access to data owned by `client_id`.
    ///
    /// Staff see everything. Clients see only their own client's data;
    /// data with no owning client is staff-only.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if a client reaches outside its own data.
    pub fn authorize_client_scope(
        actor: &AuthenticatedActor,
        client_id: Option<i64>,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.role().is_staff() {
            return Ok(());
        }
        match (actor.client_id(), client_id) {
            (Some(own), Some(owner)) if own == owner => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("owning client"),
            }),
        }
    }

    /// Satisfaction may be submitted by the ticket's client or an admin.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for agents and for foreign clients.
    pub fn authorize_submit_satisfaction(
        actor: &AuthenticatedActor,
        owner_client_id: Option<i64>,
    ) -> Result<(), AuthError> {
        match actor.role() {
            UserRole::Admin => Ok(()),
            UserRole::Client => {
                Self::authorize_client_scope(actor, owner_client_id, "submit_satisfaction")
            }
            UserRole::Agent => Err(AuthError::Unauthorized {
                action: String::from("submit_satisfaction"),
                required_role: String::from("client"),
            }),
        }
    }
}

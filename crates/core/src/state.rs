// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::mutation::Mutation;
use fieldops_audit::{Action, Actor, AuditEvent, Cause, EntityRef, StateSnapshot};
use time::OffsetDateTime;

/// Switches for behavior that is off unless an operator enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecyclePolicy {
    /// Allow `Termine → En_cours`.
    pub allow_ticket_reopen: bool,
    /// Allow creating interventions on a finished ticket.
    pub allow_intervention_changes_after_close: bool,
}

/// Who is acting, why, and when.
///
/// Passed explicitly to every operation; there is no ambient actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub actor: Actor,
    pub cause: Cause,
    pub now: OffsetDateTime,
}

impl OperationContext {
    #[must_use]
    pub const fn new(actor: Actor, cause: Cause, now: OffsetDateTime) -> Self {
        Self { actor, cause, now }
    }

    /// Builds the audit event for a change made in this context.
    #[must_use]
    pub(crate) fn audit(
        &self,
        action: &str,
        details: Option<String>,
        entity: EntityRef,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> AuditEvent {
        AuditEvent::new(
            self.actor.clone(),
            self.cause.clone(),
            Action::new(String::from(action), details),
            entity,
            before,
            after,
            self.now,
        )
    }
}

/// The result of a successful lifecycle operation.
///
/// Nothing has been written yet: the store applies `mutation` and records
/// `audit_event` in one transaction, or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The change to apply.
    pub mutation: Mutation,
    /// The audit event recording this change.
    pub audit_event: AuditEvent,
}

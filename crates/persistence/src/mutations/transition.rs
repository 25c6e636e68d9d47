// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Atomic application of a transition: the mutation and its audit event
//! commit together or not at all.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldops::TransitionResult;
use fieldops_audit::AuditEvent;
use tracing::info;

use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::entities::apply_mutation;

/// Outcome of persisting a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The audit event ID.
    pub event_id: i64,
    /// Ids of the rows created by the mutation, in creation order.
    pub created_ids: Vec<i64>,
}

impl PersistTransitionResult {
    /// The id of the primary row created, if the mutation created one.
    #[must_use]
    pub fn created_id(&self) -> Option<i64> {
        self.created_ids.first().copied()
    }
}

/// Applies a transition's mutation and records its audit event.
///
/// Creations leave the audit entity id unset; it is filled in here with
/// the id of the first created row.
///
/// # Errors
///
/// Returns an error if any write fails. Nothing is committed in that case.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let persisted: PersistTransitionResult =
        conn.transaction::<_, PersistenceError, _>(|conn| {
            let created_ids: Vec<i64> = apply_mutation(conn, &result.mutation)?;

            let event: AuditEvent = match (result.audit_event.entity.id, created_ids.first()) {
                (None, Some(id)) => result.audit_event.clone().with_entity_id(*id),
                _ => result.audit_event.clone(),
            };
            let event_id: i64 = persist_audit_event(conn, &event)?;

            Ok(PersistTransitionResult {
                event_id,
                created_ids,
            })
        })?;

    info!(
        event_id = persisted.event_id,
        action = %result.audit_event.action.name,
        created = persisted.created_ids.len(),
        "Persisted transition"
    );
    Ok(persisted)
}

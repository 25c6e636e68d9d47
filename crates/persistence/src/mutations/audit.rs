// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldops_audit::AuditEvent;
use fieldops_domain::format_timestamp;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, CauseData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event.
///
/// The event must reference a concrete entity: creations fill in the id
/// assigned by the store before calling this.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the entity id is missing, or if serialization or
/// the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let entity_id: i64 = event.entity.id.ok_or_else(|| {
        PersistenceError::QueryFailed(format!(
            "audit event '{}' has no {} id",
            event.action.name, event.entity.kind
        ))
    })?;

    let cause_json: String = serde_json::to_string(&CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    })?;
    let action_json: String = serde_json::to_string(&ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    })?;

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::entity_kind.eq(event.entity.kind.as_str()),
            audit_events::entity_id.eq(entity_id),
            audit_events::actor_user_id.eq(event.actor.user_id),
            audit_events::actor_login.eq(&event.actor.login),
            audit_events::actor_role.eq(event.actor.role.as_str()),
            audit_events::cause_json.eq(cause_json),
            audit_events::action_json.eq(action_json),
            audit_events::before_snapshot.eq(&event.before.data),
            audit_events::after_snapshot.eq(&event.after.data),
            audit_events::created_at.eq(format_timestamp(event.occurred_at)),
        ))
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;
    debug!(
        event_id,
        action = %event.action.name,
        entity = %event.entity.kind,
        entity_id,
        "Persisted audit event"
    );
    Ok(event_id)
}

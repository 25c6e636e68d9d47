// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldops_audit::{
    Action, Actor, AuditEvent, Cause, EntityKind, EntityRef, StateSnapshot,
};
use fieldops_domain::parse_timestamp;

use crate::data_models::{ActionData, AuditEventRow, CauseData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

fn event_from_row(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
    let action_data: ActionData = serde_json::from_str(&row.action_json)?;
    let kind: EntityKind = row.entity_kind.parse()?;

    let event = AuditEvent::new(
        Actor::new(row.actor_user_id, row.actor_login, row.actor_role.parse()?),
        Cause::new(cause_data.id, cause_data.description),
        Action::new(action_data.name, action_data.details),
        EntityRef::existing(kind, row.entity_id),
        StateSnapshot::new(row.before_snapshot),
        StateSnapshot::new(row.after_snapshot),
        parse_timestamp(&row.created_at)?,
    );
    Ok(event.with_event_id(row.event_id))
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns `EventNotFound` if no such event exists, or an error if the
/// row cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: AuditEventRow = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?;
    event_from_row(row)
}

/// Retrieves every audit event of one entity, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be deserialized.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    entity_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::entity_kind.eq(kind.as_str()))
        .filter(audit_events::entity_id.eq(entity_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;
    rows.into_iter().map(event_from_row).collect()
}

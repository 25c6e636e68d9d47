// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops_audit::EntityKind;
use fieldops_persistence::Persistence;

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{ApiError, translate_persistence_error};
use crate::lookup::parse_field;
use crate::request_response::{AuditEventInfo, AuditTimelineResponse};

/// Returns every audit event recorded for one entity, oldest first.
///
/// An entity without events yields an empty timeline.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for an unknown entity kind
pub fn get_audit_timeline(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    entity_kind: &str,
    entity_id: i64,
) -> Result<AuditTimelineResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "get_audit_timeline")?;
    let kind: EntityKind = parse_field("entity_kind", entity_kind)?;
    let events = persistence
        .get_audit_timeline(kind, entity_id)
        .map_err(translate_persistence_error)?;
    Ok(AuditTimelineResponse {
        entity_kind: kind.to_string(),
        entity_id,
        events: events.iter().map(AuditEventInfo::from).collect(),
    })
}

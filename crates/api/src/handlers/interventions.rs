// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops::{InterventionDraft, LifecyclePolicy};
use fieldops_domain::{DomainError, InterventionStatus};
use fieldops_persistence::{Persistence, PersistenceError};
use tracing::info;

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::lookup::{
    created_id, optional_by_id, parse_field, parse_optional_timestamp, parse_request_timestamp,
    require, require_referenced,
};
use crate::request_response::{
    CloseInterventionRequest, CreateInterventionRequest, InterventionInfo, InterventionResponse,
};

/// Records an intervention on a ticket.
///
/// # Errors
///
/// * `Unauthorized` for clients
/// * `InvalidInput` for an unknown ticket or previous intervention, a blank
///   description, an end before the start or an unknown status
/// * `PreconditionFailed` if the ticket is finished and the server forbids
///   post-close changes
pub fn create_intervention(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateInterventionRequest,
    policy: LifecyclePolicy,
) -> Result<InterventionResponse, ApiError> {
    AuthorizationService::require_staff(&ctx.actor, "create_intervention")?;
    let ticket = require_referenced(
        persistence.find_ticket(request.ticket_id),
        "ticket_id",
        request.ticket_id,
    )?;
    let previous = optional_by_id(request.previous_intervention_id, |id| {
        persistence.find_intervention(id)
    })?;
    let status: InterventionStatus = match request.status.as_deref() {
        Some(status) => parse_field("status", status)?,
        None => InterventionStatus::EnCours,
    };
    let draft = InterventionDraft {
        ticket_id: ticket.ticket_id,
        description: request.description,
        started_at: parse_request_timestamp("started_at", &request.started_at)?,
        ended_at: parse_optional_timestamp("ended_at", request.ended_at.as_deref())?,
        status,
        previous_intervention_id: request.previous_intervention_id,
    };

    let result = fieldops::create_intervention(
        &ticket,
        draft,
        previous.as_ref(),
        policy,
        &ctx.operation(),
    )
    .map_err(translate_core_error)?;
    let persisted = persistence
        .persist_transition(&result)
        .map_err(translate_persistence_error)?;
    let intervention_id = created_id(&persisted)?;
    let intervention = require(
        persistence.find_intervention(intervention_id),
        "intervention",
        intervention_id,
    )?;

    info!(
        intervention_id,
        ticket_id = ticket.ticket_id,
        "Intervention recorded"
    );
    Ok(InterventionResponse {
        intervention: InterventionInfo::new(&intervention, ctx.now),
        event_id: persisted.event_id,
    })
}

/// Closes an open intervention.
///
/// # Errors
///
/// * `Unauthorized` for clients
/// * `ResourceNotFound` for an unknown intervention
/// * `Conflict` if the intervention is already closed, including by a
///   concurrent request
/// * `InvalidInput` for an end before the start
/// * `PreconditionFailed` if the ticket is finished and the server forbids
///   post-close changes
pub fn close_intervention(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    intervention_id: i64,
    request: &CloseInterventionRequest,
    policy: LifecyclePolicy,
) -> Result<InterventionResponse, ApiError> {
    AuthorizationService::require_staff(&ctx.actor, "close_intervention")?;
    let intervention = require(
        persistence.find_intervention(intervention_id),
        "intervention",
        intervention_id,
    )?;
    let ticket = require(
        persistence.find_ticket(intervention.ticket_id),
        "ticket",
        intervention.ticket_id,
    )?;
    let ended_at =
        parse_optional_timestamp("ended_at", request.ended_at.as_deref())?.unwrap_or(ctx.now);

    let result =
        fieldops::close_intervention(&intervention, &ticket, ended_at, policy, &ctx.operation())
            .map_err(translate_core_error)?;
    let persisted = match persistence.persist_transition(&result) {
        Ok(persisted) => persisted,
        Err(PersistenceError::ConditionalWriteFailed { .. }) => {
            return Err(translate_domain_error(
                DomainError::InterventionAlreadyClosed { intervention_id },
            ));
        }
        Err(err) => return Err(translate_persistence_error(err)),
    };

    let closed = require(
        persistence.find_intervention(intervention_id),
        "intervention",
        intervention_id,
    )?;
    info!(intervention_id, "Intervention closed");
    Ok(InterventionResponse {
        intervention: InterventionInfo::new(&closed, ctx.now),
        event_id: persisted.event_id,
    })
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops::{ConversionDraft, DemandeDraft, TransitionResult};
use fieldops_domain::{Demande, DemandePatch};
use fieldops_persistence::{Persistence, PersistenceError};
use tracing::{info, warn};

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::handlers::mutation_response;
use crate::lookup::{created_id, optional, optional_by_id, parse_optional_timestamp, persist, require};
use crate::request_response::{
    ConvertDemandeRequest, ConvertDemandeResponse, CreateDemandeRequest, EditDemandeRequest,
    MutationResponse,
};

/// Persists a change to a pending demande.
///
/// The write only applies while the demande has no ticket. When it matches
/// nothing, the demande is re-read so the caller sees why it is frozen.
fn persist_demande_update(
    persistence: &mut Persistence,
    demande_id: i64,
    result: &TransitionResult,
    verb: &str,
) -> Result<MutationResponse, ApiError> {
    match persistence.persist_transition(result) {
        Ok(persisted) => Ok(mutation_response(
            demande_id,
            &persisted,
            format!("Demande {demande_id} {verb}"),
        )),
        Err(err @ PersistenceError::ConditionalWriteFailed { .. }) => {
            warn!(demande_id, "Demande changed concurrently");
            let current = require(persistence.find_demande(demande_id), "demande", demande_id)?;
            current.ensure_mutable().map_err(translate_domain_error)?;
            Err(translate_persistence_error(err))
        }
        Err(err) => Err(translate_persistence_error(err)),
    }
}

/// Files a demande for a client's site.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin or a user of that client
/// * `InvalidInput` for a blank title or description, an unknown client or
///   site, or a site of another client
pub fn create_demande(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateDemandeRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::authorize_demande_owner(&ctx.actor, request.client_id, "create_demande")?;

    let client = optional(persistence.find_client(request.client_id))?;
    let site = optional(persistence.find_site(request.site_id))?;
    let draft = DemandeDraft {
        client_id: request.client_id,
        site_id: request.site_id,
        title: request.title,
        description: request.description,
    };

    let persisted = persist(
        persistence,
        fieldops::create_demande(draft, client.as_ref(), site.as_ref(), &ctx.operation()),
    )?;
    let demande_id = created_id(&persisted)?;
    info!(demande_id, client_id = request.client_id, "Demande filed");
    Ok(mutation_response(
        demande_id,
        &persisted,
        format!("Demande {demande_id} created"),
    ))
}

/// Edits a demande that has not been converted.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown demande
/// * `Unauthorized` unless the actor is an admin or the owning client
/// * `Locked` once the demande has a ticket, including when the
///   conversion lands between the read and the write
/// * `PreconditionFailed` for a rejected or cancelled demande
pub fn edit_demande(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    demande_id: i64,
    request: EditDemandeRequest,
) -> Result<MutationResponse, ApiError> {
    let demande = require(persistence.find_demande(demande_id), "demande", demande_id)?;
    AuthorizationService::authorize_demande_owner(&ctx.actor, demande.client_id, "edit_demande")?;

    let new_site = optional_by_id(request.site_id, |id| persistence.find_site(id))?;
    let patch = DemandePatch {
        title: request.title,
        description: request.description,
        site_id: request.site_id,
    };
    let result = fieldops::edit_demande(&demande, &patch, new_site.as_ref(), &ctx.operation())
        .map_err(translate_core_error)?;

    persist_demande_update(persistence, demande_id, &result, "updated")
}

fn already_converted(demande: &Demande, ticket_id: i64) -> ConvertDemandeResponse {
    ConvertDemandeResponse {
        demande_id: demande.demande_id,
        ticket_id,
        already_converted: true,
        event_id: None,
        message: format!(
            "Demande {} was already converted into ticket {ticket_id}",
            demande.demande_id
        ),
    }
}

/// Converts a pending demande into a ticket.
///
/// Conversion happens at most once. Repeating it, or losing a race to a
/// concurrent conversion, answers with the ticket that exists.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown demande
/// * `PreconditionFailed` for a rejected or cancelled demande
/// * `InvalidInput` for an unknown DOE or affaire, a DOE of another site,
///   or an unparseable start time
pub fn convert_demande(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    demande_id: i64,
    request: ConvertDemandeRequest,
) -> Result<ConvertDemandeResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "convert_demande")?;
    let demande = require(persistence.find_demande(demande_id), "demande", demande_id)?;
    if let Some(ticket_id) = demande.ticket_id {
        info!(demande_id, ticket_id, "Conversion repeated");
        return Ok(already_converted(&demande, ticket_id));
    }

    let doe = optional(persistence.find_doe(request.doe_id))?;
    let affaire = optional(persistence.find_affaire(request.affaire_id))?;
    let draft = ConversionDraft {
        title: request.title,
        description: request.description,
        affaire_id: request.affaire_id,
        doe_id: request.doe_id,
        started_at: parse_optional_timestamp("started_at", request.started_at.as_deref())?,
    };
    let result = fieldops::convert_demande(
        &demande,
        draft,
        doe.as_ref(),
        affaire.as_ref(),
        &ctx.operation(),
    )
    .map_err(translate_core_error)?;

    match persistence.persist_transition(&result) {
        Ok(persisted) => {
            let ticket_id = created_id(&persisted)?;
            info!(demande_id, ticket_id, "Demande converted");
            Ok(ConvertDemandeResponse {
                demande_id,
                ticket_id,
                already_converted: false,
                event_id: Some(persisted.event_id),
                message: format!("Demande {demande_id} converted into ticket {ticket_id}"),
            })
        }
        Err(
            err @ (PersistenceError::ConditionalWriteFailed { .. }
            | PersistenceError::UniqueViolation(_)),
        ) => {
            let current = require(persistence.find_demande(demande_id), "demande", demande_id)?;
            match current.ticket_id {
                Some(ticket_id) => {
                    warn!(demande_id, ticket_id, "Concurrent conversion won the race");
                    Ok(already_converted(&current, ticket_id))
                }
                None => Err(translate_persistence_error(err)),
            }
        }
        Err(err) => Err(translate_persistence_error(err)),
    }
}

/// Rejects a pending demande.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown demande
/// * `Locked` or `PreconditionFailed` if the demande is converted or closed
pub fn reject_demande(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    demande_id: i64,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "reject_demande")?;
    let demande = require(persistence.find_demande(demande_id), "demande", demande_id)?;
    let result =
        fieldops::reject_demande(&demande, &ctx.operation()).map_err(translate_core_error)?;
    persist_demande_update(persistence, demande_id, &result, "rejected")
}

/// Cancels a pending demande on behalf of its client.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown demande
/// * `Unauthorized` unless the actor is an admin or the owning client
/// * `Locked` or `PreconditionFailed` if the demande is converted or closed
pub fn cancel_demande(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    demande_id: i64,
) -> Result<MutationResponse, ApiError> {
    let demande = require(persistence.find_demande(demande_id), "demande", demande_id)?;
    AuthorizationService::authorize_demande_owner(&ctx.actor, demande.client_id, "cancel_demande")?;
    let result =
        fieldops::cancel_demande(&demande, &ctx.operation()).map_err(translate_core_error)?;
    persist_demande_update(persistence, demande_id, &result, "cancelled")
}

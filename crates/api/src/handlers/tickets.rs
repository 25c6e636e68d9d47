// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops::{LifecyclePolicy, TicketDraft, TransitionResult};
use fieldops_domain::{AssignmentKind, Rating, Satisfaction, Ticket, TicketState};
use fieldops_persistence::{Persistence, PersistenceError};
use tracing::{info, warn};

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{ApiError, translate_core_error, translate_domain_error, translate_persistence_error};
use crate::handlers::mutation_response;
use crate::lookup::{
    created_id, optional, optional_by_id, parse_field, parse_optional_timestamp, persist, require,
};
use crate::request_response::{
    AssignRequest, CreateTicketRequest, FinishTicketRequest, MutationResponse, SatisfactionInfo,
    SubmitSatisfactionRequest, SubmitSatisfactionResponse, TicketInfo, TicketResponse,
    TransitionTicketRequest,
};

/// Persists a state change and answers with the ticket as it now reads.
fn persist_ticket_change(
    persistence: &mut Persistence,
    ticket_id: i64,
    result: Result<TransitionResult, fieldops::CoreError>,
) -> Result<TicketResponse, ApiError> {
    let persisted = persist(persistence, result)?;
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let count = persistence
        .count_interventions(ticket_id)
        .map_err(translate_persistence_error)?;
    info!(ticket_id, state = %ticket.state, "Ticket state changed");
    Ok(TicketResponse {
        ticket: TicketInfo::new(&ticket, count),
        event_id: persisted.event_id,
    })
}

/// Opens a ticket without a demande.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for blank fields, unknown references or a DOE of
///   another site
pub fn create_ticket(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateTicketRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_ticket")?;

    let site = optional(persistence.find_site(request.site_id))?;
    let doe = optional(persistence.find_doe(request.doe_id))?;
    let affaire = optional(persistence.find_affaire(request.affaire_id))?;
    let draft = TicketDraft {
        title: request.title,
        description: request.description,
        site_id: request.site_id,
        affaire_id: request.affaire_id,
        doe_id: request.doe_id,
        started_at: parse_optional_timestamp("started_at", request.started_at.as_deref())?,
    };

    let persisted = persist(
        persistence,
        fieldops::create_ticket(
            draft,
            site.as_ref(),
            doe.as_ref(),
            affaire.as_ref(),
            &ctx.operation(),
        ),
    )?;
    let ticket_id = created_id(&persisted)?;
    info!(ticket_id, site_id = request.site_id, "Ticket opened");
    Ok(mutation_response(
        ticket_id,
        &persisted,
        format!("Ticket {ticket_id} created"),
    ))
}

/// Moves a ticket to another state.
///
/// # Errors
///
/// * `Unauthorized` for clients
/// * `ResourceNotFound` for an unknown ticket
/// * `InvalidInput` for an unknown state name
/// * `PreconditionFailed` for a transition the state machine forbids
pub fn transition_ticket(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    ticket_id: i64,
    request: &TransitionTicketRequest,
    policy: LifecyclePolicy,
) -> Result<TicketResponse, ApiError> {
    AuthorizationService::require_staff(&ctx.actor, "transition_ticket")?;
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let target: TicketState = parse_field("state", &request.state)?;
    let count = persistence
        .count_interventions(ticket_id)
        .map_err(translate_persistence_error)?;
    let demande = optional_by_id(ticket.demande_id, |id| persistence.find_demande(id))?;

    let result = fieldops::transition_ticket(
        &ticket,
        count,
        target,
        demande.as_ref(),
        policy,
        &ctx.operation(),
    );
    persist_ticket_change(persistence, ticket_id, result)
}

/// Finishes a ticket; its demande becomes processed.
///
/// # Errors
///
/// * `Unauthorized` for clients
/// * `ResourceNotFound` for an unknown ticket
/// * `PreconditionFailed` if the ticket is already finished
/// * `InvalidInput` for an end before the ticket start
pub fn finish_ticket(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    ticket_id: i64,
    request: &FinishTicketRequest,
) -> Result<TicketResponse, ApiError> {
    AuthorizationService::require_staff(&ctx.actor, "finish_ticket")?;
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let ended_at = parse_optional_timestamp("ended_at", request.ended_at.as_deref())?;
    let demande = optional_by_id(ticket.demande_id, |id| persistence.find_demande(id))?;

    let result =
        fieldops::mark_ticket_finished(&ticket, ended_at, demande.as_ref(), &ctx.operation());
    persist_ticket_change(persistence, ticket_id, result)
}

/// Reopens a finished ticket when the server allows it.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown ticket
/// * `PreconditionFailed` if reopening is disabled or the ticket is open
pub fn reopen_ticket(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    ticket_id: i64,
    policy: LifecyclePolicy,
) -> Result<TicketResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "reopen_ticket")?;
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let demande = optional_by_id(ticket.demande_id, |id| persistence.find_demande(id))?;

    let result = fieldops::reopen_ticket(&ticket, demande.as_ref(), policy, &ctx.operation());
    persist_ticket_change(persistence, ticket_id, result)
}

/// Assigns a staff member to a ticket by matricule.
///
/// Repeating an assignment is an upsert: the same role label changes
/// nothing and records no event, a new label replaces the stored one.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown ticket or matricule
/// * `InvalidInput` if the matricule belongs to a client user
pub fn assign_to_ticket(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    ticket_id: i64,
    request: AssignRequest,
    kind: AssignmentKind,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "assign_to_ticket")?;
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let matricule = request.matricule.trim();
    let agent = optional(persistence.find_user_by_matricule(matricule))?;

    if let Some(agent) = &agent {
        let current = persistence
            .list_ticket_assignments(ticket_id)
            .map_err(translate_persistence_error)?;
        if current
            .iter()
            .any(|a| a.matches(agent.user_id, kind, request.role_label.as_deref()))
        {
            info!(ticket_id, matricule, kind = kind.as_str(), "Assignment unchanged");
            return Ok(MutationResponse {
                id: ticket_id,
                event_id: None,
                message: format!(
                    "{matricule} already assigned to ticket {ticket_id} as {}",
                    kind.as_str()
                ),
            });
        }
    }

    let persisted = persist(
        persistence,
        fieldops::assign_to_ticket(
            &ticket,
            agent.as_ref(),
            matricule,
            kind,
            request.role_label,
            &ctx.operation(),
        ),
    )?;
    info!(ticket_id, matricule, kind = kind.as_str(), "Staff assigned to ticket");
    Ok(mutation_response(
        ticket_id,
        &persisted,
        format!("{matricule} assigned to ticket {ticket_id} as {}", kind.as_str()),
    ))
}

fn idempotent_satisfaction(
    existing: &Satisfaction,
    rating: i64,
    comment: Option<&str>,
) -> Result<SubmitSatisfactionResponse, ApiError> {
    let rating = Rating::new(rating).map_err(translate_domain_error)?;
    if existing.matches(rating, comment) {
        Ok(SubmitSatisfactionResponse {
            satisfaction: SatisfactionInfo::from(existing),
            already_submitted: true,
        })
    } else {
        Err(translate_domain_error(
            fieldops_domain::DomainError::SatisfactionAlreadySubmitted {
                ticket_id: existing.ticket_id,
            },
        ))
    }
}

fn owner_client(persistence: &mut Persistence, ticket: &Ticket) -> Result<Option<i64>, ApiError> {
    Ok(optional(persistence.find_site(ticket.site_id))?.and_then(|s| s.client_id))
}

/// Records the client's rating of a finished ticket.
///
/// Submitting the same rating and comment again answers with the stored
/// record; a different second submission is a conflict.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown ticket
/// * `Unauthorized` unless the actor is an admin or the ticket's client
/// * `PreconditionFailed` unless the ticket is finished
/// * `InvalidInput` for a rating outside 1..=5
/// * `Conflict` for a different second submission
pub fn submit_satisfaction(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    ticket_id: i64,
    request: SubmitSatisfactionRequest,
) -> Result<SubmitSatisfactionResponse, ApiError> {
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let owner = owner_client(persistence, &ticket)?;
    AuthorizationService::authorize_submit_satisfaction(&ctx.actor, owner)?;

    let existing = optional(persistence.find_satisfaction_for_ticket(ticket_id))?;
    if let Some(existing) = &existing
        && ticket.state == TicketState::Termine
    {
        return idempotent_satisfaction(existing, request.rating, request.comment.as_deref());
    }

    let result = fieldops::submit_satisfaction(
        &ticket,
        existing.as_ref(),
        request.rating,
        request.comment.clone(),
        &ctx.operation(),
    )
    .map_err(translate_core_error)?;

    match persistence.persist_transition(&result) {
        Ok(_) => {
            let stored = require(
                persistence.find_satisfaction_for_ticket(ticket_id),
                "satisfaction",
                ticket_id,
            )?;
            info!(ticket_id, rating = stored.rating.value(), "Satisfaction recorded");
            Ok(SubmitSatisfactionResponse {
                satisfaction: SatisfactionInfo::from(&stored),
                already_submitted: false,
            })
        }
        Err(err @ PersistenceError::UniqueViolation(_)) => {
            warn!(ticket_id, "Concurrent satisfaction submission");
            match optional(persistence.find_satisfaction_for_ticket(ticket_id))? {
                Some(stored) => {
                    idempotent_satisfaction(&stored, request.rating, request.comment.as_deref())
                }
                None => Err(translate_persistence_error(err)),
            }
        }
        Err(err) => Err(translate_persistence_error(err)),
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Demande, ticket, intervention and satisfaction transitions.
//!
//! Every function here is pure: it receives the entities the caller loaded,
//! validates the request against them and returns the mutation to write.
//! Entities referenced from a request body that failed to load are passed
//! as `None` and reported as validation errors; the entity addressed by the
//! operation itself must already have been found by the caller.

use crate::command::{ConversionDraft, DemandeDraft, InterventionDraft, TicketDraft};
use crate::error::CoreError;
use crate::mutation::{
    Mutation, NewDemande, NewIntervention, NewSatisfaction, NewTicket,
};
use crate::snapshot;
use crate::state::{LifecyclePolicy, OperationContext, TransitionResult};
use fieldops_audit::{EntityKind, EntityRef, StateSnapshot};
use fieldops_domain::{
    Affaire, AssignmentKind, Client, Demande, DemandePatch, DemandeStatus, Doe, DomainError,
    Intervention, InterventionStatus, Rating, Satisfaction, Site, Ticket, TicketState, User,
    validate_required, validate_window,
};
use time::OffsetDateTime;

/// Resolves a referenced entity or reports the reference as invalid.
fn referenced<'a, T>(
    entity: Option<&'a T>,
    field: &'static str,
    id: i64,
) -> Result<&'a T, DomainError> {
    entity.ok_or_else(|| DomainError::invalid_field(field, format!("{id} does not exist")))
}

/// Ensures a site belongs to the given client.
fn ensure_site_of_client(site: &Site, client_id: i64) -> Result<(), DomainError> {
    if site.client_id == Some(client_id) {
        Ok(())
    } else {
        Err(DomainError::SiteClientMismatch {
            site_id: site.site_id,
            client_id,
        })
    }
}

/// Checks the DOE and affaire a ticket must reference.
fn ensure_ticket_references(
    site_id: i64,
    doe_id: i64,
    doe: Option<&Doe>,
    affaire_id: i64,
    affaire: Option<&Affaire>,
) -> Result<(), DomainError> {
    let doe = referenced(doe, "doe_id", doe_id)?;
    referenced(affaire, "affaire_id", affaire_id)?;
    if doe.site_id != site_id {
        return Err(DomainError::invalid_field(
            "doe_id",
            format!("DOE {doe_id} documents site {}, not site {site_id}", doe.site_id),
        ));
    }
    Ok(())
}

/// Creates a demande in `Pending`.
///
/// # Arguments
///
/// * `draft` - The submitted fields
/// * `client` - The client named by `draft.client_id`, if it exists
/// * `site` - The site named by `draft.site_id`, if it exists
/// * `ctx` - Actor, cause and time of the request
///
/// # Errors
///
/// Returns a validation error if the client or site is unknown, the site
/// belongs to another client, or the title is blank.
pub fn create_demande(
    draft: DemandeDraft,
    client: Option<&Client>,
    site: Option<&Site>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    let client = referenced(client, "client_id", draft.client_id)?;
    let site = referenced(site, "site_id", draft.site_id)?;
    ensure_site_of_client(site, client.client_id)?;
    validate_required("title", &draft.title)?;

    let new_demande = NewDemande {
        client_id: client.client_id,
        site_id: site.site_id,
        title: draft.title.trim().to_string(),
        description: draft.description,
        created_at: ctx.now,
    };

    let audit_event = ctx.audit(
        "CreateDemande",
        Some(format!(
            "Client {} filed '{}' for site {}",
            client.client_id, new_demande.title, site.site_id
        )),
        EntityRef::pending(EntityKind::Demande),
        StateSnapshot::absent(),
        snapshot::created(&format!("demande status={}", DemandeStatus::Pending.as_str())),
    );

    Ok(TransitionResult {
        mutation: Mutation::CreateDemande(new_demande),
        audit_event,
    })
}

/// Patches a demande that has not been converted yet.
///
/// The lock is enforced for every actor, admins included.
///
/// # Errors
///
/// * `DemandeLocked` if a ticket exists for the demande
/// * `DemandeClosed` if it was rejected or cancelled
/// * a validation error for a blank title, an empty patch, or a site that
///   is unknown or belongs to another client
pub fn edit_demande(
    demande: &Demande,
    patch: &DemandePatch,
    new_site: Option<&Site>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    demande.ensure_mutable()?;
    if patch.is_empty() {
        return Err(DomainError::invalid_field("patch", "no field to change").into());
    }
    if let Some(title) = &patch.title {
        validate_required("title", title)?;
    }
    if let Some(site_id) = patch.site_id
        && site_id != demande.site_id
    {
        let site = referenced(new_site, "site_id", site_id)?;
        ensure_site_of_client(site, demande.client_id)?;
    }

    let updated = patch.apply_to(demande);
    let audit_event = ctx.audit(
        "EditDemande",
        None,
        EntityRef::existing(EntityKind::Demande, demande.demande_id),
        snapshot::demande(demande),
        snapshot::demande(&updated),
    );

    Ok(TransitionResult {
        mutation: Mutation::UpdateDemande {
            demande_id: updated.demande_id,
            title: updated.title.trim().to_string(),
            description: updated.description,
            site_id: updated.site_id,
            status: updated.status,
        },
        audit_event,
    })
}

fn close_demande(
    demande: &Demande,
    status: DemandeStatus,
    action: &str,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    demande.ensure_mutable()?;

    let mut updated = demande.clone();
    updated.status = status;
    let audit_event = ctx.audit(
        action,
        None,
        EntityRef::existing(EntityKind::Demande, demande.demande_id),
        snapshot::demande(demande),
        snapshot::demande(&updated),
    );

    Ok(TransitionResult {
        mutation: Mutation::UpdateDemande {
            demande_id: updated.demande_id,
            title: updated.title,
            description: updated.description,
            site_id: updated.site_id,
            status,
        },
        audit_event,
    })
}

/// Moves a pending demande to `Rejected`.
///
/// # Errors
///
/// `DemandeLocked` once converted, `DemandeClosed` if already closed.
pub fn reject_demande(
    demande: &Demande,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    close_demande(demande, DemandeStatus::Rejected, "RejectDemande", ctx)
}

/// Moves a pending demande to `Cancelled`.
///
/// # Errors
///
/// `DemandeLocked` once converted, `DemandeClosed` if already closed.
pub fn cancel_demande(
    demande: &Demande,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    close_demande(demande, DemandeStatus::Cancelled, "CancelDemande", ctx)
}

/// Converts a demande into a ticket in `Pas_commence`.
///
/// The store writes the link conditionally so that two concurrent
/// conversions produce one ticket.
///
/// # Errors
///
/// * `DemandeAlreadyConverted` carrying the existing ticket id
/// * `DemandeClosed` for a rejected or cancelled demande
/// * a validation error if the DOE or affaire is unknown
pub fn convert_demande(
    demande: &Demande,
    draft: ConversionDraft,
    doe: Option<&Doe>,
    affaire: Option<&Affaire>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    demande.ensure_convertible()?;
    ensure_ticket_references(demande.site_id, draft.doe_id, doe, draft.affaire_id, affaire)?;

    let title = draft
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| demande.title.clone());
    let description = draft
        .description
        .unwrap_or_else(|| demande.description.clone());

    let ticket = NewTicket {
        title,
        description,
        site_id: demande.site_id,
        demande_id: Some(demande.demande_id),
        affaire_id: draft.affaire_id,
        doe_id: draft.doe_id,
        state: TicketState::PasCommence,
        responsable_id: None,
        started_at: draft.started_at.unwrap_or(ctx.now),
    };

    let mut after = demande.clone();
    after.status = DemandeStatus::InProgress;
    let audit_event = ctx.audit(
        "ConvertDemande",
        Some(format!("Demande {} converted into a ticket", demande.demande_id)),
        EntityRef::existing(EntityKind::Demande, demande.demande_id),
        snapshot::demande(demande),
        snapshot::demande(&after),
    );

    Ok(TransitionResult {
        mutation: Mutation::ConvertDemande {
            demande_id: demande.demande_id,
            ticket,
        },
        audit_event,
    })
}

/// Creates a ticket that does not originate from a demande.
///
/// # Errors
///
/// Returns a validation error for a blank title or an unknown site, DOE or
/// affaire.
pub fn create_ticket(
    draft: TicketDraft,
    site: Option<&Site>,
    doe: Option<&Doe>,
    affaire: Option<&Affaire>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("title", &draft.title)?;
    let site = referenced(site, "site_id", draft.site_id)?;
    ensure_ticket_references(site.site_id, draft.doe_id, doe, draft.affaire_id, affaire)?;

    let ticket = NewTicket {
        title: draft.title.trim().to_string(),
        description: draft.description,
        site_id: site.site_id,
        demande_id: None,
        affaire_id: draft.affaire_id,
        doe_id: draft.doe_id,
        state: TicketState::PasCommence,
        responsable_id: None,
        started_at: draft.started_at.unwrap_or(ctx.now),
    };

    let audit_event = ctx.audit(
        "CreateTicket",
        Some(format!("Ticket '{}' opened on site {}", ticket.title, site.site_id)),
        EntityRef::pending(EntityKind::Ticket),
        StateSnapshot::absent(),
        snapshot::created(&format!("ticket state={}", ticket.state)),
    );

    Ok(TransitionResult {
        mutation: Mutation::CreateTicket(ticket),
        audit_event,
    })
}

/// Attaches a staff user to a ticket as responsable or agent.
///
/// Re-assigning the same user with the same kind replaces the role label.
/// The first responsable also becomes the ticket's primary responsable.
///
/// # Errors
///
/// * `EntityNotFound` if no user carries `matricule`
/// * `InvalidAssignee` if the user is not staff
pub fn assign_to_ticket(
    ticket: &Ticket,
    agent: Option<&User>,
    matricule: &str,
    kind: AssignmentKind,
    role_label: Option<String>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    let agent = agent.ok_or_else(|| DomainError::not_found("agent", matricule))?;
    if !agent.role.is_staff() {
        return Err(DomainError::InvalidAssignee {
            user: matricule.to_string(),
            reason: format!("role '{}' cannot work tickets", agent.role),
        }
        .into());
    }

    let role_label = role_label.filter(|r| !r.trim().is_empty());
    let set_primary_responsable =
        kind == AssignmentKind::Responsable && ticket.responsable_id.is_none();
    let mut after = ticket.clone();
    if set_primary_responsable {
        after.responsable_id = Some(agent.user_id);
    }

    let audit_event = ctx.audit(
        "AssignToTicket",
        Some(format!(
            "{} {} assigned to ticket {}{}",
            kind.as_str(),
            matricule,
            ticket.ticket_id,
            role_label
                .as_deref()
                .map(|label| format!(" ({label})"))
                .unwrap_or_default()
        )),
        EntityRef::existing(EntityKind::Ticket, ticket.ticket_id),
        snapshot::ticket(ticket),
        snapshot::ticket(&after),
    );

    Ok(TransitionResult {
        mutation: Mutation::AssignToTicket {
            ticket_id: ticket.ticket_id,
            user_id: agent.user_id,
            kind,
            role_label,
            set_primary_responsable,
        },
        audit_event,
    })
}

/// Records an intervention against a ticket.
///
/// The ticket's stored state is not touched: a not-started ticket is shown
/// as in progress by the display derivation. An intervention recorded with
/// an end time is stored as `Termine`, as if it had been closed.
///
/// # Errors
///
/// * `TicketClosed` if the ticket is finished and the policy forbids changes
/// * `InvalidTimeWindow` if the end precedes the start
/// * `InterventionChainMismatch` if the previous intervention belongs to
///   another ticket
/// * a validation error for a blank description or unknown previous intervention
pub fn create_intervention(
    ticket: &Ticket,
    draft: InterventionDraft,
    previous: Option<&Intervention>,
    policy: LifecyclePolicy,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if ticket.state.is_terminal() && !policy.allow_intervention_changes_after_close {
        return Err(DomainError::TicketClosed {
            ticket_id: ticket.ticket_id,
        }
        .into());
    }
    validate_required("description", &draft.description)?;
    validate_window("intervention", draft.started_at, draft.ended_at)?;

    if let Some(previous_id) = draft.previous_intervention_id {
        let previous = referenced(previous, "previous_intervention_id", previous_id)?;
        if previous.ticket_id != ticket.ticket_id {
            return Err(DomainError::InterventionChainMismatch {
                previous_id,
                ticket_id: ticket.ticket_id,
            }
            .into());
        }
    }

    let intervention = NewIntervention {
        ticket_id: ticket.ticket_id,
        description: draft.description,
        started_at: draft.started_at,
        ended_at: draft.ended_at,
        status: if draft.ended_at.is_some() {
            InterventionStatus::Termine
        } else {
            draft.status
        },
        previous_intervention_id: draft.previous_intervention_id,
    };

    let audit_event = ctx.audit(
        "CreateIntervention",
        Some(format!("Intervention added to ticket {}", ticket.ticket_id)),
        EntityRef::pending(EntityKind::Intervention),
        StateSnapshot::absent(),
        snapshot::created(&format!("intervention status={}", intervention.status)),
    );

    Ok(TransitionResult {
        mutation: Mutation::CreateIntervention(intervention),
        audit_event,
    })
}

/// Sets the end of an intervention and marks it `Termine`.
///
/// The parent ticket stays as it is; finishing it is a separate action.
///
/// # Errors
///
/// * `InterventionAlreadyClosed` if an end time exists
/// * `InvalidTimeWindow` if `ended_at` precedes the start
/// * `TicketClosed` if the ticket is finished and the policy forbids changes
pub fn close_intervention(
    intervention: &Intervention,
    ticket: &Ticket,
    ended_at: OffsetDateTime,
    policy: LifecyclePolicy,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if intervention.is_closed() {
        return Err(DomainError::InterventionAlreadyClosed {
            intervention_id: intervention.intervention_id,
        }
        .into());
    }
    if ticket.state.is_terminal() && !policy.allow_intervention_changes_after_close {
        return Err(DomainError::TicketClosed {
            ticket_id: ticket.ticket_id,
        }
        .into());
    }
    validate_window("intervention", intervention.started_at, Some(ended_at))?;

    let mut after = intervention.clone();
    after.ended_at = Some(ended_at);
    after.status = InterventionStatus::Termine;
    let audit_event = ctx.audit(
        "CloseIntervention",
        None,
        EntityRef::existing(EntityKind::Intervention, intervention.intervention_id),
        snapshot::intervention(intervention),
        snapshot::intervention(&after),
    );

    Ok(TransitionResult {
        mutation: Mutation::CloseIntervention {
            intervention_id: intervention.intervention_id,
            ended_at,
        },
        audit_event,
    })
}

fn ticket_state_change(
    ticket: &Ticket,
    state: TicketState,
    ended_at: Option<OffsetDateTime>,
    demande: Option<&Demande>,
    demande_status: DemandeStatus,
    action: &str,
    ctx: &OperationContext,
) -> TransitionResult {
    let mut after = ticket.clone();
    after.state = state;
    after.ended_at = ended_at;

    // A rejected or cancelled origin never moves again.
    let demande_update = demande
        .filter(|d| !d.status.is_closed() && d.status != demande_status)
        .map(|d| (d.demande_id, demande_status));

    let audit_event = ctx.audit(
        action,
        Some(format!(
            "Ticket {} moved from '{}' to '{}'",
            ticket.ticket_id, ticket.state, state
        )),
        EntityRef::existing(EntityKind::Ticket, ticket.ticket_id),
        snapshot::ticket(ticket),
        snapshot::ticket(&after),
    );

    TransitionResult {
        mutation: Mutation::UpdateTicketState {
            ticket_id: ticket.ticket_id,
            state,
            ended_at,
            demande: demande_update,
        },
        audit_event,
    }
}

/// Finishes a ticket: state `Termine`, end time set, origin demande `Processed`.
///
/// Allowed from every state except `Termine`.
///
/// # Arguments
///
/// * `ticket` - The ticket to finish
/// * `ended_at` - Explicit end time; defaults to now
/// * `demande` - The demande the ticket came from, if any
/// * `ctx` - Actor, cause and time of the request
///
/// # Errors
///
/// * `InvalidTicketTransition` if the ticket is already finished
/// * `InvalidTimeWindow` if `ended_at` precedes the ticket start
pub fn mark_ticket_finished(
    ticket: &Ticket,
    ended_at: Option<OffsetDateTime>,
    demande: Option<&Demande>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if ticket.state.is_terminal() {
        return Err(DomainError::InvalidTicketTransition {
            ticket_id: ticket.ticket_id,
            from: ticket.state,
            to: TicketState::Termine,
        }
        .into());
    }
    let ended_at = ended_at.or(ticket.ended_at).unwrap_or(ctx.now);
    validate_window("ticket", ticket.started_at, Some(ended_at))?;

    Ok(ticket_state_change(
        ticket,
        TicketState::Termine,
        Some(ended_at),
        demande,
        DemandeStatus::Processed,
        "FinishTicket",
        ctx,
    ))
}

/// Moves a finished ticket back to `En_cours` when the policy allows it.
///
/// The end time is cleared and the origin demande returns to `InProgress`.
/// An existing satisfaction record stays attached.
///
/// # Errors
///
/// * `ReopenNotAllowed` when the policy forbids reopening
/// * `InvalidTicketTransition` if the ticket is not finished
pub fn reopen_ticket(
    ticket: &Ticket,
    demande: Option<&Demande>,
    policy: LifecyclePolicy,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if !ticket.state.is_terminal() {
        return Err(DomainError::InvalidTicketTransition {
            ticket_id: ticket.ticket_id,
            from: ticket.state,
            to: TicketState::EnCours,
        }
        .into());
    }
    if !policy.allow_ticket_reopen {
        return Err(DomainError::ReopenNotAllowed {
            ticket_id: ticket.ticket_id,
        }
        .into());
    }

    Ok(ticket_state_change(
        ticket,
        TicketState::EnCours,
        None,
        demande,
        DemandeStatus::InProgress,
        "ReopenTicket",
        ctx,
    ))
}

/// Moves a ticket along the state machine, checked on its effective state.
///
/// `Termine` goes through [`mark_ticket_finished`] and `Termine → En_cours`
/// through [`reopen_ticket`], so both keep their side effects.
///
/// # Errors
///
/// `InvalidTicketTransition` for a move the state machine forbids, plus the
/// errors of the delegated operations.
pub fn transition_ticket(
    ticket: &Ticket,
    intervention_count: usize,
    target: TicketState,
    demande: Option<&Demande>,
    policy: LifecyclePolicy,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if ticket.state.is_terminal() && target == TicketState::EnCours {
        return reopen_ticket(ticket, demande, policy, ctx);
    }
    ticket.validate_transition(intervention_count, target)?;
    if target == TicketState::Termine {
        return mark_ticket_finished(ticket, None, demande, ctx);
    }

    Ok(ticket_state_change(
        ticket,
        target,
        ticket.ended_at,
        demande,
        DemandeStatus::InProgress,
        "TransitionTicket",
        ctx,
    ))
}

/// Records the client's rating of a finished ticket.
///
/// # Errors
///
/// * `TicketNotFinished` unless the stored state is `Termine`
/// * `InvalidRating` for a rating outside 1..=5
/// * `SatisfactionAlreadySubmitted` if a record exists
pub fn submit_satisfaction(
    ticket: &Ticket,
    existing: Option<&Satisfaction>,
    rating: i64,
    comment: Option<String>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if ticket.state != TicketState::Termine {
        return Err(DomainError::TicketNotFinished {
            ticket_id: ticket.ticket_id,
            state: ticket.state,
        }
        .into());
    }
    let rating = Rating::new(rating)?;
    if existing.is_some() {
        return Err(DomainError::SatisfactionAlreadySubmitted {
            ticket_id: ticket.ticket_id,
        }
        .into());
    }

    let satisfaction = NewSatisfaction {
        ticket_id: ticket.ticket_id,
        rating,
        comment: comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        created_at: ctx.now,
    };

    let audit_event = ctx.audit(
        "SubmitSatisfaction",
        Some(format!(
            "Ticket {} rated {}/5",
            ticket.ticket_id,
            rating.value()
        )),
        EntityRef::pending(EntityKind::Satisfaction),
        StateSnapshot::absent(),
        snapshot::created(&format!("satisfaction rating={}", rating.value())),
    );

    Ok(TransitionResult {
        mutation: Mutation::CreateSatisfaction(satisfaction),
        audit_event,
    })
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only aggregates around sites, tickets and clients.
//!
//! Each aggregate is assembled from the store for one request and never
//! cached. Tickets carry both their stored and displayed state; sites carry
//! the derived `has_open_ticket` flag; interventions carry elapsed time
//! measured against the request instant.

use std::collections::{HashMap, HashSet};

use fieldops_domain::{Assignment, AssignmentKind, Site, Ticket, User};
use fieldops_persistence::Persistence;

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{ApiError, translate_persistence_error};
use crate::lookup::{optional_by_id, require};
use crate::request_response::{
    AddressInfo, AffaireInfo, AssignmentInfo, ClientInfo, ClientRelations, ContractInfo,
    DemandeInfo, DemandeListResponse, DoeInfo, InterventionInfo, RepresentativeInfo,
    SatisfactionInfo, SiteInfo, SiteRelations, TicketInfo, TicketListResponse, TicketRelations,
    UserInfo,
};

/// Builds ticket views with their intervention counts.
fn ticket_infos(
    persistence: &mut Persistence,
    tickets: &[Ticket],
) -> Result<Vec<TicketInfo>, ApiError> {
    let ids: Vec<i64> = tickets.iter().map(|t| t.ticket_id).collect();
    let counts: HashMap<i64, usize> = persistence
        .count_interventions_by_ticket(&ids)
        .map_err(translate_persistence_error)?;
    Ok(tickets
        .iter()
        .map(|t| TicketInfo::new(t, counts.get(&t.ticket_id).copied().unwrap_or(0)))
        .collect())
}

/// Ids of the given sites that have at least one unfinished ticket.
fn sites_with_open_tickets(
    persistence: &mut Persistence,
    site_ids: &[i64],
) -> Result<HashSet<i64>, ApiError> {
    if site_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let open = persistence
        .list_unfinished_tickets(Some(site_ids))
        .map_err(translate_persistence_error)?;
    Ok(open.iter().map(|t| t.site_id).collect())
}

fn site_info(persistence: &mut Persistence, site: &Site) -> Result<SiteInfo, ApiError> {
    let open = sites_with_open_tickets(persistence, &[site.site_id])?;
    Ok(SiteInfo::new(site, open.contains(&site.site_id)))
}

/// Joins assignments with their users, keeping assignment order.
fn assignment_infos(
    assignments: &[Assignment],
    users: &HashMap<i64, User>,
    kind: AssignmentKind,
) -> Vec<AssignmentInfo> {
    assignments
        .iter()
        .filter(|a| a.kind == kind)
        .filter_map(|a| {
            users.get(&a.user_id).map(|user| AssignmentInfo {
                user: UserInfo::from(user),
                kind: String::from(a.kind.as_str()),
                role_label: a.role_label.clone(),
            })
        })
        .collect()
}

/// Returns a site with its address, tickets, representatives, client and
/// contracts.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown site
/// * `Unauthorized` if a client asks for another client's site
pub fn get_site_relations(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    site_id: i64,
) -> Result<SiteRelations, ApiError> {
    let site = require(persistence.find_site(site_id), "site", site_id)?;
    AuthorizationService::authorize_client_scope(&ctx.actor, site.client_id, "get_site_relations")?;

    let address = optional_by_id(site.address_id, |id| persistence.find_address(id))?;
    let tickets = persistence
        .list_tickets_for_site(site_id)
        .map_err(translate_persistence_error)?;
    let has_open_ticket = tickets.iter().any(Ticket::is_open);
    let tickets = ticket_infos(persistence, &tickets)?;

    let client = optional_by_id(site.client_id, |id| persistence.find_client(id))?;
    let representatives = match &client {
        Some(client) => persistence
            .list_representatives_for_client(client.client_id)
            .map_err(translate_persistence_error)?,
        None => Vec::new(),
    };
    let contracts = persistence
        .list_contracts_for_site(site_id)
        .map_err(translate_persistence_error)?;

    Ok(SiteRelations {
        site: SiteInfo::new(&site, has_open_ticket),
        address: address.as_ref().map(AddressInfo::from),
        tickets,
        representatives: representatives.iter().map(RepresentativeInfo::from).collect(),
        client: client.as_ref().map(ClientInfo::from),
        contracts: contracts
            .iter()
            .map(|c| ContractInfo::new(c, ctx.now))
            .collect(),
    })
}

/// Returns a ticket with its site, demandes, interventions, staff, DOE,
/// affaire and satisfaction.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown ticket
/// * `Unauthorized` if a client asks for a ticket on another client's site
pub fn get_ticket_relations(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    ticket_id: i64,
) -> Result<TicketRelations, ApiError> {
    let ticket = require(persistence.find_ticket(ticket_id), "ticket", ticket_id)?;
    let site = require(persistence.find_site(ticket.site_id), "site", ticket.site_id)?;
    AuthorizationService::authorize_client_scope(
        &ctx.actor,
        site.client_id,
        "get_ticket_relations",
    )?;

    let demandes = persistence
        .list_demandes_for_ticket(ticket_id)
        .map_err(translate_persistence_error)?;
    let interventions = persistence
        .list_interventions_for_ticket(ticket_id)
        .map_err(translate_persistence_error)?;

    let assignments = persistence
        .list_ticket_assignments(ticket_id)
        .map_err(translate_persistence_error)?;
    let user_ids: Vec<i64> = assignments.iter().map(|a| a.user_id).collect();
    let users: HashMap<i64, User> = persistence
        .list_users_by_ids(&user_ids)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|u| (u.user_id, u))
        .collect();

    let doe = optional_by_id(ticket.doe_id, |id| persistence.find_doe(id))?;
    let affaire = optional_by_id(ticket.affaire_id, |id| persistence.find_affaire(id))?;
    let satisfaction = persistence
        .find_satisfaction_for_ticket(ticket_id)
        .map_err(translate_persistence_error)?;
    let site = site_info(persistence, &site)?;

    Ok(TicketRelations {
        ticket: TicketInfo::new(&ticket, interventions.len()),
        site,
        demandes: demandes.iter().map(DemandeInfo::from).collect(),
        interventions: interventions
            .iter()
            .map(|i| InterventionInfo::new(i, ctx.now))
            .collect(),
        responsables: assignment_infos(&assignments, &users, AssignmentKind::Responsable),
        agents_assignes: assignment_infos(&assignments, &users, AssignmentKind::Agent),
        doe: doe.as_ref().map(DoeInfo::from),
        affaire: affaire.as_ref().map(AffaireInfo::from),
        satisfaction: satisfaction.as_ref().map(SatisfactionInfo::from),
    })
}

/// Returns a client with its address, sites, demandes, representatives and
/// contracts.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown client
/// * `Unauthorized` if a client asks for another client
pub fn get_client_relations(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    client_id: i64,
) -> Result<ClientRelations, ApiError> {
    let client = require(persistence.find_client(client_id), "client", client_id)?;
    AuthorizationService::authorize_client_scope(
        &ctx.actor,
        Some(client_id),
        "get_client_relations",
    )?;

    let address = optional_by_id(client.address_id, |id| persistence.find_address(id))?;
    let sites = persistence
        .list_sites_for_client(client_id)
        .map_err(translate_persistence_error)?;
    let site_ids: Vec<i64> = sites.iter().map(|s| s.site_id).collect();
    let open = sites_with_open_tickets(persistence, &site_ids)?;

    let demandes = persistence
        .list_demandes_for_client(client_id)
        .map_err(translate_persistence_error)?;
    let representatives = persistence
        .list_representatives_for_client(client_id)
        .map_err(translate_persistence_error)?;
    let contracts = persistence
        .list_contracts_for_client(client_id)
        .map_err(translate_persistence_error)?;

    Ok(ClientRelations {
        client: ClientInfo::from(&client),
        address: address.as_ref().map(AddressInfo::from),
        sites: sites
            .iter()
            .map(|s| SiteInfo::new(s, open.contains(&s.site_id)))
            .collect(),
        demandes: demandes.iter().map(DemandeInfo::from).collect(),
        representatives: representatives.iter().map(RepresentativeInfo::from).collect(),
        contracts: contracts
            .iter()
            .map(|c| ContractInfo::new(c, ctx.now))
            .collect(),
    })
}

/// Lists tickets that are not finished, optionally for one site.
///
/// Clients only ever see tickets on their own sites.
///
/// # Errors
///
/// * `ResourceNotFound` for an unknown site
/// * `Unauthorized` if a client names another client's site
pub fn list_open_tickets(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    site_id: Option<i64>,
) -> Result<TicketListResponse, ApiError> {
    let scope: Option<Vec<i64>> = if let Some(site_id) = site_id {
        let site = require(persistence.find_site(site_id), "site", site_id)?;
        AuthorizationService::authorize_client_scope(
            &ctx.actor,
            site.client_id,
            "list_open_tickets",
        )?;
        Some(vec![site_id])
    } else if ctx.actor.role().is_staff() {
        None
    } else {
        let own_sites = match ctx.actor.client_id() {
            Some(client_id) => persistence
                .list_sites_for_client(client_id)
                .map_err(translate_persistence_error)?,
            None => Vec::new(),
        };
        Some(own_sites.iter().map(|s| s.site_id).collect())
    };

    let tickets = match scope.as_deref() {
        Some([]) => Vec::new(),
        scope => persistence
            .list_unfinished_tickets(scope)
            .map_err(translate_persistence_error)?,
    };
    Ok(TicketListResponse {
        tickets: ticket_infos(persistence, &tickets)?,
    })
}

/// Lists demandes still waiting for an admin, optionally for one client.
///
/// Clients only ever see their own demandes.
///
/// # Errors
///
/// Returns `Unauthorized` if a client names another client.
pub fn list_pending_demandes(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    client_id: Option<i64>,
) -> Result<DemandeListResponse, ApiError> {
    let client_id = if ctx.actor.role().is_staff() {
        client_id
    } else {
        let own = ctx.actor.client_id();
        AuthorizationService::authorize_client_scope(
            &ctx.actor,
            client_id.or(own),
            "list_pending_demandes",
        )?;
        own
    };

    let demandes = persistence
        .list_pending_demandes(client_id)
        .map_err(translate_persistence_error)?;
    Ok(DemandeListResponse {
        demandes: demandes.iter().map(DemandeInfo::from).collect(),
    })
}

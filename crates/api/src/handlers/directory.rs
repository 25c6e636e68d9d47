// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin maintenance of the reference data: addresses, clients and their
//! representatives, users, sites, contracts, associations, DOEs and affaires.

use fieldops::{
    NewAddress, NewAffaire, NewAssociation, NewClient, NewContract, NewDoe, NewRepresentative,
    NewSite, NewUser, RepresentativePatch, SitePatch,
};
use fieldops_domain::{AssignmentKind, Contact, SiteStatus, UserRole, parse_date};
use fieldops_persistence::Persistence;
use tracing::info;

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{ApiError, translate_persistence_error};
use crate::handlers::mutation_response;
use crate::lookup::{
    created_id, optional, optional_by_id, parse_field, persist, require, require_referenced,
};
use crate::request_response::{
    AssignRequest, ClientInfo, ClientListResponse, CreateAddressRequest, CreateAffaireRequest,
    CreateAssociationRequest, CreateClientRequest, CreateContractRequest, CreateDoeRequest,
    CreateRepresentativeRequest, CreateSiteRequest, CreateUserRequest, LinkSiteRequest,
    MutationResponse, UpdateRepresentativeRequest, UpdateSiteRequest,
};

fn parse_request_date(field: &'static str, value: &str) -> Result<time::Date, ApiError> {
    parse_date(value).map_err(|err| ApiError::InvalidInput {
        field: String::from(field),
        message: err.to_string(),
    })
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for a blank line 1, postal code or city
pub fn create_address(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateAddressRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_address")?;
    let address = NewAddress {
        line1: request.line1,
        line2: request.line2,
        postal_code: request.postal_code,
        city: request.city,
        country: request.country,
    };
    let persisted = persist(
        persistence,
        fieldops::create_address(address, &ctx.operation()),
    )?;
    let address_id = created_id(&persisted)?;
    Ok(mutation_response(
        address_id,
        &persisted,
        format!("Address {address_id} created"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for a blank name, a malformed email or an unknown address
pub fn create_client(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateClientRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_client")?;
    let address = optional_by_id(request.address_id, |id| persistence.find_address(id))?;
    let client = NewClient {
        name: request.name,
        contact: Contact {
            name: request.contact_name,
            email: request.contact_email,
            phone: request.contact_phone,
        },
        comment: request.comment,
        address_id: request.address_id,
    };
    let persisted = persist(
        persistence,
        fieldops::create_client(client, address.as_ref(), &ctx.operation()),
    )?;
    let client_id = created_id(&persisted)?;
    info!(client_id, "Client created");
    Ok(mutation_response(
        client_id,
        &persisted,
        format!("Client {client_id} created"),
    ))
}

/// Lists every client. Staff only.
///
/// # Errors
///
/// Returns `Unauthorized` for clients.
pub fn list_clients(
    persistence: &mut Persistence,
    ctx: &RequestContext,
) -> Result<ClientListResponse, ApiError> {
    AuthorizationService::require_staff(&ctx.actor, "list_clients")?;
    let clients = persistence
        .list_clients()
        .map_err(translate_persistence_error)?;
    Ok(ClientListResponse {
        clients: clients.iter().map(ClientInfo::from).collect(),
    })
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown client
/// * `InvalidInput` for a blank name or a malformed email
pub fn create_representative(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    client_id: i64,
    request: CreateRepresentativeRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_representative")?;
    let client = require(persistence.find_client(client_id), "client", client_id)?;
    let representative = NewRepresentative {
        client_id,
        name: request.name,
        function: request.function,
        email: request.email,
        phone: request.phone,
    };
    let persisted = persist(
        persistence,
        fieldops::create_representative(&client, representative, &ctx.operation()),
    )?;
    let representative_id = created_id(&persisted)?;
    Ok(mutation_response(
        representative_id,
        &persisted,
        format!("Representative {representative_id} added to client {client_id}"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown representative
/// * `InvalidInput` for a blank name or a malformed email
pub fn update_representative(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    representative_id: i64,
    request: UpdateRepresentativeRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "update_representative")?;
    let existing = require(
        persistence.find_representative(representative_id),
        "representative",
        representative_id,
    )?;
    let patch = RepresentativePatch {
        name: request.name,
        function: request.function,
        email: request.email,
        phone: request.phone,
    };
    let persisted = persist(
        persistence,
        fieldops::update_representative(&existing, patch, &ctx.operation()),
    )?;
    Ok(mutation_response(
        representative_id,
        &persisted,
        format!("Representative {representative_id} updated"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown representative
pub fn delete_representative(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    representative_id: i64,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "delete_representative")?;
    let existing = require(
        persistence.find_representative(representative_id),
        "representative",
        representative_id,
    )?;
    let persisted = persist(
        persistence,
        Ok(fieldops::delete_representative(&existing, &ctx.operation())),
    )?;
    Ok(mutation_response(
        representative_id,
        &persisted,
        format!("Representative {representative_id} deleted"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for an unknown role, a blank login or display name, a
///   malformed matricule or email, or a client binding that does not fit
///   the role
/// * `Conflict` for a login or matricule already in use
pub fn create_user(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateUserRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_user")?;
    let role: UserRole = parse_field("role", &request.role)?;
    let client = optional_by_id(request.client_id, |id| persistence.find_client(id))?;
    let user = NewUser {
        login: request.login,
        display_name: request.display_name,
        role,
        client_id: request.client_id,
        matricule: request.matricule,
        email: request.email,
        phone: request.phone,
    };
    let persisted = persist(
        persistence,
        fieldops::create_user(user, client.as_ref(), &ctx.operation()),
    )?;
    let user_id = created_id(&persisted)?;
    info!(user_id, role = %role, "User created");
    Ok(mutation_response(
        user_id,
        &persisted,
        format!("User {user_id} created"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for a blank name, an unknown status, client, address or
///   responsible agent
pub fn create_site(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateSiteRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_site")?;
    let status: SiteStatus = match request.status.as_deref() {
        Some(status) => parse_field("status", status)?,
        None => SiteStatus::default(),
    };
    let client = optional_by_id(request.client_id, |id| persistence.find_client(id))?;
    let address = optional_by_id(request.address_id, |id| persistence.find_address(id))?;
    let agent = optional_by_id(request.responsible_agent_id, |id| persistence.find_user(id))?;
    let site = NewSite {
        client_id: request.client_id,
        name: request.name,
        address_id: request.address_id,
        status,
        responsible_agent_id: request.responsible_agent_id,
        comment: request.comment,
    };
    let persisted = persist(
        persistence,
        fieldops::create_site(
            site,
            client.as_ref(),
            address.as_ref(),
            agent.as_ref(),
            &ctx.operation(),
        ),
    )?;
    let site_id = created_id(&persisted)?;
    info!(site_id, "Site created");
    Ok(mutation_response(
        site_id,
        &persisted,
        format!("Site {site_id} created"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown site
/// * `InvalidInput` for a blank name, an unknown status, client, address or
///   responsible agent
pub fn update_site(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    site_id: i64,
    request: UpdateSiteRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "update_site")?;
    let existing = require(persistence.find_site(site_id), "site", site_id)?;
    let status: Option<SiteStatus> = request
        .status
        .as_deref()
        .map(|s| parse_field("status", s))
        .transpose()?;
    let client = optional_by_id(request.client_id, |id| persistence.find_client(id))?;
    let address = optional_by_id(request.address_id, |id| persistence.find_address(id))?;
    let agent = optional_by_id(request.responsible_agent_id, |id| persistence.find_user(id))?;
    let patch = SitePatch {
        name: request.name,
        status,
        client_id: request.client_id,
        address_id: request.address_id,
        responsible_agent_id: request.responsible_agent_id,
        comment: request.comment,
    };
    let persisted = persist(
        persistence,
        fieldops::update_site(
            &existing,
            patch,
            client.as_ref(),
            address.as_ref(),
            agent.as_ref(),
            &ctx.operation(),
        ),
    )?;
    Ok(mutation_response(
        site_id,
        &persisted,
        format!("Site {site_id} updated"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for an unknown client, a blank title, a malformed date
///   or an end date before the start date
pub fn create_contract(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateContractRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_contract")?;
    let client = optional(persistence.find_client(request.client_id))?;
    let contract = NewContract {
        client_id: request.client_id,
        title: request.title,
        start_date: parse_request_date("start_date", &request.start_date)?,
        end_date: parse_request_date("end_date", &request.end_date)?,
        comment: request.comment,
    };
    let persisted = persist(
        persistence,
        fieldops::create_contract(contract, client.as_ref(), &ctx.operation()),
    )?;
    let contract_id = created_id(&persisted)?;
    Ok(mutation_response(
        contract_id,
        &persisted,
        format!("Contract {contract_id} created"),
    ))
}

/// Covers a site with a contract.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown contract
/// * `InvalidInput` for an unknown site or a site of another client
pub fn link_contract_site(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    contract_id: i64,
    request: LinkSiteRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "link_contract_site")?;
    let contract = require(persistence.find_contract(contract_id), "contract", contract_id)?;
    let site = require_referenced(
        persistence.find_site(request.site_id),
        "site_id",
        request.site_id,
    )?;
    let persisted = persist(
        persistence,
        fieldops::link_contract_site(&contract, &site, &ctx.operation()),
    )?;
    Ok(mutation_response(
        contract_id,
        &persisted,
        format!("Site {} covered by contract {contract_id}", site.site_id),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for a blank title, a malformed billing email or an
///   unknown address
pub fn create_association(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateAssociationRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_association")?;
    let address = optional_by_id(request.address_id, |id| persistence.find_address(id))?;
    let association = NewAssociation {
        title: request.title,
        billing_email: request.billing_email,
        address_id: request.address_id,
    };
    let persisted = persist(
        persistence,
        fieldops::create_association(association, address.as_ref(), &ctx.operation()),
    )?;
    let association_id = created_id(&persisted)?;
    Ok(mutation_response(
        association_id,
        &persisted,
        format!("Association {association_id} created"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown association
/// * `InvalidInput` for an unknown site
pub fn link_association_site(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    association_id: i64,
    request: LinkSiteRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "link_association_site")?;
    let association = require(
        persistence.find_association(association_id),
        "association",
        association_id,
    )?;
    let site = require_referenced(
        persistence.find_site(request.site_id),
        "site_id",
        request.site_id,
    )?;
    let persisted = persist(
        persistence,
        Ok(fieldops::link_association_site(
            &association,
            &site,
            &ctx.operation(),
        )),
    )?;
    Ok(mutation_response(
        association_id,
        &persisted,
        format!("Site {} managed by association {association_id}", site.site_id),
    ))
}

/// Assigns a staff member to an association by matricule.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown association or matricule
/// * `InvalidInput` if the matricule belongs to a client user
pub fn assign_association(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    association_id: i64,
    request: AssignRequest,
    kind: AssignmentKind,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "assign_association")?;
    let association = require(
        persistence.find_association(association_id),
        "association",
        association_id,
    )?;
    let matricule = request.matricule.trim();
    let agent = optional(persistence.find_user_by_matricule(matricule))?;
    if let Some(agent) = &agent {
        let current = persistence
            .list_association_assignments(association_id)
            .map_err(translate_persistence_error)?;
        if current
            .iter()
            .any(|a| a.matches(agent.user_id, kind, request.role_label.as_deref()))
        {
            return Ok(MutationResponse {
                id: association_id,
                event_id: None,
                message: format!(
                    "{matricule} already assigned to association {association_id} as {}",
                    kind.as_str()
                ),
            });
        }
    }
    let persisted = persist(
        persistence,
        fieldops::assign_to_association(
            &association,
            agent.as_ref(),
            matricule,
            kind,
            request.role_label,
            &ctx.operation(),
        ),
    )?;
    Ok(mutation_response(
        association_id,
        &persisted,
        format!(
            "{matricule} assigned to association {association_id} as {}",
            kind.as_str()
        ),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for a blank title or an unknown site
pub fn create_doe(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateDoeRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_doe")?;
    let site = optional(persistence.find_site(request.site_id))?;
    let doe = NewDoe {
        site_id: request.site_id,
        title: request.title,
    };
    let persisted = persist(
        persistence,
        fieldops::create_doe(doe, site.as_ref(), &ctx.operation()),
    )?;
    let doe_id = created_id(&persisted)?;
    Ok(mutation_response(
        doe_id,
        &persisted,
        format!("DOE {doe_id} created"),
    ))
}

/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `InvalidInput` for a blank title or an unknown client
pub fn create_affaire(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    request: CreateAffaireRequest,
) -> Result<MutationResponse, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "create_affaire")?;
    let client = optional_by_id(request.client_id, |id| persistence.find_client(id))?;
    let affaire = NewAffaire {
        title: request.title,
        client_id: request.client_id,
    };
    let persisted = persist(
        persistence,
        fieldops::create_affaire(affaire, client.as_ref(), &ctx.operation()),
    )?;
    let affaire_id = created_id(&persisted)?;
    Ok(mutation_response(
        affaire_id,
        &persisted,
        format!("Affaire {affaire_id} created"),
    ))
}

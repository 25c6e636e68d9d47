// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reference data: addresses, clients, representatives, users, sites,
//! contracts, associations, DOEs and affaires.
//!
//! Uniqueness of logins and matricules is enforced by the store; the
//! functions here only check the shape of the data and its references.

use crate::command::{RepresentativePatch, SitePatch};
use crate::error::CoreError;
use crate::mutation::{
    ImportedSite, Mutation, NewAddress, NewAffaire, NewAssociation, NewClient, NewContract,
    NewDoe, NewRepresentative, NewSite, NewUser,
};
use crate::snapshot;
use crate::state::{OperationContext, TransitionResult};
use fieldops_audit::{EntityKind, EntityRef, StateSnapshot};
use fieldops_domain::{
    Address, AssignmentKind, Association, Client, Contract, DomainError, Representative, Site,
    User, UserRole, validate_date_window, validate_email, validate_matricule, validate_required,
};

fn validate_optional_email(field: &'static str, value: Option<&str>) -> Result<(), DomainError> {
    match value {
        Some(email) if !email.trim().is_empty() => validate_email(field, email.trim()),
        _ => Ok(()),
    }
}

fn ensure_exists<T>(entity: Option<&T>, field: &'static str, id: Option<i64>) -> Result<(), DomainError> {
    match (id, entity) {
        (Some(id), None) => Err(DomainError::invalid_field(
            field,
            format!("{id} does not exist"),
        )),
        _ => Ok(()),
    }
}

fn ensure_staff(user: Option<&User>, field: &'static str, id: Option<i64>) -> Result<(), DomainError> {
    ensure_exists(user, field, id)?;
    if let Some(user) = user.filter(|u| !u.role.is_staff()) {
        return Err(DomainError::InvalidAssignee {
            user: user.login.clone(),
            reason: format!("role '{}' is not staff", user.role),
        });
    }
    Ok(())
}

fn created(
    ctx: &OperationContext,
    action: &str,
    kind: EntityKind,
    label: &str,
    mutation: Mutation,
) -> TransitionResult {
    let audit_event = ctx.audit(
        action,
        Some(label.to_string()),
        EntityRef::pending(kind),
        StateSnapshot::absent(),
        snapshot::created(label),
    );
    TransitionResult {
        mutation,
        audit_event,
    }
}

/// Validates the fields shared by every address.
///
/// # Errors
///
/// Returns a validation error if line 1, postal code or city is blank.
pub fn validate_address(address: &NewAddress) -> Result<(), DomainError> {
    validate_required("address_line1", &address.line1)?;
    validate_required("postal_code", &address.postal_code)?;
    validate_required("city", &address.city)?;
    Ok(())
}

/// Creates an address.
///
/// # Errors
///
/// Returns a validation error for a blank line 1, postal code or city.
pub fn create_address(
    address: NewAddress,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_address(&address)?;
    let label = format!("address {} {}", address.postal_code, address.city);
    Ok(created(
        ctx,
        "CreateAddress",
        EntityKind::Address,
        &label,
        Mutation::CreateAddress(address),
    ))
}

/// Creates a client.
///
/// # Errors
///
/// Returns a validation error for a blank name, a malformed contact email
/// or an unknown address.
pub fn create_client(
    client: NewClient,
    address: Option<&Address>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("name", &client.name)?;
    validate_optional_email("contact_email", client.contact.email.as_deref())?;
    ensure_exists(address, "address_id", client.address_id)?;

    let label = format!("client '{}'", client.name);
    Ok(created(
        ctx,
        "CreateClient",
        EntityKind::Client,
        &label,
        Mutation::CreateClient(client),
    ))
}

/// Adds a representative to a client.
///
/// # Errors
///
/// Returns a validation error for a blank name or malformed email.
pub fn create_representative(
    client: &Client,
    mut representative: NewRepresentative,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("name", &representative.name)?;
    validate_optional_email("email", representative.email.as_deref())?;
    representative.client_id = client.client_id;

    let label = format!(
        "representative '{}' of client {}",
        representative.name, client.client_id
    );
    Ok(created(
        ctx,
        "CreateRepresentative",
        EntityKind::Representative,
        &label,
        Mutation::CreateRepresentative(representative),
    ))
}

/// Edits a representative.
///
/// # Errors
///
/// Returns a validation error for a blank name or malformed email.
pub fn update_representative(
    existing: &Representative,
    patch: RepresentativePatch,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    let mut updated = existing.clone();
    if let Some(name) = patch.name {
        validate_required("name", &name)?;
        updated.name = name;
    }
    if let Some(email) = patch.email {
        validate_optional_email("email", Some(&email))?;
        updated.email = Some(email).filter(|e| !e.trim().is_empty());
    }
    if let Some(function) = patch.function {
        updated.function = Some(function).filter(|f| !f.trim().is_empty());
    }
    if let Some(phone) = patch.phone {
        updated.phone = Some(phone).filter(|p| !p.trim().is_empty());
    }

    let audit_event = ctx.audit(
        "UpdateRepresentative",
        None,
        EntityRef::existing(EntityKind::Representative, existing.representative_id),
        StateSnapshot::new(format!("name={:?}", existing.name)),
        StateSnapshot::new(format!("name={:?}", updated.name)),
    );
    Ok(TransitionResult {
        mutation: Mutation::UpdateRepresentative(updated),
        audit_event,
    })
}

/// Removes a representative.
#[must_use]
pub fn delete_representative(
    existing: &Representative,
    ctx: &OperationContext,
) -> TransitionResult {
    let audit_event = ctx.audit(
        "DeleteRepresentative",
        Some(format!(
            "representative '{}' of client {}",
            existing.name, existing.client_id
        )),
        EntityRef::existing(EntityKind::Representative, existing.representative_id),
        StateSnapshot::new(format!("name={:?}", existing.name)),
        StateSnapshot::absent(),
    );
    TransitionResult {
        mutation: Mutation::DeleteRepresentative {
            representative_id: existing.representative_id,
        },
        audit_event,
    }
}

/// Creates a user.
///
/// Client users must name an existing client; staff users must not.
///
/// # Errors
///
/// Returns a validation error for a blank login or display name, a
/// malformed email or matricule, or an inconsistent client reference.
pub fn create_user(
    user: NewUser,
    client: Option<&Client>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("login", &user.login)?;
    if user.login.chars().any(char::is_whitespace) {
        return Err(DomainError::invalid_field("login", "cannot contain whitespace").into());
    }
    validate_required("display_name", &user.display_name)?;
    validate_optional_email("email", user.email.as_deref())?;
    validate_matricule(user.matricule.as_deref())?;

    match (user.role, user.client_id) {
        (UserRole::Client, None) => {
            return Err(
                DomainError::invalid_field("client_id", "required for client users").into(),
            );
        }
        (UserRole::Admin | UserRole::Agent, Some(_)) => {
            return Err(DomainError::invalid_field(
                "client_id",
                "only client users belong to a client",
            )
            .into());
        }
        _ => ensure_exists(client, "client_id", user.client_id)?,
    }

    let label = format!("user '{}' ({})", user.login, user.role);
    Ok(created(
        ctx,
        "CreateUser",
        EntityKind::User,
        &label,
        Mutation::CreateUser(user),
    ))
}

/// Creates a site, optionally attached to a client.
///
/// # Errors
///
/// Returns a validation error for a blank name, an unknown client or
/// address, or a responsible agent who is unknown or not staff.
pub fn create_site(
    site: NewSite,
    client: Option<&Client>,
    address: Option<&Address>,
    responsible_agent: Option<&User>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("name", &site.name)?;
    ensure_exists(client, "client_id", site.client_id)?;
    ensure_exists(address, "address_id", site.address_id)?;
    ensure_staff(responsible_agent, "responsible_agent_id", site.responsible_agent_id)?;

    let label = format!("site '{}'", site.name);
    Ok(created(
        ctx,
        "CreateSite",
        EntityKind::Site,
        &label,
        Mutation::CreateSite(site),
    ))
}

/// Changes a site's name, status, client, address, responsible agent or comment.
///
/// # Errors
///
/// Returns a validation error for a blank name, an empty patch or an
/// unknown or non-staff reference.
pub fn update_site(
    existing: &Site,
    patch: SitePatch,
    client: Option<&Client>,
    address: Option<&Address>,
    responsible_agent: Option<&User>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if patch == SitePatch::default() {
        return Err(DomainError::invalid_field("patch", "no field to change").into());
    }
    ensure_exists(client, "client_id", patch.client_id)?;
    ensure_exists(address, "address_id", patch.address_id)?;
    ensure_staff(responsible_agent, "responsible_agent_id", patch.responsible_agent_id)?;

    let mut updated = existing.clone();
    if let Some(name) = patch.name {
        validate_required("name", &name)?;
        updated.name = name;
    }
    if let Some(status) = patch.status {
        updated.status = status;
    }
    if patch.client_id.is_some() {
        updated.client_id = patch.client_id;
    }
    if patch.address_id.is_some() {
        updated.address_id = patch.address_id;
    }
    if patch.responsible_agent_id.is_some() {
        updated.responsible_agent_id = patch.responsible_agent_id;
    }
    if let Some(comment) = patch.comment {
        updated.comment = Some(comment).filter(|c| !c.trim().is_empty());
    }

    let audit_event = ctx.audit(
        "UpdateSite",
        None,
        EntityRef::existing(EntityKind::Site, existing.site_id),
        snapshot::site(existing),
        snapshot::site(&updated),
    );
    Ok(TransitionResult {
        mutation: Mutation::UpdateSite(updated),
        audit_event,
    })
}

/// Creates a batch of sites for one client.
///
/// Rows are validated by the caller's preview; each one is checked again
/// here and the whole batch fails on the first invalid row.
///
/// # Errors
///
/// Returns a validation error if the batch is empty or a row is incomplete.
pub fn import_sites(
    client: &Client,
    sites: Vec<ImportedSite>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if sites.is_empty() {
        return Err(DomainError::invalid_field("sites", "nothing to import").into());
    }
    for site in &sites {
        validate_required("name", &site.name)?;
        validate_address(&site.address)?;
    }

    let audit_event = ctx.audit(
        "ImportSites",
        Some(format!(
            "{} site(s) imported for client {}",
            sites.len(),
            client.client_id
        )),
        EntityRef::existing(EntityKind::Client, client.client_id),
        StateSnapshot::absent(),
        snapshot::created(&format!("{} site(s)", sites.len())),
    );
    Ok(TransitionResult {
        mutation: Mutation::ImportSites {
            client_id: client.client_id,
            sites,
        },
        audit_event,
    })
}

/// Creates a contract for a client.
///
/// # Errors
///
/// Returns a validation error for an unknown client, a blank title or an
/// end date before the start date.
pub fn create_contract(
    contract: NewContract,
    client: Option<&Client>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    ensure_exists(client, "client_id", Some(contract.client_id))?;
    validate_required("title", &contract.title)?;
    validate_date_window(contract.start_date, contract.end_date)?;

    let label = format!("contract '{}'", contract.title);
    Ok(created(
        ctx,
        "CreateContract",
        EntityKind::Contract,
        &label,
        Mutation::CreateContract(contract),
    ))
}

/// Puts a site under a contract.
///
/// # Errors
///
/// Returns `SiteClientMismatch` if the site belongs to another client.
pub fn link_contract_site(
    contract: &Contract,
    site: &Site,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    if site.client_id != Some(contract.client_id) {
        return Err(DomainError::SiteClientMismatch {
            site_id: site.site_id,
            client_id: contract.client_id,
        }
        .into());
    }
    let audit_event = ctx.audit(
        "LinkContractSite",
        Some(format!(
            "site {} covered by contract {}",
            site.site_id, contract.contract_id
        )),
        EntityRef::existing(EntityKind::Contract, contract.contract_id),
        StateSnapshot::absent(),
        StateSnapshot::new(format!("site_id={}", site.site_id)),
    );
    Ok(TransitionResult {
        mutation: Mutation::LinkContractSite {
            contract_id: contract.contract_id,
            site_id: site.site_id,
        },
        audit_event,
    })
}

/// Creates an association.
///
/// # Errors
///
/// Returns a validation error for a blank title, a malformed billing email
/// or an unknown address.
pub fn create_association(
    association: NewAssociation,
    address: Option<&Address>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("title", &association.title)?;
    validate_email("billing_email", association.billing_email.trim())?;
    ensure_exists(address, "address_id", association.address_id)?;

    let label = format!("association '{}'", association.title);
    Ok(created(
        ctx,
        "CreateAssociation",
        EntityKind::Association,
        &label,
        Mutation::CreateAssociation(association),
    ))
}

/// Adds a site to an association.
#[must_use]
pub fn link_association_site(
    association: &Association,
    site: &Site,
    ctx: &OperationContext,
) -> TransitionResult {
    let audit_event = ctx.audit(
        "LinkAssociationSite",
        Some(format!(
            "site {} joined association {}",
            site.site_id, association.association_id
        )),
        EntityRef::existing(EntityKind::Association, association.association_id),
        StateSnapshot::absent(),
        StateSnapshot::new(format!("site_id={}", site.site_id)),
    );
    TransitionResult {
        mutation: Mutation::LinkAssociationSite {
            association_id: association.association_id,
            site_id: site.site_id,
        },
        audit_event,
    }
}

/// Attaches a staff user to an association.
///
/// # Errors
///
/// * `EntityNotFound` if no user carries `matricule`
/// * `InvalidAssignee` if the user is not staff
pub fn assign_to_association(
    association: &Association,
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
            reason: format!("role '{}' cannot be assigned", agent.role),
        }
        .into());
    }

    let audit_event = ctx.audit(
        "AssignToAssociation",
        Some(format!(
            "{} {} assigned to association {}",
            kind.as_str(),
            matricule,
            association.association_id
        )),
        EntityRef::existing(EntityKind::Association, association.association_id),
        StateSnapshot::absent(),
        StateSnapshot::new(format!("user_id={},kind={}", agent.user_id, kind.as_str())),
    );
    Ok(TransitionResult {
        mutation: Mutation::AssignToAssociation {
            association_id: association.association_id,
            user_id: agent.user_id,
            kind,
            role_label: role_label.filter(|r| !r.trim().is_empty()),
        },
        audit_event,
    })
}

/// Creates a DOE for a site.
///
/// # Errors
///
/// Returns a validation error for an unknown site or a blank title.
pub fn create_doe(
    doe: NewDoe,
    site: Option<&Site>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    ensure_exists(site, "site_id", Some(doe.site_id))?;
    validate_required("title", &doe.title)?;

    let label = format!("DOE '{}' for site {}", doe.title, doe.site_id);
    Ok(created(
        ctx,
        "CreateDoe",
        EntityKind::Doe,
        &label,
        Mutation::CreateDoe(doe),
    ))
}

/// Creates an affaire.
///
/// # Errors
///
/// Returns a validation error for a blank title or an unknown client.
pub fn create_affaire(
    affaire: NewAffaire,
    client: Option<&Client>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_required("title", &affaire.title)?;
    ensure_exists(client, "client_id", affaire.client_id)?;

    let label = format!("affaire '{}'", affaire.title);
    Ok(created(
        ctx,
        "CreateAffaire",
        EntityKind::Affaire,
        &label,
        Mutation::CreateAffaire(affaire),
    ))
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Entity writes, one per `Mutation` variant.
//!
//! Each function returns the ids of the rows it created, in creation
//! order. Guarded updates return `ConditionalWriteFailed` when their
//! precondition no longer holds in the database.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use fieldops::{
    ImportedSite, Mutation, NewAddress, NewAffaire, NewAssociation, NewClient, NewContract,
    NewDemande, NewDoe, NewIntervention, NewMessage, NewRepresentative, NewSatisfaction,
    NewSite, NewTicket, NewUser,
};
use fieldops_domain::{
    AssignmentKind, DemandeStatus, InterventionStatus, Representative, Site, SiteStatus,
    TicketState, format_date, format_timestamp, parse_timestamp,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{
    addresses, affaires, association_assignments, association_sites, associations, clients,
    contract_sites, contracts, demandes, does, interventions, messages, representatives,
    satisfactions, sites, ticket_assignments, tickets, users,
};
use crate::error::PersistenceError;

/// Applies one mutation.
///
/// Must run inside the caller's transaction.
///
/// # Errors
///
/// Returns an error if a write fails or a guarded update matched no row.
pub fn apply_mutation(
    conn: &mut SqliteConnection,
    mutation: &Mutation,
) -> Result<Vec<i64>, PersistenceError> {
    match mutation {
        Mutation::CreateDemande(demande) => insert_demande(conn, demande).map(|id| vec![id]),
        Mutation::UpdateDemande {
            demande_id,
            title,
            description,
            site_id,
            status,
        } => {
            update_demande(conn, *demande_id, title, description, *site_id, *status)?;
            Ok(Vec::new())
        }
        Mutation::ConvertDemande { demande_id, ticket } => {
            convert_demande(conn, *demande_id, ticket).map(|id| vec![id])
        }
        Mutation::CreateTicket(ticket) => insert_ticket(conn, ticket).map(|id| vec![id]),
        Mutation::UpdateTicketState {
            ticket_id,
            state,
            ended_at,
            demande,
        } => {
            update_ticket_state(conn, *ticket_id, *state, *ended_at, *demande)?;
            Ok(Vec::new())
        }
        Mutation::AssignToTicket {
            ticket_id,
            user_id,
            kind,
            role_label,
            set_primary_responsable,
        } => {
            assign_to_ticket(
                conn,
                *ticket_id,
                *user_id,
                *kind,
                role_label.as_deref(),
                *set_primary_responsable,
            )?;
            Ok(Vec::new())
        }
        Mutation::CreateIntervention(intervention) => {
            insert_intervention(conn, intervention).map(|id| vec![id])
        }
        Mutation::CloseIntervention {
            intervention_id,
            ended_at,
        } => {
            close_intervention(conn, *intervention_id, *ended_at)?;
            Ok(Vec::new())
        }
        Mutation::CreateSatisfaction(satisfaction) => {
            insert_satisfaction(conn, satisfaction).map(|id| vec![id])
        }
        Mutation::AppendMessage(message) => insert_message(conn, message).map(|id| vec![id]),
        Mutation::CreateAddress(address) => insert_address(conn, address).map(|id| vec![id]),
        Mutation::CreateClient(client) => insert_client(conn, client).map(|id| vec![id]),
        Mutation::CreateRepresentative(representative) => {
            insert_representative(conn, representative).map(|id| vec![id])
        }
        Mutation::UpdateRepresentative(representative) => {
            update_representative(conn, representative)?;
            Ok(Vec::new())
        }
        Mutation::DeleteRepresentative { representative_id } => {
            delete_representative(conn, *representative_id)?;
            Ok(Vec::new())
        }
        Mutation::CreateUser(user) => insert_user(conn, user).map(|id| vec![id]),
        Mutation::CreateSite(site) => insert_site(conn, site).map(|id| vec![id]),
        Mutation::UpdateSite(site) => {
            update_site(conn, site)?;
            Ok(Vec::new())
        }
        Mutation::ImportSites { client_id, sites } => import_sites(conn, *client_id, sites),
        Mutation::CreateContract(contract) => insert_contract(conn, contract).map(|id| vec![id]),
        Mutation::LinkContractSite {
            contract_id,
            site_id,
        } => {
            diesel::insert_or_ignore_into(contract_sites::table)
                .values((
                    contract_sites::contract_id.eq(*contract_id),
                    contract_sites::site_id.eq(*site_id),
                ))
                .execute(conn)?;
            Ok(Vec::new())
        }
        Mutation::CreateAssociation(association) => {
            insert_association(conn, association).map(|id| vec![id])
        }
        Mutation::LinkAssociationSite {
            association_id,
            site_id,
        } => {
            diesel::insert_or_ignore_into(association_sites::table)
                .values((
                    association_sites::association_id.eq(*association_id),
                    association_sites::site_id.eq(*site_id),
                ))
                .execute(conn)?;
            Ok(Vec::new())
        }
        Mutation::AssignToAssociation {
            association_id,
            user_id,
            kind,
            role_label,
        } => {
            diesel::insert_into(association_assignments::table)
                .values((
                    association_assignments::association_id.eq(*association_id),
                    association_assignments::user_id.eq(*user_id),
                    association_assignments::kind.eq(kind.as_str()),
                    association_assignments::role_label.eq(role_label.as_deref()),
                ))
                .on_conflict((
                    association_assignments::association_id,
                    association_assignments::user_id,
                    association_assignments::kind,
                ))
                .do_update()
                .set(
                    association_assignments::role_label
                        .eq(excluded(association_assignments::role_label)),
                )
                .execute(conn)?;
            Ok(Vec::new())
        }
        Mutation::CreateDoe(doe) => insert_doe(conn, doe).map(|id| vec![id]),
        Mutation::CreateAffaire(affaire) => insert_affaire(conn, affaire).map(|id| vec![id]),
    }
}

/// Maps an update's affected-row count to the guarded-write outcome.
const fn expect_one_row(
    rows: usize,
    entity: &'static str,
    id: i64,
) -> Result<(), PersistenceError> {
    if rows == 0 {
        return Err(PersistenceError::ConditionalWriteFailed { entity, id });
    }
    Ok(())
}

/// Maps an unguarded update's affected-row count.
const fn expect_existing(
    rows: usize,
    entity: &'static str,
    id: i64,
) -> Result<(), PersistenceError> {
    if rows == 0 {
        return Err(PersistenceError::EntityNotFound { entity, id });
    }
    Ok(())
}

fn insert_demande(
    conn: &mut SqliteConnection,
    demande: &NewDemande,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(demandes::table)
        .values((
            demandes::client_id.eq(demande.client_id),
            demandes::site_id.eq(demande.site_id),
            demandes::title.eq(&demande.title),
            demandes::description.eq(&demande.description),
            demandes::status.eq(DemandeStatus::Pending.as_str()),
            demandes::created_at.eq(format_timestamp(demande.created_at)),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn update_demande(
    conn: &mut SqliteConnection,
    demande_id: i64,
    title: &str,
    description: &str,
    site_id: i64,
    status: DemandeStatus,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(
        demandes::table
            .filter(demandes::demande_id.eq(demande_id))
            .filter(demandes::ticket_id.is_null()),
    )
    .set((
        demandes::title.eq(title),
        demandes::description.eq(description),
        demandes::site_id.eq(site_id),
        demandes::status.eq(status.as_str()),
    ))
    .execute(conn)?;
    expect_one_row(rows, "demande", demande_id)
}

/// Creates the ticket, then claims the demande for it.
///
/// Two conversions racing on the same demande cannot both succeed: the
/// second one either trips the unique index on `tickets.demande_id` or
/// finds `ticket_id` already set.
fn convert_demande(
    conn: &mut SqliteConnection,
    demande_id: i64,
    ticket: &NewTicket,
) -> Result<i64, PersistenceError> {
    let ticket_id: i64 = match insert_ticket(conn, ticket) {
        Ok(id) => id,
        Err(PersistenceError::UniqueViolation(_)) => {
            return Err(PersistenceError::ConditionalWriteFailed {
                entity: "demande",
                id: demande_id,
            });
        }
        Err(e) => return Err(e),
    };

    let rows: usize = diesel::update(
        demandes::table
            .filter(demandes::demande_id.eq(demande_id))
            .filter(demandes::ticket_id.is_null()),
    )
    .set((
        demandes::ticket_id.eq(Some(ticket_id)),
        demandes::status.eq(DemandeStatus::InProgress.as_str()),
    ))
    .execute(conn)?;
    expect_one_row(rows, "demande", demande_id)?;

    debug!(demande_id, ticket_id, "Linked demande to its ticket");
    Ok(ticket_id)
}

fn insert_ticket(conn: &mut SqliteConnection, ticket: &NewTicket) -> Result<i64, PersistenceError> {
    diesel::insert_into(tickets::table)
        .values((
            tickets::title.eq(&ticket.title),
            tickets::description.eq(&ticket.description),
            tickets::site_id.eq(ticket.site_id),
            tickets::demande_id.eq(ticket.demande_id),
            tickets::affaire_id.eq(Some(ticket.affaire_id)),
            tickets::doe_id.eq(Some(ticket.doe_id)),
            tickets::state.eq(ticket.state.as_str()),
            tickets::responsable_id.eq(ticket.responsable_id),
            tickets::started_at.eq(format_timestamp(ticket.started_at)),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn update_ticket_state(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    state: TicketState,
    ended_at: Option<OffsetDateTime>,
    demande: Option<(i64, DemandeStatus)>,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
        .set((
            tickets::state.eq(state.as_str()),
            tickets::ended_at.eq(ended_at.map(format_timestamp)),
        ))
        .execute(conn)?;
    expect_existing(rows, "ticket", ticket_id)?;

    if let Some((demande_id, status)) = demande {
        let rows: usize =
            diesel::update(demandes::table.filter(demandes::demande_id.eq(demande_id)))
                .set(demandes::status.eq(status.as_str()))
                .execute(conn)?;
        expect_existing(rows, "demande", demande_id)?;
    }
    Ok(())
}

fn assign_to_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    user_id: i64,
    kind: AssignmentKind,
    role_label: Option<&str>,
    set_primary_responsable: bool,
) -> Result<(), PersistenceError> {
    // Upsert on the (ticket, user, kind) key; a repeat only refreshes the label.
    diesel::insert_into(ticket_assignments::table)
        .values((
            ticket_assignments::ticket_id.eq(ticket_id),
            ticket_assignments::user_id.eq(user_id),
            ticket_assignments::kind.eq(kind.as_str()),
            ticket_assignments::role_label.eq(role_label),
        ))
        .on_conflict((
            ticket_assignments::ticket_id,
            ticket_assignments::user_id,
            ticket_assignments::kind,
        ))
        .do_update()
        .set(ticket_assignments::role_label.eq(excluded(ticket_assignments::role_label)))
        .execute(conn)?;
    debug!(ticket_id, user_id, kind = kind.as_str(), "Assignment stored");

    if set_primary_responsable {
        let rows: usize = diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
            .set(tickets::responsable_id.eq(Some(user_id)))
            .execute(conn)?;
        expect_existing(rows, "ticket", ticket_id)?;
    }
    Ok(())
}

fn insert_intervention(
    conn: &mut SqliteConnection,
    intervention: &NewIntervention,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(interventions::table)
        .values((
            interventions::ticket_id.eq(intervention.ticket_id),
            interventions::description.eq(&intervention.description),
            interventions::started_at.eq(format_timestamp(intervention.started_at)),
            interventions::ended_at.eq(intervention.ended_at.map(format_timestamp)),
            interventions::status.eq(intervention.status.as_str()),
            interventions::previous_intervention_id.eq(intervention.previous_intervention_id),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn close_intervention(
    conn: &mut SqliteConnection,
    intervention_id: i64,
    ended_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(
        interventions::table
            .filter(interventions::intervention_id.eq(intervention_id))
            .filter(interventions::ended_at.is_null()),
    )
    .set((
        interventions::ended_at.eq(Some(format_timestamp(ended_at))),
        interventions::status.eq(InterventionStatus::Termine.as_str()),
    ))
    .execute(conn)?;
    expect_one_row(rows, "intervention", intervention_id)
}

fn insert_satisfaction(
    conn: &mut SqliteConnection,
    satisfaction: &NewSatisfaction,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(satisfactions::table)
        .values((
            satisfactions::ticket_id.eq(satisfaction.ticket_id),
            satisfactions::rating.eq(i32::from(satisfaction.rating.value())),
            satisfactions::comment.eq(satisfaction.comment.as_deref()),
            satisfactions::created_at.eq(format_timestamp(satisfaction.created_at)),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_message(
    conn: &mut SqliteConnection,
    message: &NewMessage,
) -> Result<i64, PersistenceError> {
    let attachments_json: String = serde_json::to_string(&message.attachments)?;
    // Creation times are non-decreasing in acceptance order within a conversation.
    let latest: Option<String> = messages::table
        .filter(messages::conversation_id.eq(message.conversation_id.to_string()))
        .order(messages::message_id.desc())
        .select(messages::created_at)
        .first(conn)
        .optional()?;
    let created_at = match latest {
        Some(latest) => message.created_at.max(parse_timestamp(&latest)?),
        None => message.created_at,
    };
    diesel::insert_into(messages::table)
        .values((
            messages::conversation_id.eq(message.conversation_id.to_string()),
            messages::sender_id.eq(message.sender_id),
            messages::receiver_id.eq(message.receiver_id),
            messages::body.eq(&message.body),
            messages::attachments_json.eq(attachments_json),
            messages::created_at.eq(format_timestamp(created_at)),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_address(
    conn: &mut SqliteConnection,
    address: &NewAddress,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(addresses::table)
        .values((
            addresses::line1.eq(&address.line1),
            addresses::line2.eq(address.line2.as_deref()),
            addresses::postal_code.eq(&address.postal_code),
            addresses::city.eq(&address.city),
            addresses::country.eq(address.country.as_deref()),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_client(conn: &mut SqliteConnection, client: &NewClient) -> Result<i64, PersistenceError> {
    diesel::insert_into(clients::table)
        .values((
            clients::name.eq(&client.name),
            clients::contact_name.eq(client.contact.name.as_deref()),
            clients::contact_email.eq(client.contact.email.as_deref()),
            clients::contact_phone.eq(client.contact.phone.as_deref()),
            clients::comment.eq(client.comment.as_deref()),
            clients::address_id.eq(client.address_id),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_representative(
    conn: &mut SqliteConnection,
    representative: &NewRepresentative,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(representatives::table)
        .values((
            representatives::client_id.eq(representative.client_id),
            representatives::name.eq(&representative.name),
            representatives::function.eq(representative.function.as_deref()),
            representatives::email.eq(representative.email.as_deref()),
            representatives::phone.eq(representative.phone.as_deref()),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn update_representative(
    conn: &mut SqliteConnection,
    representative: &Representative,
) -> Result<(), PersistenceError> {
    let id: i64 = representative.representative_id;
    let rows: usize =
        diesel::update(representatives::table.filter(representatives::representative_id.eq(id)))
            .set((
                representatives::name.eq(&representative.name),
                representatives::function.eq(representative.function.as_deref()),
                representatives::email.eq(representative.email.as_deref()),
                representatives::phone.eq(representative.phone.as_deref()),
            ))
            .execute(conn)?;
    expect_existing(rows, "representative", id)
}

fn delete_representative(
    conn: &mut SqliteConnection,
    representative_id: i64,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::delete(
        representatives::table.filter(representatives::representative_id.eq(representative_id)),
    )
    .execute(conn)?;
    expect_existing(rows, "representative", representative_id)
}

fn insert_user(conn: &mut SqliteConnection, user: &NewUser) -> Result<i64, PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::login.eq(&user.login),
            users::display_name.eq(&user.display_name),
            users::role.eq(user.role.as_str()),
            users::client_id.eq(user.client_id),
            users::matricule.eq(user.matricule.as_deref()),
            users::email.eq(user.email.as_deref()),
            users::phone.eq(user.phone.as_deref()),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_site(conn: &mut SqliteConnection, site: &NewSite) -> Result<i64, PersistenceError> {
    diesel::insert_into(sites::table)
        .values((
            sites::client_id.eq(site.client_id),
            sites::name.eq(&site.name),
            sites::address_id.eq(site.address_id),
            sites::status.eq(site.status.as_str()),
            sites::responsible_agent_id.eq(site.responsible_agent_id),
            sites::comment.eq(site.comment.as_deref()),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn update_site(conn: &mut SqliteConnection, site: &Site) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(sites::table.filter(sites::site_id.eq(site.site_id)))
        .set((
            sites::client_id.eq(site.client_id),
            sites::name.eq(&site.name),
            sites::address_id.eq(site.address_id),
            sites::status.eq(site.status.as_str()),
            sites::responsible_agent_id.eq(site.responsible_agent_id),
            sites::comment.eq(site.comment.as_deref()),
        ))
        .execute(conn)?;
    expect_existing(rows, "site", site.site_id)
}

fn import_sites(
    conn: &mut SqliteConnection,
    client_id: i64,
    imported: &[ImportedSite],
) -> Result<Vec<i64>, PersistenceError> {
    let mut site_ids: Vec<i64> = Vec::with_capacity(imported.len());
    for row in imported {
        let address_id: i64 = insert_address(conn, &row.address)?;
        let site_id: i64 = insert_site(
            conn,
            &NewSite {
                client_id: Some(client_id),
                name: row.name.clone(),
                address_id: Some(address_id),
                status: SiteStatus::Active,
                responsible_agent_id: None,
                comment: row.comment.clone(),
            },
        )?;
        site_ids.push(site_id);
    }
    debug!(client_id, count = site_ids.len(), "Imported sites");
    Ok(site_ids)
}

fn insert_contract(
    conn: &mut SqliteConnection,
    contract: &NewContract,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(contracts::table)
        .values((
            contracts::client_id.eq(contract.client_id),
            contracts::title.eq(&contract.title),
            contracts::start_date.eq(format_date(contract.start_date)),
            contracts::end_date.eq(format_date(contract.end_date)),
            contracts::comment.eq(contract.comment.as_deref()),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_association(
    conn: &mut SqliteConnection,
    association: &NewAssociation,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(associations::table)
        .values((
            associations::title.eq(&association.title),
            associations::billing_email.eq(&association.billing_email),
            associations::address_id.eq(association.address_id),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_doe(conn: &mut SqliteConnection, doe: &NewDoe) -> Result<i64, PersistenceError> {
    diesel::insert_into(does::table)
        .values((does::site_id.eq(doe.site_id), does::title.eq(&doe.title)))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

fn insert_affaire(
    conn: &mut SqliteConnection,
    affaire: &NewAffaire,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(affaires::table)
        .values((
            affaires::title.eq(&affaire.title),
            affaires::client_id.eq(affaire.client_id),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

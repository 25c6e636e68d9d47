// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes read from the entity store and their conversion to domain types.
//!
//! Rows hold what the database holds: status strings and RFC 3339 text.
//! Conversion validates both and fails with `ReconstructionError` on
//! anything the domain does not recognize.

use diesel::prelude::*;
use fieldops_domain::{
    Address, Affaire, Assignment, Association, Attachment, Client, Contact, Contract, Demande,
    Doe, Intervention, Message, Rating, Representative, Satisfaction, Site, Ticket, User,
    parse_date, parse_timestamp,
};
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{
    addresses, affaires, associations, audit_events, clients, contracts, demandes, does,
    interventions, messages, representatives, satisfactions, sites, tickets, users,
};
use crate::error::PersistenceError;

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<time::OffsetDateTime>, PersistenceError> {
    Ok(value.map(parse_timestamp).transpose()?)
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = addresses)]
pub struct AddressRow {
    pub address_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: Option<String>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            address_id: row.address_id,
            line1: row.line1,
            line2: row.line2,
            postal_code: row.postal_code,
            city: row.city,
            country: row.country,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = clients)]
pub struct ClientRow {
    pub client_id: i64,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub comment: Option<String>,
    pub address_id: Option<i64>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            client_id: row.client_id,
            name: row.name,
            contact: Contact {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            comment: row.comment,
            address_id: row.address_id,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = representatives)]
pub struct RepresentativeRow {
    pub representative_id: i64,
    pub client_id: i64,
    pub name: String,
    pub function: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<RepresentativeRow> for Representative {
    fn from(row: RepresentativeRow) -> Self {
        Self {
            representative_id: row.representative_id,
            client_id: row.client_id,
            name: row.name,
            function: row.function,
            email: row.email,
            phone: row.phone,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub user_id: i64,
    pub login: String,
    pub display_name: String,
    pub role: String,
    pub client_id: Option<i64>,
    pub matricule: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            login: row.login,
            display_name: row.display_name,
            role: row.role.parse()?,
            client_id: row.client_id,
            matricule: row.matricule,
            email: row.email,
            phone: row.phone,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = sites)]
pub struct SiteRow {
    pub site_id: i64,
    pub client_id: Option<i64>,
    pub name: String,
    pub address_id: Option<i64>,
    pub status: String,
    pub responsible_agent_id: Option<i64>,
    pub comment: Option<String>,
}

impl TryFrom<SiteRow> for Site {
    type Error = PersistenceError;

    fn try_from(row: SiteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            site_id: row.site_id,
            client_id: row.client_id,
            name: row.name,
            address_id: row.address_id,
            status: row.status.parse()?,
            responsible_agent_id: row.responsible_agent_id,
            comment: row.comment,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = contracts)]
pub struct ContractRow {
    pub contract_id: i64,
    pub client_id: i64,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub comment: Option<String>,
}

impl TryFrom<ContractRow> for Contract {
    type Error = PersistenceError;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        Ok(Self {
            contract_id: row.contract_id,
            client_id: row.client_id,
            title: row.title,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            comment: row.comment,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = associations)]
pub struct AssociationRow {
    pub association_id: i64,
    pub title: String,
    pub billing_email: String,
    pub address_id: Option<i64>,
}

impl From<AssociationRow> for Association {
    fn from(row: AssociationRow) -> Self {
        Self {
            association_id: row.association_id,
            title: row.title,
            billing_email: row.billing_email,
            address_id: row.address_id,
        }
    }
}

/// A `(user_id, kind, role_label)` join row, shared by ticket and
/// association assignments.
pub type AssignmentRow = (i64, String, Option<String>);

/// Converts an assignment join row.
///
/// # Errors
///
/// Returns an error if the stored kind is unknown.
pub fn assignment_from_row(row: AssignmentRow) -> Result<Assignment, PersistenceError> {
    let (user_id, kind, role_label) = row;
    Ok(Assignment {
        user_id,
        kind: kind.parse()?,
        role_label,
    })
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = does)]
pub struct DoeRow {
    pub doe_id: i64,
    pub site_id: i64,
    pub title: String,
}

impl From<DoeRow> for Doe {
    fn from(row: DoeRow) -> Self {
        Self {
            doe_id: row.doe_id,
            site_id: row.site_id,
            title: row.title,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = affaires)]
pub struct AffaireRow {
    pub affaire_id: i64,
    pub title: String,
    pub client_id: Option<i64>,
}

impl From<AffaireRow> for Affaire {
    fn from(row: AffaireRow) -> Self {
        Self {
            affaire_id: row.affaire_id,
            title: row.title,
            client_id: row.client_id,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = demandes)]
pub struct DemandeRow {
    pub demande_id: i64,
    pub client_id: i64,
    pub site_id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub ticket_id: Option<i64>,
}

impl TryFrom<DemandeRow> for Demande {
    type Error = PersistenceError;

    fn try_from(row: DemandeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            demande_id: row.demande_id,
            client_id: row.client_id,
            site_id: row.site_id,
            title: row.title,
            description: row.description,
            status: row.status.parse()?,
            created_at: parse_timestamp(&row.created_at)?,
            ticket_id: row.ticket_id,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tickets)]
pub struct TicketRow {
    pub ticket_id: i64,
    pub title: String,
    pub description: String,
    pub site_id: i64,
    pub demande_id: Option<i64>,
    pub affaire_id: Option<i64>,
    pub doe_id: Option<i64>,
    pub state: String,
    pub responsable_id: Option<i64>,
    pub started_at: String,
    pub ended_at: Option<String>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = PersistenceError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            ticket_id: row.ticket_id,
            title: row.title,
            description: row.description,
            site_id: row.site_id,
            demande_id: row.demande_id,
            affaire_id: row.affaire_id,
            doe_id: row.doe_id,
            state: row.state.parse()?,
            responsable_id: row.responsable_id,
            started_at: parse_timestamp(&row.started_at)?,
            ended_at: parse_optional_timestamp(row.ended_at.as_deref())?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = interventions)]
pub struct InterventionRow {
    pub intervention_id: i64,
    pub ticket_id: i64,
    pub description: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub status: String,
    pub previous_intervention_id: Option<i64>,
}

impl TryFrom<InterventionRow> for Intervention {
    type Error = PersistenceError;

    fn try_from(row: InterventionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            intervention_id: row.intervention_id,
            ticket_id: row.ticket_id,
            description: row.description,
            started_at: parse_timestamp(&row.started_at)?,
            ended_at: parse_optional_timestamp(row.ended_at.as_deref())?,
            status: row.status.parse()?,
            previous_intervention_id: row.previous_intervention_id,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = satisfactions)]
pub struct SatisfactionRow {
    pub satisfaction_id: i64,
    pub ticket_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl TryFrom<SatisfactionRow> for Satisfaction {
    type Error = PersistenceError;

    fn try_from(row: SatisfactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            satisfaction_id: row.satisfaction_id,
            ticket_id: row.ticket_id,
            rating: Rating::new(i64::from(row.rating))?,
            comment: row.comment,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = messages)]
pub struct MessageRow {
    pub message_id: i64,
    pub conversation_id: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub attachments_json: String,
    pub created_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = PersistenceError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let attachments: Vec<Attachment> = serde_json::from_str(&row.attachments_json)?;
        Ok(Self {
            message_id: row.message_id,
            conversation_id: row.conversation_id.parse()?,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            body: row.body,
            created_at: parse_timestamp(&row.created_at)?,
            attachments,
        })
    }
}

/// Full audit event row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub entity_kind: String,
    pub entity_id: i64,
    pub actor_user_id: i64,
    pub actor_login: String,
    pub actor_role: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot: String,
    pub after_snapshot: String,
    pub created_at: String,
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Validated changes ready to be written by the entity store.
//!
//! A `Mutation` is data only. The store applies it inside one transaction
//! together with its audit event.

use fieldops_domain::{
    AssignmentKind, Attachment, Contact, ConversationId, DemandeStatus,
    InterventionStatus, Rating, Representative, Site, SiteStatus, TicketState, UserRole,
};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDemande {
    pub client_id: i64,
    pub site_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub site_id: i64,
    pub demande_id: Option<i64>,
    pub affaire_id: i64,
    pub doe_id: i64,
    pub state: TicketState,
    pub responsable_id: Option<i64>,
    pub started_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIntervention {
    pub ticket_id: i64,
    pub description: String,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    pub status: InterventionStatus,
    pub previous_intervention_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSatisfaction {
    pub ticket_id: i64,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub contact: Contact,
    pub comment: Option<String>,
    pub address_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepresentative {
    pub client_id: i64,
    pub name: String,
    pub function: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub display_name: String,
    pub role: UserRole,
    pub client_id: Option<i64>,
    pub matricule: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSite {
    pub client_id: Option<i64>,
    pub name: String,
    pub address_id: Option<i64>,
    pub status: SiteStatus,
    pub responsible_agent_id: Option<i64>,
    pub comment: Option<String>,
}

/// A site row created by a bulk import, with its address inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSite {
    pub name: String,
    pub address: NewAddress,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub client_id: i64,
    pub title: String,
    pub start_date: Date,
    pub end_date: Date,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssociation {
    pub title: String,
    pub billing_email: String,
    pub address_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoe {
    pub site_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAffaire {
    pub title: String,
    pub client_id: Option<i64>,
}

/// A validated change to the entity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateDemande(NewDemande),
    /// Rewrites the editable fields and status of a demande.
    ///
    /// Applied only while the demande has no ticket.
    UpdateDemande {
        demande_id: i64,
        title: String,
        description: String,
        site_id: i64,
        status: DemandeStatus,
    },
    /// Creates the ticket and links it to the demande.
    ///
    /// Applied only while the demande has no ticket; the demande moves to
    /// `InProgress`.
    ConvertDemande {
        demande_id: i64,
        ticket: NewTicket,
    },
    CreateTicket(NewTicket),
    /// Changes the stored state and end time of a ticket, and optionally the
    /// status of the demande it came from.
    UpdateTicketState {
        ticket_id: i64,
        state: TicketState,
        ended_at: Option<OffsetDateTime>,
        demande: Option<(i64, DemandeStatus)>,
    },
    /// Inserts the join row unless it already exists.
    AssignToTicket {
        ticket_id: i64,
        user_id: i64,
        kind: AssignmentKind,
        role_label: Option<String>,
        /// Also record the user as the ticket's primary responsable.
        set_primary_responsable: bool,
    },
    CreateIntervention(NewIntervention),
    /// Applied only while the intervention has no end time.
    CloseIntervention {
        intervention_id: i64,
        ended_at: OffsetDateTime,
    },
    CreateSatisfaction(NewSatisfaction),
    AppendMessage(NewMessage),
    CreateAddress(NewAddress),
    CreateClient(NewClient),
    CreateRepresentative(NewRepresentative),
    UpdateRepresentative(Representative),
    DeleteRepresentative {
        representative_id: i64,
    },
    CreateUser(NewUser),
    CreateSite(NewSite),
    UpdateSite(Site),
    /// Creates every site with its address for one client.
    ImportSites {
        client_id: i64,
        sites: Vec<ImportedSite>,
    },
    CreateContract(NewContract),
    LinkContractSite {
        contract_id: i64,
        site_id: i64,
    },
    CreateAssociation(NewAssociation),
    LinkAssociationSite {
        association_id: i64,
        site_id: i64,
    },
    AssignToAssociation {
        association_id: i64,
        user_id: i64,
        kind: AssignmentKind,
        role_label: Option<String>,
    },
    CreateDoe(NewDoe),
    CreateAffaire(NewAffaire),
}

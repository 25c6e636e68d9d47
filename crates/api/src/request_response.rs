// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps travel as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. Collections in responses are always arrays.
//!
//! Field names are English. Requests also accept the French names used by
//! existing front ends (`titre`, `agent_matricule`, `note`, `commentaire`,
//! `date_debut`, `date_fin`); responses only ever use the English ones.

use fieldops_domain::{
    Address, Affaire, Association, Attachment, Client, Contract, Demande, Doe, Elapsed,
    Intervention, Message, Representative, Satisfaction, Site, Ticket, User, format_date,
    format_timestamp,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Demandes
// ============================================================================

/// API request to file a demande.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDemandeRequest {
    /// The client the demande is filed for.
    pub client_id: i64,
    /// The site concerned; must belong to the client.
    pub site_id: i64,
    #[serde(alias = "titre")]
    pub title: String,
    pub description: String,
}

/// API request to edit a demande that has not been converted yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EditDemandeRequest {
    #[serde(default, alias = "titre")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site_id: Option<i64>,
}

/// API request to convert a demande into a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConvertDemandeRequest {
    /// Ticket title; defaults to the demande's title.
    #[serde(default, alias = "titre")]
    pub title: Option<String>,
    /// Ticket description; defaults to the demande's description.
    #[serde(default)]
    pub description: Option<String>,
    pub affaire_id: i64,
    pub doe_id: i64,
    /// RFC 3339 start instant; defaults to the conversion time.
    #[serde(default)]
    pub started_at: Option<String>,
}

/// API response for a conversion.
///
/// A retried conversion answers with the ticket created the first time and
/// `already_converted` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertDemandeResponse {
    pub demande_id: i64,
    pub ticket_id: i64,
    pub already_converted: bool,
    /// The audit event of the conversion, absent on a retry.
    pub event_id: Option<i64>,
    pub message: String,
}

// ============================================================================
// Tickets
// ============================================================================

/// API request to open a ticket directly, without a demande.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTicketRequest {
    #[serde(alias = "titre")]
    pub title: String,
    pub description: String,
    pub site_id: i64,
    pub affaire_id: i64,
    pub doe_id: i64,
    #[serde(default)]
    pub started_at: Option<String>,
}

/// API request to move a ticket to another state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransitionTicketRequest {
    /// Target state (`Pas_commence`, `En_attente`, `En_cours`, `Bloque`, `Termine`).
    pub state: String,
}

/// API request to finish a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FinishTicketRequest {
    /// RFC 3339 end instant; defaults to now.
    #[serde(default)]
    pub ended_at: Option<String>,
}

/// API request to assign a responsable or an agent by matricule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignRequest {
    #[serde(alias = "agent_matricule")]
    pub matricule: String,
    /// Free-text role, e.g. "chef d'équipe".
    #[serde(default)]
    pub role_label: Option<String>,
}

/// API request to rate a finished ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitSatisfactionRequest {
    /// 1..=5; range-checked by the domain.
    #[serde(alias = "note")]
    pub rating: i64,
    #[serde(default, alias = "commentaire")]
    pub comment: Option<String>,
}

/// API response for a satisfaction submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitSatisfactionResponse {
    pub satisfaction: SatisfactionInfo,
    /// True when an identical submission had already been recorded.
    pub already_submitted: bool,
}

/// API response carrying one ticket after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResponse {
    pub ticket: TicketInfo,
    pub event_id: i64,
}

// ============================================================================
// Interventions
// ============================================================================

/// API request to record an intervention on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateInterventionRequest {
    pub ticket_id: i64,
    pub description: String,
    #[serde(alias = "date_debut")]
    pub started_at: String,
    #[serde(default, alias = "date_fin")]
    pub ended_at: Option<String>,
    /// Defaults to `En_cours`, or `Termine` when `ended_at` is given.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub previous_intervention_id: Option<i64>,
}

/// API request to close an open intervention.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CloseInterventionRequest {
    /// RFC 3339 end instant; defaults to now.
    #[serde(default)]
    pub ended_at: Option<String>,
}

/// API response carrying one intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionResponse {
    pub intervention: InterventionInfo,
    pub event_id: i64,
}

// ============================================================================
// Messaging
// ============================================================================

/// API request to post a message to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostMessageRequest {
    /// Inferred from the conversation when omitted.
    #[serde(default)]
    pub receiver_id: Option<i64>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// API response listing a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub messages: Vec<MessageInfo>,
}

// ============================================================================
// Directory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAddressRequest {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub address_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRepresentativeRequest {
    pub name: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UpdateRepresentativeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    pub login: String,
    pub display_name: String,
    /// `admin`, `agent` or `client`.
    pub role: String,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub matricule: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub address_id: Option<i64>,
    /// `active` (default) or `inactive`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub responsible_agent_id: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UpdateSiteRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub address_id: Option<i64>,
    #[serde(default)]
    pub responsible_agent_id: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// API request to import sites for a client from CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportSitesRequest {
    pub csv_content: String,
    /// Only validate and report, create nothing.
    #[serde(default)]
    pub preview_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateContractRequest {
    pub client_id: i64,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// API request to link a site to a contract or an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkSiteRequest {
    pub site_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAssociationRequest {
    pub title: String,
    pub billing_email: String,
    #[serde(default)]
    pub address_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDoeRequest {
    pub site_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAffaireRequest {
    pub title: String,
    #[serde(default)]
    pub client_id: Option<i64>,
}

/// API response for any successful creation or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// The entity created or changed.
    pub id: i64,
    /// The audit event recording the change; absent when the request
    /// changed nothing.
    pub event_id: Option<i64>,
    pub message: String,
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: Option<String>,
    /// Single-line rendering for display.
    pub formatted: String,
}

impl From<&Address> for AddressInfo {
    fn from(address: &Address) -> Self {
        Self {
            address_id: address.address_id,
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            postal_code: address.postal_code.clone(),
            city: address.city.clone(),
            country: address.country.clone(),
            formatted: address.one_line(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: i64,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub comment: Option<String>,
    pub address_id: Option<i64>,
}

impl From<&Client> for ClientInfo {
    fn from(client: &Client) -> Self {
        Self {
            client_id: client.client_id,
            name: client.name.clone(),
            contact_name: client.contact.name.clone(),
            contact_email: client.contact.email.clone(),
            contact_phone: client.contact.phone.clone(),
            comment: client.comment.clone(),
            address_id: client.address_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeInfo {
    pub representative_id: i64,
    pub client_id: i64,
    pub name: String,
    pub function: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Representative> for RepresentativeInfo {
    fn from(rep: &Representative) -> Self {
        Self {
            representative_id: rep.representative_id,
            client_id: rep.client_id,
            name: rep.name.clone(),
            function: rep.function.clone(),
            email: rep.email.clone(),
            phone: rep.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub login: String,
    pub display_name: String,
    pub role: String,
    pub client_id: Option<i64>,
    pub matricule: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            login: user.login.clone(),
            display_name: user.display_name.clone(),
            role: user.role.to_string(),
            client_id: user.client_id,
            matricule: user.matricule.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub site_id: i64,
    pub client_id: Option<i64>,
    pub name: String,
    pub address_id: Option<i64>,
    pub status: String,
    pub responsible_agent_id: Option<i64>,
    pub comment: Option<String>,
    /// True while any ticket on the site is not `Termine`.
    pub has_open_ticket: bool,
}

impl SiteInfo {
    #[must_use]
    pub fn new(site: &Site, has_open_ticket: bool) -> Self {
        Self {
            site_id: site.site_id,
            client_id: site.client_id,
            name: site.name.clone(),
            address_id: site.address_id,
            status: site.status.to_string(),
            responsible_agent_id: site.responsible_agent_id,
            comment: site.comment.clone(),
            has_open_ticket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub contract_id: i64,
    pub client_id: i64,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub comment: Option<String>,
    /// Whether the contract covers the day of the request.
    pub active: bool,
}

impl ContractInfo {
    #[must_use]
    pub fn new(contract: &Contract, now: OffsetDateTime) -> Self {
        Self {
            contract_id: contract.contract_id,
            client_id: contract.client_id,
            title: contract.title.clone(),
            start_date: format_date(contract.start_date),
            end_date: format_date(contract.end_date),
            comment: contract.comment.clone(),
            active: contract.covers(now.date()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationInfo {
    pub association_id: i64,
    pub title: String,
    pub billing_email: String,
    pub address_id: Option<i64>,
}

impl From<&Association> for AssociationInfo {
    fn from(association: &Association) -> Self {
        Self {
            association_id: association.association_id,
            title: association.title.clone(),
            billing_email: association.billing_email.clone(),
            address_id: association.address_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoeInfo {
    pub doe_id: i64,
    pub site_id: i64,
    pub title: String,
}

impl From<&Doe> for DoeInfo {
    fn from(doe: &Doe) -> Self {
        Self {
            doe_id: doe.doe_id,
            site_id: doe.site_id,
            title: doe.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffaireInfo {
    pub affaire_id: i64,
    pub title: String,
    pub client_id: Option<i64>,
}

impl From<&Affaire> for AffaireInfo {
    fn from(affaire: &Affaire) -> Self {
        Self {
            affaire_id: affaire.affaire_id,
            title: affaire.title.clone(),
            client_id: affaire.client_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandeInfo {
    pub demande_id: i64,
    pub client_id: i64,
    pub site_id: i64,
    pub title: String,
    pub description: String,
    /// Stable status code (`pending`, `in_progress`, ...).
    pub status: String,
    /// Status label shown to clients.
    pub status_label: String,
    pub created_at: String,
    pub ticket_id: Option<i64>,
    /// True once converted; the demande can no longer be edited.
    pub locked: bool,
}

impl From<&Demande> for DemandeInfo {
    fn from(demande: &Demande) -> Self {
        Self {
            demande_id: demande.demande_id,
            client_id: demande.client_id,
            site_id: demande.site_id,
            title: demande.title.clone(),
            description: demande.description.clone(),
            status: String::from(demande.status.as_str()),
            status_label: String::from(demande.status.label()),
            created_at: format_timestamp(demande.created_at),
            ticket_id: demande.ticket_id,
            locked: demande.is_locked(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInfo {
    pub ticket_id: i64,
    pub title: String,
    pub description: String,
    pub site_id: i64,
    pub demande_id: Option<i64>,
    pub affaire_id: Option<i64>,
    pub doe_id: Option<i64>,
    /// The state as persisted.
    pub stored_state: String,
    /// The state to show: `En_cours` once work has been recorded on a
    /// ticket still stored as `Pas_commence`.
    pub displayed_state: String,
    pub responsable_id: Option<i64>,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub intervention_count: usize,
}

impl TicketInfo {
    #[must_use]
    pub fn new(ticket: &Ticket, intervention_count: usize) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            site_id: ticket.site_id,
            demande_id: ticket.demande_id,
            affaire_id: ticket.affaire_id,
            doe_id: ticket.doe_id,
            stored_state: ticket.state.to_string(),
            displayed_state: ticket.displayed_state(intervention_count).to_string(),
            responsable_id: ticket.responsable_id,
            started_at: format_timestamp(ticket.started_at),
            ended_at: ticket.ended_at.map(format_timestamp),
            intervention_count,
        }
    }
}

/// Elapsed time split into components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedInfo {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub total_seconds: i64,
}

impl From<Elapsed> for ElapsedInfo {
    fn from(elapsed: Elapsed) -> Self {
        Self {
            days: elapsed.days,
            hours: elapsed.hours,
            minutes: elapsed.minutes,
            total_seconds: elapsed.duration.whole_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionInfo {
    pub intervention_id: i64,
    pub ticket_id: i64,
    pub description: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub status: String,
    pub previous_intervention_id: Option<i64>,
    /// Computed at read time; runs against the request instant while open.
    pub elapsed: ElapsedInfo,
}

impl InterventionInfo {
    #[must_use]
    pub fn new(intervention: &Intervention, now: OffsetDateTime) -> Self {
        Self {
            intervention_id: intervention.intervention_id,
            ticket_id: intervention.ticket_id,
            description: intervention.description.clone(),
            started_at: format_timestamp(intervention.started_at),
            ended_at: intervention.ended_at.map(format_timestamp),
            status: intervention.status.to_string(),
            previous_intervention_id: intervention.previous_intervention_id,
            elapsed: fieldops_domain::elapsed_at(
                intervention.started_at,
                intervention.ended_at,
                now,
            )
            .into(),
        }
    }
}

/// A user assigned to a ticket or an association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    pub user: UserInfo,
    pub kind: String,
    pub role_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionInfo {
    pub satisfaction_id: i64,
    pub ticket_id: i64,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<&Satisfaction> for SatisfactionInfo {
    fn from(satisfaction: &Satisfaction) -> Self {
        Self {
            satisfaction_id: satisfaction.satisfaction_id,
            ticket_id: satisfaction.ticket_id,
            rating: satisfaction.rating.value(),
            comment: satisfaction.comment.clone(),
            created_at: format_timestamp(satisfaction.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub message_id: i64,
    pub conversation_id: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub created_at: String,
    pub attachments: Vec<Attachment>,
}

impl From<&Message> for MessageInfo {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.message_id,
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            body: message.body.clone(),
            created_at: format_timestamp(message.created_at),
            attachments: message.attachments.clone(),
        }
    }
}

/// One audit timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    pub event_id: Option<i64>,
    pub entity_kind: String,
    pub entity_id: Option<i64>,
    pub actor_login: String,
    pub actor_role: String,
    pub cause_id: String,
    pub action: String,
    pub details: Option<String>,
    pub before: String,
    pub after: String,
    pub occurred_at: String,
}

impl From<&fieldops_audit::AuditEvent> for AuditEventInfo {
    fn from(event: &fieldops_audit::AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            entity_kind: event.entity.kind.to_string(),
            entity_id: event.entity.id,
            actor_login: event.actor.login.clone(),
            actor_role: event.actor.role.to_string(),
            cause_id: event.cause.id.clone(),
            action: event.action.name.clone(),
            details: event.action.details.clone(),
            before: event.before.data.clone(),
            after: event.after.data.clone(),
            occurred_at: format_timestamp(event.occurred_at),
        }
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// A site with everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRelations {
    pub site: SiteInfo,
    pub address: Option<AddressInfo>,
    pub tickets: Vec<TicketInfo>,
    pub representatives: Vec<RepresentativeInfo>,
    pub client: Option<ClientInfo>,
    pub contracts: Vec<ContractInfo>,
}

/// A ticket with everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRelations {
    pub ticket: TicketInfo,
    pub site: SiteInfo,
    pub demandes: Vec<DemandeInfo>,
    pub interventions: Vec<InterventionInfo>,
    pub responsables: Vec<AssignmentInfo>,
    pub agents_assignes: Vec<AssignmentInfo>,
    pub doe: Option<DoeInfo>,
    pub affaire: Option<AffaireInfo>,
    pub satisfaction: Option<SatisfactionInfo>,
}

/// A client with everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRelations {
    pub client: ClientInfo,
    pub address: Option<AddressInfo>,
    pub sites: Vec<SiteInfo>,
    pub demandes: Vec<DemandeInfo>,
    pub representatives: Vec<RepresentativeInfo>,
    pub contracts: Vec<ContractInfo>,
}

/// API response listing tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketListResponse {
    pub tickets: Vec<TicketInfo>,
}

/// API response listing demandes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandeListResponse {
    pub demandes: Vec<DemandeInfo>,
}

/// API response listing clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<ClientInfo>,
}

/// API response for an entity's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    pub entity_kind: String,
    pub entity_id: i64,
    pub events: Vec<AuditEventInfo>,
}

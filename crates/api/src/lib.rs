// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application layer of the field-service back-office.
//!
//! Sits between the HTTP server and the lifecycle engine: resolves the
//! calling actor, enforces role and ownership rules, loads what each
//! operation needs from the store, runs the engine, persists the outcome
//! and shapes the responses. Transport concerns (status codes, JSON
//! framing, sockets) stay in the server.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod csv_import;
mod error;
mod handlers;
mod lookup;
mod receiver;
mod relations;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, RequestContext};
pub use csv_import::{
    CsvRowStatus, SiteImportResult, SiteRowResult, import_sites_csv, preview_site_csv,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    assign_association, assign_to_ticket, cancel_demande, close_intervention, convert_demande,
    create_address, create_affaire, create_association, create_client, create_contract,
    create_demande, create_doe, create_intervention, create_representative, create_site,
    create_ticket, create_user, delete_representative, edit_demande, finish_ticket,
    get_audit_timeline, link_association_site, link_contract_site, list_clients,
    list_conversation, post_message, reject_demande, reopen_ticket, submit_satisfaction,
    transition_ticket, update_representative, update_site,
};
pub use receiver::{ConversationTarget, default_receiver, resolve_conversation};
pub use relations::{
    get_client_relations, get_site_relations, get_ticket_relations, list_open_tickets,
    list_pending_demandes,
};
pub use request_response::{
    AddressInfo, AffaireInfo, AssignRequest, AssignmentInfo, AssociationInfo, AuditEventInfo,
    AuditTimelineResponse, ClientInfo, ClientListResponse, ClientRelations,
    CloseInterventionRequest, ContractInfo, ConversationResponse, ConvertDemandeRequest,
    ConvertDemandeResponse, CreateAddressRequest, CreateAffaireRequest, CreateAssociationRequest,
    CreateClientRequest, CreateContractRequest, CreateDemandeRequest, CreateDoeRequest,
    CreateInterventionRequest, CreateRepresentativeRequest, CreateSiteRequest,
    CreateTicketRequest, CreateUserRequest, DemandeInfo, DemandeListResponse, DoeInfo,
    EditDemandeRequest, ElapsedInfo, FinishTicketRequest, ImportSitesRequest, InterventionInfo,
    InterventionResponse, LinkSiteRequest, MessageInfo, MutationResponse, PostMessageRequest,
    RepresentativeInfo, SatisfactionInfo, SiteInfo, SiteRelations, SubmitSatisfactionRequest,
    SubmitSatisfactionResponse, TicketInfo, TicketListResponse, TicketRelations, TicketResponse,
    TransitionTicketRequest, UpdateRepresentativeRequest, UpdateSiteRequest, UserInfo,
};

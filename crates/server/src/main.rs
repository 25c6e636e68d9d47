// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use fieldops::{LifecyclePolicy, NewUser, OperationContext, create_user as engine_create_user};
use fieldops_api::{
    ApiError, AssignRequest, AuditTimelineResponse, ClientListResponse, ClientRelations,
    CloseInterventionRequest, ConversationResponse, ConvertDemandeRequest, ConvertDemandeResponse,
    CreateAddressRequest, CreateAffaireRequest, CreateAssociationRequest, CreateClientRequest,
    CreateContractRequest, CreateDemandeRequest, CreateDoeRequest, CreateInterventionRequest,
    CreateRepresentativeRequest, CreateSiteRequest, CreateTicketRequest, CreateUserRequest,
    DemandeListResponse, EditDemandeRequest, FinishTicketRequest, ImportSitesRequest,
    InterventionResponse, LinkSiteRequest, MessageInfo, MutationResponse, PostMessageRequest,
    RequestContext, SiteImportResult, SiteRelations, SubmitSatisfactionRequest,
    SubmitSatisfactionResponse, TicketListResponse, TicketRelations, TicketResponse,
    TransitionTicketRequest, UpdateRepresentativeRequest, UpdateSiteRequest,
};
use fieldops_audit::{Actor, Cause};
use fieldops_domain::{AssignmentKind, UserRole};
use fieldops_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::session::SessionActor;

/// Field-service back-office server: demandes, tickets, interventions and
/// messaging over JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Allow reopening finished tickets (`Termine -> En_cours`)
    #[arg(long)]
    allow_ticket_reopen: bool,

    /// Allow recording interventions on finished tickets
    #[arg(long)]
    allow_intervention_changes_after_close: bool,

    /// Create an admin with this login at startup if it does not exist
    #[arg(long)]
    bootstrap_admin: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The store; one writer at a time.
    persistence: Arc<Mutex<Persistence>>,
    /// Operator switches for reopening and post-close edits.
    policy: LifecyclePolicy,
    live: Arc<LiveEventBroadcaster>,
}

impl AppState {
    fn new(persistence: Persistence, policy: LifecyclePolicy) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            policy,
            live: Arc::new(LiveEventBroadcaster::new()),
        }
    }

    /// Runs one application operation with the store locked.
    async fn with_store<T>(
        &self,
        operation: impl FnOnce(&mut Persistence) -> Result<T, ApiError>,
    ) -> Result<T, HttpError> {
        let mut persistence = self.persistence.lock().await;
        let result = operation(&mut persistence);
        drop(persistence);
        result.map_err(HttpError::from)
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    error: bool,
    /// Stable error category (`validation`, `not_found`, `locked`, ...).
    kind: String,
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: String::from(self.kind),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } | ApiError::InvalidCsvFormat { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            ApiError::Locked { .. } => StatusCode::LOCKED,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

type Created<T> = (StatusCode, Json<T>);

const fn created<T>(body: T) -> Created<T> {
    (StatusCode::CREATED, Json(body))
}

/// 201 for a write, 200 when the request matched what was already stored.
fn created_unless_unchanged(response: MutationResponse) -> Created<MutationResponse> {
    if response.event_id.is_none() {
        return (StatusCode::OK, Json(response));
    }
    created(response)
}

/// Query parameters for `GET /tickets/open`.
#[derive(Debug, Deserialize)]
struct OpenTicketsQuery {
    site_id: Option<i64>,
}

/// Query parameters for `GET /demandes/pending`.
#[derive(Debug, Deserialize)]
struct PendingDemandesQuery {
    client_id: Option<i64>,
}

// ============================================================================
// Demandes
// ============================================================================

async fn handle_create_demande(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateDemandeRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        client_id = req.client_id,
        site_id = req.site_id,
        "Handling create_demande request"
    );
    let client_id = req.client_id;
    let response = app_state
        .with_store(|p| fieldops_api::create_demande(p, &ctx, req))
        .await?;
    app_state.live.broadcast(&LiveEvent::DemandeCreated {
        demande_id: response.id,
        client_id,
    });
    Ok(created(response))
}

async fn handle_edit_demande(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(demande_id): Path<i64>,
    Json(req): Json<EditDemandeRequest>,
) -> Result<Json<MutationResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, demande_id, "Handling edit_demande request");
    let response = app_state
        .with_store(|p| fieldops_api::edit_demande(p, &ctx, demande_id, req))
        .await?;
    app_state
        .live
        .broadcast(&LiveEvent::DemandeUpdated { demande_id });
    Ok(Json(response))
}

async fn handle_convert_demande(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(demande_id): Path<i64>,
    Json(req): Json<ConvertDemandeRequest>,
) -> Result<Created<ConvertDemandeResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, demande_id, "Handling convert_demande request");
    let response = app_state
        .with_store(|p| fieldops_api::convert_demande(p, &ctx, demande_id, req))
        .await?;
    if response.already_converted {
        return Ok((StatusCode::OK, Json(response)));
    }
    app_state.live.broadcast(&LiveEvent::DemandeConverted {
        demande_id,
        ticket_id: response.ticket_id,
    });
    Ok(created(response))
}

async fn handle_reject_demande(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(demande_id): Path<i64>,
) -> Result<Json<MutationResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, demande_id, "Handling reject_demande request");
    let response = app_state
        .with_store(|p| fieldops_api::reject_demande(p, &ctx, demande_id))
        .await?;
    app_state
        .live
        .broadcast(&LiveEvent::DemandeUpdated { demande_id });
    Ok(Json(response))
}

async fn handle_cancel_demande(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(demande_id): Path<i64>,
) -> Result<Json<MutationResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, demande_id, "Handling cancel_demande request");
    let response = app_state
        .with_store(|p| fieldops_api::cancel_demande(p, &ctx, demande_id))
        .await?;
    app_state
        .live
        .broadcast(&LiveEvent::DemandeUpdated { demande_id });
    Ok(Json(response))
}

async fn handle_list_pending_demandes(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Query(query): Query<PendingDemandesQuery>,
) -> Result<Json<DemandeListResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::list_pending_demandes(p, &ctx, query.client_id))
        .await?;
    Ok(Json(response))
}

// ============================================================================
// Tickets
// ============================================================================

fn broadcast_state(app_state: &AppState, response: &TicketResponse) {
    app_state.live.broadcast(&LiveEvent::TicketStateChanged {
        ticket_id: response.ticket.ticket_id,
        state: response.ticket.stored_state.clone(),
    });
}

async fn handle_create_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, site_id = req.site_id, "Handling create_ticket request");
    let response = app_state
        .with_store(|p| fieldops_api::create_ticket(p, &ctx, req))
        .await?;
    app_state.live.broadcast(&LiveEvent::TicketCreated {
        ticket_id: response.id,
    });
    Ok(created(response))
}

async fn handle_list_open_tickets(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Query(query): Query<OpenTicketsQuery>,
) -> Result<Json<TicketListResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::list_open_tickets(p, &ctx, query.site_id))
        .await?;
    Ok(Json(response))
}

async fn handle_ticket_relations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
) -> Result<Json<TicketRelations>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::get_ticket_relations(p, &ctx, ticket_id))
        .await?;
    Ok(Json(response))
}

async fn handle_transition_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
    Json(req): Json<TransitionTicketRequest>,
) -> Result<Json<TicketResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        ticket_id,
        target = %req.state,
        "Handling transition_ticket request"
    );
    let policy = app_state.policy;
    let response = app_state
        .with_store(|p| fieldops_api::transition_ticket(p, &ctx, ticket_id, &req, policy))
        .await?;
    broadcast_state(&app_state, &response);
    Ok(Json(response))
}

async fn handle_finish_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
    Json(req): Json<FinishTicketRequest>,
) -> Result<Json<TicketResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, ticket_id, "Handling finish_ticket request");
    let response = app_state
        .with_store(|p| fieldops_api::finish_ticket(p, &ctx, ticket_id, &req))
        .await?;
    broadcast_state(&app_state, &response);
    Ok(Json(response))
}

async fn handle_reopen_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
) -> Result<Json<TicketResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, ticket_id, "Handling reopen_ticket request");
    let policy = app_state.policy;
    let response = app_state
        .with_store(|p| fieldops_api::reopen_ticket(p, &ctx, ticket_id, policy))
        .await?;
    broadcast_state(&app_state, &response);
    Ok(Json(response))
}

async fn assign_ticket(
    app_state: &AppState,
    ctx: &RequestContext,
    ticket_id: i64,
    req: AssignRequest,
    kind: AssignmentKind,
) -> Result<Created<MutationResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        ticket_id,
        matricule = %req.matricule,
        kind = kind.as_str(),
        "Handling assign_to_ticket request"
    );
    let response = app_state
        .with_store(|p| fieldops_api::assign_to_ticket(p, ctx, ticket_id, req, kind))
        .await?;
    if response.event_id.is_some() {
        app_state
            .live
            .broadcast(&LiveEvent::TicketAssigned { ticket_id });
    }
    Ok(created_unless_unchanged(response))
}

async fn handle_assign_ticket_responsable(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    assign_ticket(&app_state, &ctx, ticket_id, req, AssignmentKind::Responsable).await
}

async fn handle_assign_ticket_agent(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    assign_ticket(&app_state, &ctx, ticket_id, req, AssignmentKind::Agent).await
}

async fn handle_submit_satisfaction(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(ticket_id): Path<i64>,
    Json(req): Json<SubmitSatisfactionRequest>,
) -> Result<Created<SubmitSatisfactionResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        ticket_id,
        rating = req.rating,
        "Handling submit_satisfaction request"
    );
    let response = app_state
        .with_store(|p| fieldops_api::submit_satisfaction(p, &ctx, ticket_id, req))
        .await?;
    if response.already_submitted {
        return Ok((StatusCode::OK, Json(response)));
    }
    app_state
        .live
        .broadcast(&LiveEvent::SatisfactionSubmitted { ticket_id });
    Ok(created(response))
}

// ============================================================================
// Interventions
// ============================================================================

async fn handle_create_intervention(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateInterventionRequest>,
) -> Result<Created<InterventionResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        ticket_id = req.ticket_id,
        "Handling create_intervention request"
    );
    let policy = app_state.policy;
    let response = app_state
        .with_store(|p| fieldops_api::create_intervention(p, &ctx, req, policy))
        .await?;
    app_state.live.broadcast(&LiveEvent::InterventionRecorded {
        intervention_id: response.intervention.intervention_id,
        ticket_id: response.intervention.ticket_id,
    });
    Ok(created(response))
}

async fn handle_close_intervention(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(intervention_id): Path<i64>,
    Json(req): Json<CloseInterventionRequest>,
) -> Result<Json<InterventionResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        intervention_id,
        "Handling close_intervention request"
    );
    let policy = app_state.policy;
    let response = app_state
        .with_store(|p| fieldops_api::close_intervention(p, &ctx, intervention_id, &req, policy))
        .await?;
    app_state.live.broadcast(&LiveEvent::InterventionRecorded {
        intervention_id,
        ticket_id: response.intervention.ticket_id,
    });
    Ok(Json(response))
}

// ============================================================================
// Aggregates
// ============================================================================

async fn handle_site_relations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(site_id): Path<i64>,
) -> Result<Json<SiteRelations>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::get_site_relations(p, &ctx, site_id))
        .await?;
    Ok(Json(response))
}

async fn handle_client_relations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(client_id): Path<i64>,
) -> Result<Json<ClientRelations>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::get_client_relations(p, &ctx, client_id))
        .await?;
    Ok(Json(response))
}

async fn handle_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path((entity_kind, entity_id)): Path<(String, i64)>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::get_audit_timeline(p, &ctx, &entity_kind, entity_id))
        .await?;
    Ok(Json(response))
}

// ============================================================================
// Messaging
// ============================================================================

async fn handle_list_conversation(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::list_conversation(p, &ctx, &conversation_id))
        .await?;
    Ok(Json(response))
}

async fn handle_post_message(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(conversation_id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Created<MessageInfo>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        conversation = %conversation_id,
        attachments = req.attachments.len(),
        "Handling post_message request"
    );
    let response = app_state
        .with_store(|p| {
            // Stamped under the store lock so times follow acceptance order.
            let ctx = RequestContext {
                now: OffsetDateTime::now_utc(),
                ..ctx
            };
            fieldops_api::post_message(p, &ctx, &conversation_id, req)
        })
        .await?;
    app_state.live.broadcast(&LiveEvent::MessagePosted {
        conversation_id: response.conversation_id.clone(),
        message_id: response.message_id,
    });
    Ok(created(response))
}

// ============================================================================
// Directory
// ============================================================================

async fn handle_create_address(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateAddressRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_address(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_create_client(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateClientRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    info!(actor = %ctx.actor.user.login, name = %req.name, "Handling create_client request");
    let response = app_state
        .with_store(|p| fieldops_api::create_client(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_list_clients(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
) -> Result<Json<ClientListResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::list_clients(p, &ctx))
        .await?;
    Ok(Json(response))
}

async fn handle_create_representative(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(client_id): Path<i64>,
    Json(req): Json<CreateRepresentativeRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_representative(p, &ctx, client_id, req))
        .await?;
    Ok(created(response))
}

async fn handle_update_representative(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(representative_id): Path<i64>,
    Json(req): Json<UpdateRepresentativeRequest>,
) -> Result<Json<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::update_representative(p, &ctx, representative_id, req))
        .await?;
    Ok(Json(response))
}

async fn handle_delete_representative(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(representative_id): Path<i64>,
) -> Result<Json<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::delete_representative(p, &ctx, representative_id))
        .await?;
    Ok(Json(response))
}

async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateUserRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        login = %req.login,
        role = %req.role,
        "Handling create_user request"
    );
    let response = app_state
        .with_store(|p| fieldops_api::create_user(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_create_site(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateSiteRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_site(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_update_site(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(site_id): Path<i64>,
    Json(req): Json<UpdateSiteRequest>,
) -> Result<Json<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::update_site(p, &ctx, site_id, req))
        .await?;
    Ok(Json(response))
}

async fn handle_import_sites(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(client_id): Path<i64>,
    Json(req): Json<ImportSitesRequest>,
) -> Result<Json<SiteImportResult>, HttpError> {
    info!(
        actor = %ctx.actor.user.login,
        client_id,
        preview_only = req.preview_only,
        "Handling import_sites request"
    );
    let response = app_state
        .with_store(|p| fieldops_api::import_sites_csv(p, &ctx, client_id, &req))
        .await?;
    Ok(Json(response))
}

async fn handle_create_contract(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateContractRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_contract(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_link_contract_site(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(contract_id): Path<i64>,
    Json(req): Json<LinkSiteRequest>,
) -> Result<Json<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::link_contract_site(p, &ctx, contract_id, req))
        .await?;
    Ok(Json(response))
}

async fn handle_create_association(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateAssociationRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_association(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_link_association_site(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(association_id): Path<i64>,
    Json(req): Json<LinkSiteRequest>,
) -> Result<Json<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::link_association_site(p, &ctx, association_id, req))
        .await?;
    Ok(Json(response))
}

async fn handle_assign_association_responsable(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(association_id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| {
            fieldops_api::assign_association(
                p,
                &ctx,
                association_id,
                req,
                AssignmentKind::Responsable,
            )
        })
        .await?;
    Ok(created_unless_unchanged(response))
}

async fn handle_assign_association_agent(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Path(association_id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| {
            fieldops_api::assign_association(p, &ctx, association_id, req, AssignmentKind::Agent)
        })
        .await?;
    Ok(created_unless_unchanged(response))
}

async fn handle_create_doe(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateDoeRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_doe(p, &ctx, req))
        .await?;
    Ok(created(response))
}

async fn handle_create_affaire(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(ctx): SessionActor,
    Json(req): Json<CreateAffaireRequest>,
) -> Result<Created<MutationResponse>, HttpError> {
    let response = app_state
        .with_store(|p| fieldops_api::create_affaire(p, &ctx, req))
        .await?;
    Ok(created(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/demandes", post(handle_create_demande))
        .route("/demandes/pending", get(handle_list_pending_demandes))
        .route("/demandes/{id}", put(handle_edit_demande))
        .route("/demandes/{id}/convert", post(handle_convert_demande))
        .route("/demandes/{id}/reject", post(handle_reject_demande))
        .route("/demandes/{id}/cancel", post(handle_cancel_demande))
        .route("/tickets", post(handle_create_ticket))
        .route("/tickets/open", get(handle_list_open_tickets))
        .route("/tickets/{id}/relations", get(handle_ticket_relations))
        .route("/tickets/{id}/state", post(handle_transition_ticket))
        .route("/tickets/{id}/finish", post(handle_finish_ticket))
        .route("/tickets/{id}/reopen", post(handle_reopen_ticket))
        .route(
            "/tickets/{id}/responsables",
            post(handle_assign_ticket_responsable),
        )
        .route("/tickets/{id}/agents", post(handle_assign_ticket_agent))
        .route(
            "/tickets/{id}/satisfaction",
            post(handle_submit_satisfaction),
        )
        .route("/interventions", post(handle_create_intervention))
        .route(
            "/interventions/{id}/close",
            post(handle_close_intervention),
        )
        .route("/sites", post(handle_create_site))
        .route("/sites/{id}", put(handle_update_site))
        .route("/sites/{id}/relations", get(handle_site_relations))
        .route(
            "/clients",
            post(handle_create_client).get(handle_list_clients),
        )
        .route("/clients/{id}/relations", get(handle_client_relations))
        .route(
            "/clients/{id}/representatives",
            post(handle_create_representative),
        )
        .route("/clients/{id}/sites/import", post(handle_import_sites))
        .route(
            "/representatives/{id}",
            put(handle_update_representative).delete(handle_delete_representative),
        )
        .route("/conversations/{cid}", get(handle_list_conversation))
        .route("/conversations/{cid}/messages", post(handle_post_message))
        .route("/addresses", post(handle_create_address))
        .route("/users", post(handle_create_user))
        .route("/contracts", post(handle_create_contract))
        .route("/contracts/{id}/sites", post(handle_link_contract_site))
        .route("/associations", post(handle_create_association))
        .route(
            "/associations/{id}/sites",
            post(handle_link_association_site),
        )
        .route(
            "/associations/{id}/responsables",
            post(handle_assign_association_responsable),
        )
        .route(
            "/associations/{id}/agents",
            post(handle_assign_association_agent),
        )
        .route("/does", post(handle_create_doe))
        .route("/affaires", post(handle_create_affaire))
        .route("/audit/{kind}/{id}", get(handle_audit_timeline))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

/// Creates an admin user with `login` unless one already exists.
///
/// The directory is otherwise only writable by admins, so a fresh store
/// needs one created outside the API.
fn bootstrap_admin(
    persistence: &mut Persistence,
    login: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.find_user_by_login(login)?.is_some() {
        info!(login, "Bootstrap admin already present");
        return Ok(());
    }

    let ctx = OperationContext::new(
        Actor::new(0, String::from("system"), UserRole::Admin),
        Cause::new(
            String::from("bootstrap"),
            String::from("Initial administrator"),
        ),
        OffsetDateTime::now_utc(),
    );
    let user = NewUser {
        login: login.to_string(),
        display_name: login.to_string(),
        role: UserRole::Admin,
        client_id: None,
        matricule: None,
        email: None,
        phone: None,
    };
    let result = engine_create_user(user, None, &ctx)?;
    persistence.persist_transition(&result)?;
    info!(login, "Bootstrap admin created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing field-service server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let Some(login) = &args.bootstrap_admin {
        bootstrap_admin(&mut persistence, login)?;
    }

    let policy = LifecyclePolicy {
        allow_ticket_reopen: args.allow_ticket_reopen,
        allow_intervention_changes_after_close: args.allow_intervention_changes_after_close,
    };
    info!(
        allow_ticket_reopen = policy.allow_ticket_reopen,
        allow_intervention_changes_after_close = policy.allow_intervention_changes_after_close,
        "Lifecycle policy"
    );

    let app: Router = build_router(AppState::new(persistence, policy));

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;

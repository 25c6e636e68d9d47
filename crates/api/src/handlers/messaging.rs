// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops::MessageDraft;
use fieldops_domain::ConversationId;
use fieldops_persistence::Persistence;
use tracing::info;

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::lookup::{created_id, optional, persist, require};
use crate::receiver::{ConversationTarget, default_receiver, resolve_conversation};
use crate::request_response::{ConversationResponse, MessageInfo, PostMessageRequest};

/// Parses a conversation id and checks the actor may see it.
fn open_conversation(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    conversation_id: &str,
    action: &str,
) -> Result<ConversationTarget, ApiError> {
    let conversation_id: ConversationId =
        conversation_id.parse().map_err(translate_domain_error)?;
    let target = resolve_conversation(persistence, conversation_id)?;
    AuthorizationService::authorize_client_scope(&ctx.actor, target.client_id, action)?;
    Ok(target)
}

/// Lists a conversation, oldest message first.
///
/// # Errors
///
/// * `InvalidInput` for a malformed conversation id
/// * `ResourceNotFound` if the demande or ticket does not exist
/// * `Unauthorized` if a client asks for another client's conversation
pub fn list_conversation(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    conversation_id: &str,
) -> Result<ConversationResponse, ApiError> {
    let target = open_conversation(persistence, ctx, conversation_id, "list_messages")?;
    let messages = persistence
        .list_messages(target.conversation_id)
        .map_err(translate_persistence_error)?;
    Ok(ConversationResponse {
        conversation_id: target.conversation_id.to_string(),
        messages: messages.iter().map(MessageInfo::from).collect(),
    })
}

/// Appends a message to a conversation.
///
/// Without an explicit receiver, one is inferred from the conversation.
///
/// # Errors
///
/// * `InvalidInput` for a malformed conversation id, an empty message, an
///   incomplete attachment, an unknown receiver, or no inferable receiver
/// * `ResourceNotFound` if the demande or ticket does not exist
/// * `Unauthorized` if a client writes to another client's conversation
pub fn post_message(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    conversation_id: &str,
    request: PostMessageRequest,
) -> Result<MessageInfo, ApiError> {
    let target = open_conversation(persistence, ctx, conversation_id, "post_message")?;
    let sender = &ctx.actor.user;

    let receiver = match request.receiver_id {
        Some(receiver_id) => optional(persistence.find_user(receiver_id))?,
        None => Some(default_receiver(persistence, &target, sender)?),
    };
    let receiver_id = request
        .receiver_id
        .or_else(|| receiver.as_ref().map(|r| r.user_id))
        .unwrap_or_default();

    let draft = MessageDraft {
        conversation_id: target.conversation_id,
        receiver_id,
        body: request.body,
        attachments: request.attachments,
    };

    let persisted = persist(
        persistence,
        fieldops::post_message(draft, sender, receiver.as_ref(), &ctx.operation()),
    )?;
    let message_id = created_id(&persisted)?;
    info!(
        message_id,
        conversation = %target.conversation_id,
        sender_id = sender.user_id,
        receiver_id,
        "Message posted"
    );
    // The store may move created_at forward to keep the conversation ordered.
    let stored = require(persistence.find_message(message_id), "message", message_id)?;
    Ok(MessageInfo::from(&stored))
}

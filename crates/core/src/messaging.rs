// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::MessageDraft;
use crate::error::CoreError;
use crate::mutation::{Mutation, NewMessage};
use crate::snapshot;
use crate::state::{OperationContext, TransitionResult};
use fieldops_audit::{EntityKind, EntityRef, StateSnapshot};
use fieldops_domain::{DomainError, User, validate_message_content};

/// Appends a message to a conversation.
///
/// The caller has already checked that the conversation's demande or
/// ticket exists and has resolved the receiver (explicit or inferred).
/// Sending a message to oneself is allowed.
///
/// # Arguments
///
/// * `draft` - Conversation, receiver id, body and attachments
/// * `sender` - The posting user
/// * `receiver` - The user named by `draft.receiver_id`, if it exists
/// * `ctx` - Actor, cause and time of the request
///
/// # Errors
///
/// * `EmptyMessage` if the body is blank and there are no attachments
/// * `InvalidAttachment` for an attachment without name or reference
/// * `UnknownReceiver` if the receiver does not resolve
pub fn post_message(
    draft: MessageDraft,
    sender: &User,
    receiver: Option<&User>,
    ctx: &OperationContext,
) -> Result<TransitionResult, CoreError> {
    validate_message_content(&draft.body, &draft.attachments)?;
    let receiver = receiver
        .filter(|r| r.user_id == draft.receiver_id)
        .ok_or_else(|| DomainError::UnknownReceiver(draft.receiver_id.to_string()))?;

    let message = NewMessage {
        conversation_id: draft.conversation_id,
        sender_id: sender.user_id,
        receiver_id: receiver.user_id,
        body: draft.body,
        attachments: draft.attachments,
        created_at: ctx.now,
    };

    let audit_event = ctx.audit(
        "PostMessage",
        Some(format!(
            "{} -> {} in {} ({} attachment(s))",
            sender.login,
            receiver.login,
            message.conversation_id,
            message.attachments.len()
        )),
        EntityRef::pending(EntityKind::Message),
        StateSnapshot::absent(),
        snapshot::created(&format!("message in {}", message.conversation_id)),
    );

    Ok(TransitionResult {
        mutation: Mutation::AppendMessage(message),
        audit_event,
    })
}

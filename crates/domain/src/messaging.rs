// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversation identifiers and message content rules.
//!
//! Every demande and every ticket owns one conversation, addressed as
//! `demande-<id>` or `ticket-<id>`. Messages are append-only.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The kind of entity a conversation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Demande,
    Ticket,
}

impl ConversationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Demande => "demande",
            Self::Ticket => "ticket",
        }
    }
}

/// Identifies the conversation of one demande or one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId {
    pub kind: ConversationKind,
    pub entity_id: i64,
}

impl ConversationId {
    #[must_use]
    pub const fn new(kind: ConversationKind, entity_id: i64) -> Self {
        Self { kind, entity_id }
    }

    #[must_use]
    pub const fn demande(demande_id: i64) -> Self {
        Self::new(ConversationKind::Demande, demande_id)
    }

    #[must_use]
    pub const fn ticket(ticket_id: i64) -> Self {
        Self::new(ConversationKind::Ticket, ticket_id)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.entity_id)
    }
}

impl FromStr for ConversationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidConversationId(s.to_string());
        let (prefix, id) = s.split_once('-').ok_or_else(invalid)?;
        let kind = match prefix {
            "demande" => ConversationKind::Demande,
            "ticket" => ConversationKind::Ticket,
            _ => return Err(invalid()),
        };
        // Digits only: "+5" or " 5" are not canonical ids.
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let entity_id: i64 = id.parse().map_err(|_| invalid())?;
        if entity_id <= 0 {
            return Err(invalid());
        }
        Ok(Self { kind, entity_id })
    }
}

/// A reference to a stored file. The bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    /// Opaque storage reference issued by the file store.
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// One entry of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Server-assigned sequence; defines ordering within a conversation.
    pub message_id: i64,
    pub conversation_id: ConversationId,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub attachments: Vec<Attachment>,
}

/// Checks that a message carries content and that its attachments are complete.
///
/// # Errors
///
/// * `DomainError::EmptyMessage` if the trimmed body is empty and there are no attachments
/// * `DomainError::InvalidAttachment` if an attachment lacks a file name or reference
pub fn validate_message_content(body: &str, attachments: &[Attachment]) -> Result<(), DomainError> {
    if body.trim().is_empty() && attachments.is_empty() {
        return Err(DomainError::EmptyMessage);
    }
    for attachment in attachments {
        if attachment.file_name.trim().is_empty() {
            return Err(DomainError::InvalidAttachment(String::from(
                "file name cannot be empty",
            )));
        }
        if attachment.reference.trim().is_empty() {
            return Err(DomainError::InvalidAttachment(format!(
                "'{}' has no storage reference",
                attachment.file_name
            )));
        }
    }
    Ok(())
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversation ownership and default receiver inference.

use fieldops_domain::{ConversationId, ConversationKind, DomainError, User};
use fieldops_persistence::Persistence;

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::lookup::{optional_by_id, require};

/// What a conversation is attached to, as far as messaging cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationTarget {
    pub conversation_id: ConversationId,
    /// The client owning the demande or the ticket's site.
    pub client_id: Option<i64>,
    /// The responsable of the ticket (for a demande, of its ticket).
    pub responsable_id: Option<i64>,
}

/// Resolves the entity a conversation belongs to.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the demande or ticket does not exist.
pub fn resolve_conversation(
    persistence: &mut Persistence,
    conversation_id: ConversationId,
) -> Result<ConversationTarget, ApiError> {
    let id = conversation_id.entity_id;
    match conversation_id.kind {
        ConversationKind::Demande => {
            let demande = require(persistence.find_demande(id), "demande", id)?;
            let ticket = optional_by_id(demande.ticket_id, |t| persistence.find_ticket(t))?;
            Ok(ConversationTarget {
                conversation_id,
                client_id: Some(demande.client_id),
                responsable_id: ticket.and_then(|t| t.responsable_id),
            })
        }
        ConversationKind::Ticket => {
            let ticket = require(persistence.find_ticket(id), "ticket", id)?;
            let site = optional_by_id(Some(ticket.site_id), |s| persistence.find_site(s))?;
            Ok(ConversationTarget {
                conversation_id,
                client_id: site.and_then(|s| s.client_id),
                responsable_id: ticket.responsable_id,
            })
        }
    }
}

/// Picks the receiver of a message posted without one.
///
/// A client writes to the ticket's responsable. Staff write to the first
/// user of the owning client.
///
/// # Errors
///
/// Returns `InvalidInput` (`NoDefaultReceiver`) when there is no
/// counterpart to route to.
pub fn default_receiver(
    persistence: &mut Persistence,
    target: &ConversationTarget,
    sender: &User,
) -> Result<User, ApiError> {
    let no_receiver = || {
        translate_domain_error(DomainError::NoDefaultReceiver {
            conversation_id: target.conversation_id.to_string(),
        })
    };

    if sender.role.is_staff() {
        let client_id = target.client_id.ok_or_else(no_receiver)?;
        let users = persistence
            .list_users_for_client(client_id)
            .map_err(translate_persistence_error)?;
        users.into_iter().next().ok_or_else(no_receiver)
    } else {
        let responsable_id = target.responsable_id.ok_or_else(no_receiver)?;
        persistence
            .find_user(responsable_id)
            .map_err(translate_persistence_error)?
            .ok_or_else(no_receiver)
    }
}

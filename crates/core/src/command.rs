// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Requested changes as data only, before validation.

use fieldops_domain::{Attachment, ConversationId, InterventionStatus, SiteStatus};
use time::OffsetDateTime;

/// Fields submitted to create a demande.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandeDraft {
    pub client_id: i64,
    pub site_id: i64,
    pub title: String,
    pub description: String,
}

/// Ticket fields supplied when converting a demande.
///
/// Title and description default to the demande's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub affaire_id: i64,
    pub doe_id: i64,
    /// Defaults to the conversion time.
    pub started_at: Option<OffsetDateTime>,
}

/// Fields submitted to create a standalone ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub site_id: i64,
    pub affaire_id: i64,
    pub doe_id: i64,
    pub started_at: Option<OffsetDateTime>,
}

/// Fields submitted to record an intervention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionDraft {
    pub ticket_id: i64,
    pub description: String,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    pub status: InterventionStatus,
    pub previous_intervention_id: Option<i64>,
}

/// A message as posted, with the receiver already resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub conversation_id: ConversationId,
    pub receiver_id: i64,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

/// Site fields an admin may change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SitePatch {
    pub name: Option<String>,
    pub status: Option<SiteStatus>,
    pub client_id: Option<i64>,
    pub address_id: Option<i64>,
    pub responsible_agent_id: Option<i64>,
    pub comment: Option<String>,
}

/// Representative fields an admin may change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepresentativePatch {
    pub name: Option<String>,
    pub function: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

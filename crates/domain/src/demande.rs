// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client service requests ("demandes") and their lock rule.
//!
//! A demande is editable by its client until an admin converts it into a
//! ticket. From that moment `ticket_id` is set and the demande is frozen for
//! every caller, whatever their role.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Processing status of a demande.
///
/// Serialized with the labels shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DemandeStatus {
    /// Submitted, waiting for an admin.
    #[default]
    #[serde(rename = "En cours de traitement")]
    Pending,
    /// Converted into a ticket that is still open.
    #[serde(rename = "Pris en charge")]
    InProgress,
    /// The linked ticket is finished.
    #[serde(rename = "Traité")]
    Processed,
    /// Refused by an admin.
    #[serde(rename = "Rejeté")]
    Rejected,
    /// Withdrawn by the client.
    #[serde(rename = "Annulé")]
    Cancelled,
}

impl DemandeStatus {
    /// Stable persistence code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Processed => "processed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Label shown to clients.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En cours de traitement",
            Self::InProgress => "Pris en charge",
            Self::Processed => "Traité",
            Self::Rejected => "Rejeté",
            Self::Cancelled => "Annulé",
        }
    }

    /// Rejected and cancelled demandes never move again.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }
}

impl FromStr for DemandeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "processed" => Ok(Self::Processed),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::UnknownStatus {
                family: "demande",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DemandeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A client service request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demande {
    pub demande_id: i64,
    pub client_id: i64,
    pub site_id: i64,
    pub title: String,
    pub description: String,
    pub status: DemandeStatus,
    pub created_at: OffsetDateTime,
    /// Set once by conversion, never cleared.
    pub ticket_id: Option<i64>,
}

impl Demande {
    /// A converted demande is frozen.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.ticket_id.is_some()
    }

    /// Checks that the demande may still be edited, rejected or cancelled.
    ///
    /// # Errors
    ///
    /// * `DomainError::DemandeLocked` if a ticket is linked
    /// * `DomainError::DemandeClosed` if the demande was rejected or cancelled
    pub const fn ensure_mutable(&self) -> Result<(), DomainError> {
        if let Some(ticket_id) = self.ticket_id {
            return Err(DomainError::DemandeLocked {
                demande_id: self.demande_id,
                ticket_id,
            });
        }
        if self.status.is_closed() {
            return Err(DomainError::DemandeClosed {
                demande_id: self.demande_id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Checks that the demande can be converted into a ticket.
    ///
    /// # Errors
    ///
    /// * `DomainError::DemandeAlreadyConverted` carrying the existing ticket id
    /// * `DomainError::DemandeClosed` if the demande was rejected or cancelled
    pub const fn ensure_convertible(&self) -> Result<(), DomainError> {
        if let Some(ticket_id) = self.ticket_id {
            return Err(DomainError::DemandeAlreadyConverted {
                demande_id: self.demande_id,
                ticket_id,
            });
        }
        if self.status.is_closed() {
            return Err(DomainError::DemandeClosed {
                demande_id: self.demande_id,
                status: self.status,
            });
        }
        Ok(())
    }
}

/// Fields of a demande a client may change before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemandePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_id: Option<i64>,
}

impl DemandePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.site_id.is_none()
    }

    /// Applies the patch to a copy of `demande`.
    #[must_use]
    pub fn apply_to(&self, demande: &Demande) -> Demande {
        let mut updated = demande.clone();
        if let Some(title) = &self.title {
            updated.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            updated.description.clone_from(description);
        }
        if let Some(site_id) = self.site_id {
            updated.site_id = site_id;
        }
        updated
    }
}

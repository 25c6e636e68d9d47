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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod demande;
mod error;
mod intervention;
mod messaging;
mod satisfaction;
mod ticket;
mod timestamp;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use demande::{Demande, DemandePatch, DemandeStatus};
pub use error::{DomainError, ErrorKind};
pub use intervention::{
    Elapsed, Intervention, InterventionStatus, elapsed, elapsed_at, validate_window,
};
pub use messaging::{
    Attachment, ConversationId, ConversationKind, Message, validate_message_content,
};
pub use satisfaction::{Rating, Satisfaction};
pub use ticket::{Ticket, TicketState, displayed_state};
pub use timestamp::{format_date, format_timestamp, parse_date, parse_timestamp};

// Re-export public types
pub use types::{
    Address, Affaire, Assignment, AssignmentKind, Association, Client, Contact, Contract, Doe,
    Representative, Site, SiteStatus, User, UserRole,
};
pub use validation::{validate_date_window, validate_email, validate_matricule, validate_required};

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

mod apply;
mod command;
mod directory;
mod error;
mod messaging;
mod mutation;
mod snapshot;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{
    assign_to_ticket, cancel_demande, close_intervention, convert_demande, create_demande,
    create_intervention, create_ticket, edit_demande, mark_ticket_finished, reject_demande,
    reopen_ticket, submit_satisfaction, transition_ticket,
};
pub use command::{
    ConversionDraft, DemandeDraft, InterventionDraft, MessageDraft, RepresentativePatch,
    SitePatch, TicketDraft,
};
pub use directory::{
    assign_to_association, create_address, create_affaire, create_association, create_client,
    create_contract, create_doe, create_representative, create_site, create_user,
    delete_representative, import_sites, link_association_site, link_contract_site,
    update_representative, update_site, validate_address,
};
pub use error::CoreError;
pub use messaging::post_message;
pub use mutation::{
    ImportedSite, Mutation, NewAddress, NewAffaire, NewAssociation, NewClient, NewContract,
    NewDemande, NewDoe, NewIntervention, NewMessage, NewRepresentative, NewSatisfaction, NewSite,
    NewTicket, NewUser,
};
pub use state::{LifecyclePolicy, OperationContext, TransitionResult};

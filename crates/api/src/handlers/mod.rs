// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request handlers.
//!
//! Every handler follows the same shape: authorize the actor, load what the
//! operation needs from the store, run the lifecycle engine, persist the
//! resulting mutation together with its audit event, and answer with a DTO.
//! Ids named in the path that do not resolve are `ResourceNotFound`; ids
//! carried in the body that do not resolve are `InvalidInput`.

mod audit;
mod demandes;
mod directory;
mod interventions;
mod messaging;
mod tickets;

pub use audit::get_audit_timeline;
pub use demandes::{cancel_demande, convert_demande, create_demande, edit_demande, reject_demande};
pub use directory::{
    assign_association, create_address, create_affaire, create_association, create_client,
    create_contract, create_doe, create_representative, create_site, create_user,
    delete_representative, link_association_site, link_contract_site, list_clients,
    update_representative, update_site,
};
pub use interventions::{close_intervention, create_intervention};
pub use messaging::{list_conversation, post_message};
pub use tickets::{
    assign_to_ticket, create_ticket, finish_ticket, reopen_ticket, submit_satisfaction,
    transition_ticket,
};

use fieldops_persistence::PersistTransitionResult;

use crate::request_response::MutationResponse;

/// Builds the standard answer to a write.
fn mutation_response(id: i64, persisted: &PersistTransitionResult, message: String) -> MutationResponse {
    MutationResponse {
        id,
        event_id: Some(persisted.event_id),
        message,
    }
}

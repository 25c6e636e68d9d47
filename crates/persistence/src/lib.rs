// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Entity store for the field-service back-office.
//!
//! Built on Diesel over `SQLite`. Migrations are embedded and run when a
//! store is opened.
//!
//! ## Write model
//!
//! Every change arrives as a `TransitionResult` from the lifecycle engine.
//! `Persistence::persist_transition` applies its mutation and records its
//! audit event in one transaction. Writes that depend on a precondition
//! read earlier (a demande still unconverted, an intervention still open)
//! are conditional updates and fail with `ConditionalWriteFailed` when the
//! precondition no longer holds. Unique indexes back the one-ticket-per-
//! demande and one-satisfaction-per-ticket rules.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory` gives each caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use fieldops::TransitionResult;
use fieldops_audit::{AuditEvent, EntityKind};
use fieldops_domain::{
    Address, Affaire, Assignment, Association, Client, Contract, ConversationId, Demande, Doe,
    Intervention, Message, Representative, Satisfaction, Site, Ticket, User,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::PersistTransitionResult;

use backend::PersistenceBackend;

/// Counter naming in-memory databases so each instance is isolated.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Handle on the entity store.
///
/// Holds one connection; callers serialize access (the server wraps it in
/// a mutex), which makes the store the single writer.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Opens a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:fieldops_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Opens (or creates) a file-backed store with WAL enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not UTF-8 or the database cannot be
    /// opened or migrated.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Applies a transition and records its audit event atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is committed then.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves every audit event of one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_audit_timeline(
        &mut self,
        kind: EntityKind,
        entity_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_audit_timeline(&mut self.conn, kind, entity_id)
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_address(&mut self, address_id: i64) -> Result<Option<Address>, PersistenceError> {
        queries::directory::find_address(&mut self.conn, address_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_client(&mut self, client_id: i64) -> Result<Option<Client>, PersistenceError> {
        queries::directory::find_client(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_clients(&mut self) -> Result<Vec<Client>, PersistenceError> {
        queries::directory::list_clients(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_representative(
        &mut self,
        representative_id: i64,
    ) -> Result<Option<Representative>, PersistenceError> {
        queries::directory::find_representative(&mut self.conn, representative_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_representatives_for_client(
        &mut self,
        client_id: i64,
    ) -> Result<Vec<Representative>, PersistenceError> {
        queries::directory::list_representatives_for_client(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_user(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::directory::find_user(&mut self.conn, user_id)
    }

    /// Resolves an actor's login to the stored user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>, PersistenceError> {
        queries::directory::find_user_by_login(&mut self.conn, login)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_user_by_matricule(
        &mut self,
        matricule: &str,
    ) -> Result<Option<User>, PersistenceError> {
        queries::directory::find_user_by_matricule(&mut self.conn, matricule)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_users_for_client(&mut self, client_id: i64) -> Result<Vec<User>, PersistenceError> {
        queries::directory::list_users_for_client(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_users_by_ids(&mut self, user_ids: &[i64]) -> Result<Vec<User>, PersistenceError> {
        queries::directory::list_users_by_ids(&mut self.conn, user_ids)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_site(&mut self, site_id: i64) -> Result<Option<Site>, PersistenceError> {
        queries::directory::find_site(&mut self.conn, site_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sites_for_client(&mut self, client_id: i64) -> Result<Vec<Site>, PersistenceError> {
        queries::directory::list_sites_for_client(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_contract(&mut self, contract_id: i64) -> Result<Option<Contract>, PersistenceError> {
        queries::directory::find_contract(&mut self.conn, contract_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_contracts_for_client(
        &mut self,
        client_id: i64,
    ) -> Result<Vec<Contract>, PersistenceError> {
        queries::directory::list_contracts_for_client(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_contracts_for_site(&mut self, site_id: i64) -> Result<Vec<Contract>, PersistenceError> {
        queries::directory::list_contracts_for_site(&mut self.conn, site_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_association(
        &mut self,
        association_id: i64,
    ) -> Result<Option<Association>, PersistenceError> {
        queries::directory::find_association(&mut self.conn, association_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_association_site_ids(
        &mut self,
        association_id: i64,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::directory::list_association_site_ids(&mut self.conn, association_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_association_assignments(
        &mut self,
        association_id: i64,
    ) -> Result<Vec<Assignment>, PersistenceError> {
        queries::directory::list_association_assignments(&mut self.conn, association_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_doe(&mut self, doe_id: i64) -> Result<Option<Doe>, PersistenceError> {
        queries::directory::find_doe(&mut self.conn, doe_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_affaire(&mut self, affaire_id: i64) -> Result<Option<Affaire>, PersistenceError> {
        queries::directory::find_affaire(&mut self.conn, affaire_id)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_demande(&mut self, demande_id: i64) -> Result<Option<Demande>, PersistenceError> {
        queries::lifecycle::find_demande(&mut self.conn, demande_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_demandes_for_client(
        &mut self,
        client_id: i64,
    ) -> Result<Vec<Demande>, PersistenceError> {
        queries::lifecycle::list_demandes_for_client(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_demandes_for_ticket(
        &mut self,
        ticket_id: i64,
    ) -> Result<Vec<Demande>, PersistenceError> {
        queries::lifecycle::list_demandes_for_ticket(&mut self.conn, ticket_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pending_demandes(
        &mut self,
        client_id: Option<i64>,
    ) -> Result<Vec<Demande>, PersistenceError> {
        queries::lifecycle::list_pending_demandes(&mut self.conn, client_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_ticket(&mut self, ticket_id: i64) -> Result<Option<Ticket>, PersistenceError> {
        queries::lifecycle::find_ticket(&mut self.conn, ticket_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tickets_for_site(&mut self, site_id: i64) -> Result<Vec<Ticket>, PersistenceError> {
        queries::lifecycle::list_tickets_for_site(&mut self.conn, site_id)
    }

    /// Lists tickets not yet `Termine`, optionally restricted to some sites.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_unfinished_tickets(
        &mut self,
        site_ids: Option<&[i64]>,
    ) -> Result<Vec<Ticket>, PersistenceError> {
        queries::lifecycle::list_unfinished_tickets(&mut self.conn, site_ids)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_ticket_assignments(
        &mut self,
        ticket_id: i64,
    ) -> Result<Vec<Assignment>, PersistenceError> {
        queries::lifecycle::list_ticket_assignments(&mut self.conn, ticket_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_intervention(
        &mut self,
        intervention_id: i64,
    ) -> Result<Option<Intervention>, PersistenceError> {
        queries::lifecycle::find_intervention(&mut self.conn, intervention_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_interventions_for_ticket(
        &mut self,
        ticket_id: i64,
    ) -> Result<Vec<Intervention>, PersistenceError> {
        queries::lifecycle::list_interventions_for_ticket(&mut self.conn, ticket_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_interventions(&mut self, ticket_id: i64) -> Result<usize, PersistenceError> {
        queries::lifecycle::count_interventions(&mut self.conn, ticket_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_interventions_by_ticket(
        &mut self,
        ticket_ids: &[i64],
    ) -> Result<HashMap<i64, usize>, PersistenceError> {
        queries::lifecycle::count_interventions_by_ticket(&mut self.conn, ticket_ids)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_satisfaction_for_ticket(
        &mut self,
        ticket_id: i64,
    ) -> Result<Option<Satisfaction>, PersistenceError> {
        queries::lifecycle::find_satisfaction_for_ticket(&mut self.conn, ticket_id)
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Lists a conversation's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_messages(
        &mut self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, PersistenceError> {
        queries::messaging::list_messages(&mut self.conn, conversation_id)
    }

    /// Finds a message by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_message(&mut self, message_id: i64) -> Result<Option<Message>, PersistenceError> {
        queries::messaging::find_message(&mut self.conn, message_id)
    }
}

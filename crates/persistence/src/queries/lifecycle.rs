// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Demande, ticket, intervention and satisfaction queries.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::dsl::count;
use diesel::prelude::*;
use fieldops_domain::{
    Assignment, Demande, DemandeStatus, Intervention, Satisfaction, Ticket, TicketState,
};
use num_traits::ToPrimitive;

use crate::data_models::{
    AssignmentRow, DemandeRow, InterventionRow, SatisfactionRow, TicketRow, assignment_from_row,
};
use crate::diesel_schema::{demandes, interventions, satisfactions, ticket_assignments, tickets};
use crate::error::PersistenceError;

/// Finds a demande by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_demande(
    conn: &mut SqliteConnection,
    demande_id: i64,
) -> Result<Option<Demande>, PersistenceError> {
    demandes::table
        .filter(demandes::demande_id.eq(demande_id))
        .select(DemandeRow::as_select())
        .first(conn)
        .optional()?
        .map(Demande::try_from)
        .transpose()
}

/// Lists the demandes of a client, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_demandes_for_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Vec<Demande>, PersistenceError> {
    let rows: Vec<DemandeRow> = demandes::table
        .filter(demandes::client_id.eq(client_id))
        .order(demandes::demande_id.desc())
        .select(DemandeRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Demande::try_from).collect()
}

/// Lists the demandes linked to a ticket.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_demandes_for_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<Demande>, PersistenceError> {
    let rows: Vec<DemandeRow> = demandes::table
        .filter(demandes::ticket_id.eq(ticket_id))
        .order(demandes::demande_id.asc())
        .select(DemandeRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Demande::try_from).collect()
}

/// Lists demandes awaiting processing, oldest first, optionally for one client.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_pending_demandes(
    conn: &mut SqliteConnection,
    client_id: Option<i64>,
) -> Result<Vec<Demande>, PersistenceError> {
    let mut query = demandes::table
        .filter(demandes::status.eq(DemandeStatus::Pending.as_str()))
        .into_boxed();
    if let Some(client_id) = client_id {
        query = query.filter(demandes::client_id.eq(client_id));
    }
    let rows: Vec<DemandeRow> = query
        .order(demandes::demande_id.asc())
        .select(DemandeRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Demande::try_from).collect()
}

/// Finds a ticket by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<Ticket>, PersistenceError> {
    tickets::table
        .filter(tickets::ticket_id.eq(ticket_id))
        .select(TicketRow::as_select())
        .first(conn)
        .optional()?
        .map(Ticket::try_from)
        .transpose()
}

/// Lists the tickets of a site, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_tickets_for_site(
    conn: &mut SqliteConnection,
    site_id: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::site_id.eq(site_id))
        .order(tickets::ticket_id.desc())
        .select(TicketRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Ticket::try_from).collect()
}

/// Lists tickets whose stored state is not `Termine`, optionally on a set
/// of sites.
///
/// The stored state decides here: the display override never turns an
/// open ticket into a finished one.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_unfinished_tickets(
    conn: &mut SqliteConnection,
    site_ids: Option<&[i64]>,
) -> Result<Vec<Ticket>, PersistenceError> {
    let mut query = tickets::table
        .filter(tickets::state.ne(TicketState::Termine.as_str()))
        .into_boxed();
    if let Some(site_ids) = site_ids {
        query = query.filter(tickets::site_id.eq_any(site_ids.to_vec()));
    }
    let rows: Vec<TicketRow> = query
        .order(tickets::ticket_id.asc())
        .select(TicketRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Ticket::try_from).collect()
}

/// Lists the staff assigned to a ticket.
///
/// # Errors
///
/// Returns an error if the query fails or a stored kind is unknown.
pub fn list_ticket_assignments(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<Assignment>, PersistenceError> {
    let rows: Vec<AssignmentRow> = ticket_assignments::table
        .filter(ticket_assignments::ticket_id.eq(ticket_id))
        .order(ticket_assignments::user_id.asc())
        .select((
            ticket_assignments::user_id,
            ticket_assignments::kind,
            ticket_assignments::role_label,
        ))
        .load(conn)?;
    rows.into_iter().map(assignment_from_row).collect()
}

/// Finds an intervention by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_intervention(
    conn: &mut SqliteConnection,
    intervention_id: i64,
) -> Result<Option<Intervention>, PersistenceError> {
    interventions::table
        .filter(interventions::intervention_id.eq(intervention_id))
        .select(InterventionRow::as_select())
        .first(conn)
        .optional()?
        .map(Intervention::try_from)
        .transpose()
}

/// Lists the interventions of a ticket in the order they were recorded.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_interventions_for_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<Intervention>, PersistenceError> {
    let rows: Vec<InterventionRow> = interventions::table
        .filter(interventions::ticket_id.eq(ticket_id))
        .order(interventions::intervention_id.asc())
        .select(InterventionRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Intervention::try_from).collect()
}

/// Counts the interventions of a ticket.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_interventions(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<usize, PersistenceError> {
    let total: i64 = interventions::table
        .filter(interventions::ticket_id.eq(ticket_id))
        .count()
        .get_result(conn)?;
    total
        .to_usize()
        .ok_or_else(|| PersistenceError::ReconstructionError(format!("invalid count {total}")))
}

/// Counts interventions per ticket for a batch of tickets.
///
/// Tickets without interventions are absent from the map.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_interventions_by_ticket(
    conn: &mut SqliteConnection,
    ticket_ids: &[i64],
) -> Result<HashMap<i64, usize>, PersistenceError> {
    if ticket_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, i64)> = interventions::table
        .filter(interventions::ticket_id.eq_any(ticket_ids.to_vec()))
        .group_by(interventions::ticket_id)
        .select((
            interventions::ticket_id,
            count(interventions::intervention_id),
        ))
        .load(conn)?;

    rows.into_iter()
        .map(|(ticket_id, total)| {
            total
                .to_usize()
                .map(|n| (ticket_id, n))
                .ok_or_else(|| {
                    PersistenceError::ReconstructionError(format!("invalid count {total}"))
                })
        })
        .collect()
}

/// Finds the satisfaction record of a ticket.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_satisfaction_for_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<Satisfaction>, PersistenceError> {
    satisfactions::table
        .filter(satisfactions::ticket_id.eq(ticket_id))
        .select(SatisfactionRow::as_select())
        .first(conn)
        .optional()?
        .map(Satisfaction::try_from)
        .transpose()
}

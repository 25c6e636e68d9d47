// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reference-data queries: addresses, clients, users, sites, contracts,
//! associations, DOEs and affaires.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldops_domain::{
    Address, Affaire, Assignment, Association, Client, Contract, Doe, Representative, Site, User,
};

use crate::data_models::{
    AddressRow, AffaireRow, AssignmentRow, AssociationRow, ClientRow, ContractRow, DoeRow,
    RepresentativeRow, SiteRow, UserRow, assignment_from_row,
};
use crate::diesel_schema::{
    addresses, affaires, association_assignments, association_sites, associations, clients,
    contract_sites, contracts, does, representatives, sites, users,
};
use crate::error::PersistenceError;

/// Finds an address by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_address(
    conn: &mut SqliteConnection,
    address_id: i64,
) -> Result<Option<Address>, PersistenceError> {
    Ok(addresses::table
        .filter(addresses::address_id.eq(address_id))
        .select(AddressRow::as_select())
        .first(conn)
        .optional()?
        .map(Address::from))
}

/// Finds a client by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Option<Client>, PersistenceError> {
    Ok(clients::table
        .filter(clients::client_id.eq(client_id))
        .select(ClientRow::as_select())
        .first(conn)
        .optional()?
        .map(Client::from))
}

/// Lists all clients ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_clients(conn: &mut SqliteConnection) -> Result<Vec<Client>, PersistenceError> {
    let rows: Vec<ClientRow> = clients::table
        .order((clients::name.asc(), clients::client_id.asc()))
        .select(ClientRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Client::from).collect())
}

/// Finds a representative by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_representative(
    conn: &mut SqliteConnection,
    representative_id: i64,
) -> Result<Option<Representative>, PersistenceError> {
    Ok(representatives::table
        .filter(representatives::representative_id.eq(representative_id))
        .select(RepresentativeRow::as_select())
        .first(conn)
        .optional()?
        .map(Representative::from))
}

/// Lists the representatives of a client.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_representatives_for_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Vec<Representative>, PersistenceError> {
    let rows: Vec<RepresentativeRow> = representatives::table
        .filter(representatives::client_id.eq(client_id))
        .order(representatives::representative_id.asc())
        .select(RepresentativeRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Representative::from).collect())
}

/// Finds a user by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn find_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(User::try_from)
        .transpose()
}

/// Finds a user by login.
///
/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn find_user_by_login(
    conn: &mut SqliteConnection,
    login: &str,
) -> Result<Option<User>, PersistenceError> {
    users::table
        .filter(users::login.eq(login))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(User::try_from)
        .transpose()
}

/// Finds an agent by matricule.
///
/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn find_user_by_matricule(
    conn: &mut SqliteConnection,
    matricule: &str,
) -> Result<Option<User>, PersistenceError> {
    users::table
        .filter(users::matricule.eq(matricule))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(User::try_from)
        .transpose()
}

/// Lists the users bound to a client, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored role is unknown.
pub fn list_users_for_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Vec<User>, PersistenceError> {
    let rows: Vec<UserRow> = users::table
        .filter(users::client_id.eq(client_id))
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?;
    rows.into_iter().map(User::try_from).collect()
}

/// Loads users by id, in id order. Unknown ids are skipped.
///
/// # Errors
///
/// Returns an error if the query fails or a stored role is unknown.
pub fn list_users_by_ids(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
) -> Result<Vec<User>, PersistenceError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<UserRow> = users::table
        .filter(users::user_id.eq_any(user_ids.to_vec()))
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?;
    rows.into_iter().map(User::try_from).collect()
}

/// Finds a site by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored status is unknown.
pub fn find_site(
    conn: &mut SqliteConnection,
    site_id: i64,
) -> Result<Option<Site>, PersistenceError> {
    sites::table
        .filter(sites::site_id.eq(site_id))
        .select(SiteRow::as_select())
        .first(conn)
        .optional()?
        .map(Site::try_from)
        .transpose()
}

/// Lists the sites of a client.
///
/// # Errors
///
/// Returns an error if the query fails or a stored status is unknown.
pub fn list_sites_for_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Vec<Site>, PersistenceError> {
    let rows: Vec<SiteRow> = sites::table
        .filter(sites::client_id.eq(client_id))
        .order(sites::site_id.asc())
        .select(SiteRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Site::try_from).collect()
}

/// Finds a contract by id.
///
/// # Errors
///
/// Returns an error if the query fails or a stored date is malformed.
pub fn find_contract(
    conn: &mut SqliteConnection,
    contract_id: i64,
) -> Result<Option<Contract>, PersistenceError> {
    contracts::table
        .filter(contracts::contract_id.eq(contract_id))
        .select(ContractRow::as_select())
        .first(conn)
        .optional()?
        .map(Contract::try_from)
        .transpose()
}

/// Lists the contracts of a client.
///
/// # Errors
///
/// Returns an error if the query fails or a stored date is malformed.
pub fn list_contracts_for_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Vec<Contract>, PersistenceError> {
    let rows: Vec<ContractRow> = contracts::table
        .filter(contracts::client_id.eq(client_id))
        .order(contracts::contract_id.asc())
        .select(ContractRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Contract::try_from).collect()
}

/// Lists the contracts covering a site.
///
/// # Errors
///
/// Returns an error if the query fails or a stored date is malformed.
pub fn list_contracts_for_site(
    conn: &mut SqliteConnection,
    site_id: i64,
) -> Result<Vec<Contract>, PersistenceError> {
    let rows: Vec<ContractRow> = contracts::table
        .inner_join(contract_sites::table)
        .filter(contract_sites::site_id.eq(site_id))
        .order(contracts::contract_id.asc())
        .select(ContractRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Contract::try_from).collect()
}

/// Finds an association by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_association(
    conn: &mut SqliteConnection,
    association_id: i64,
) -> Result<Option<Association>, PersistenceError> {
    Ok(associations::table
        .filter(associations::association_id.eq(association_id))
        .select(AssociationRow::as_select())
        .first(conn)
        .optional()?
        .map(Association::from))
}

/// Lists the site ids linked to an association.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_association_site_ids(
    conn: &mut SqliteConnection,
    association_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(association_sites::table
        .filter(association_sites::association_id.eq(association_id))
        .order(association_sites::site_id.asc())
        .select(association_sites::site_id)
        .load(conn)?)
}

/// Lists the staff assigned to an association.
///
/// # Errors
///
/// Returns an error if the query fails or a stored kind is unknown.
pub fn list_association_assignments(
    conn: &mut SqliteConnection,
    association_id: i64,
) -> Result<Vec<Assignment>, PersistenceError> {
    let rows: Vec<AssignmentRow> = association_assignments::table
        .filter(association_assignments::association_id.eq(association_id))
        .order(association_assignments::user_id.asc())
        .select((
            association_assignments::user_id,
            association_assignments::kind,
            association_assignments::role_label,
        ))
        .load(conn)?;
    rows.into_iter().map(assignment_from_row).collect()
}

/// Finds a DOE by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_doe(conn: &mut SqliteConnection, doe_id: i64) -> Result<Option<Doe>, PersistenceError> {
    Ok(does::table
        .filter(does::doe_id.eq(doe_id))
        .select(DoeRow::as_select())
        .first(conn)
        .optional()?
        .map(Doe::from))
}

/// Finds an affaire by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_affaire(
    conn: &mut SqliteConnection,
    affaire_id: i64,
) -> Result<Option<Affaire>, PersistenceError> {
    Ok(affaires::table
        .filter(affaires::affaire_id.eq(affaire_id))
        .select(AffaireRow::as_select())
        .first(conn)
        .optional()?
        .map(Affaire::from))
}

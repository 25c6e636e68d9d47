// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk site import from CSV.
//!
//! The file is validated row by row first. Invalid rows are reported and
//! skipped; the valid rows are created for the client in one transaction.
//! Expected header: `name,address_line1,postal_code,city,comment`.

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use fieldops::{ImportedSite, NewAddress, import_sites, validate_address};
use fieldops_domain::validate_required;
use fieldops_persistence::Persistence;

use crate::auth::{AuthorizationService, RequestContext};
use crate::error::{ApiError, translate_persistence_error};
use crate::lookup::{persist, require};
use crate::request_response::ImportSitesRequest;

/// A single row result from CSV validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRowResult {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub comment: Option<String>,
    pub status: CsvRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<String>,
    /// The created site, once imported.
    pub site_id: Option<i64>,
}

/// Status of a CSV row validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and is skipped.
    Invalid,
}

/// Result of a CSV preview or import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteImportResult {
    pub client_id: i64,
    pub rows: Vec<SiteRowResult>,
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// True when the valid rows were created.
    pub imported: bool,
    /// The audit event of the import, when it happened.
    pub event_id: Option<i64>,
}

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &["name", "address_line1", "postal_code", "city"];

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, ApiError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !header_map.contains_key(*required))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Validates one parsed row; `seen` holds the normalized names met so far.
fn validate_row(row: &mut SiteRowResult, seen: &mut HashSet<String>) {
    let name = row.name.clone().unwrap_or_default();
    if let Err(e) = validate_required("name", &name) {
        row.errors.push(e.to_string());
    }
    if let Err(e) = validate_address(&address_of(row)) {
        row.errors.push(e.to_string());
    }

    let key = name.trim().to_lowercase();
    if !key.is_empty() && !seen.insert(key) {
        row.errors
            .push(format!("name: duplicate within CSV - '{}' appears more than once", name.trim()));
    }

    if !row.errors.is_empty() {
        row.status = CsvRowStatus::Invalid;
    }
}

fn address_of(row: &SiteRowResult) -> NewAddress {
    NewAddress {
        line1: row.address_line1.clone().unwrap_or_default(),
        line2: None,
        postal_code: row.postal_code.clone().unwrap_or_default(),
        city: row.city.clone().unwrap_or_default(),
        country: None,
    }
}

/// Previews and validates CSV site data without persisting.
///
/// # Errors
///
/// Returns `InvalidCsvFormat` if the header row is unreadable or lacks a
/// required column.
pub fn preview_site_csv(csv_content: &str) -> Result<Vec<SiteRowResult>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let mut rows: Vec<SiteRowResult> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        let record: StringRecord = match result {
            Ok(rec) => rec,
            Err(e) => {
                rows.push(SiteRowResult {
                    row_number,
                    name: None,
                    address_line1: None,
                    postal_code: None,
                    city: None,
                    comment: None,
                    status: CsvRowStatus::Invalid,
                    errors: vec![format!("CSV parse error: {e}")],
                    site_id: None,
                });
                continue;
            }
        };

        let get_field = |name: &str| -> Option<String> {
            header_map
                .get(name)
                .and_then(|&idx| record.get(idx))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut row = SiteRowResult {
            row_number,
            name: get_field("name"),
            address_line1: get_field("address_line1"),
            postal_code: get_field("postal_code"),
            city: get_field("city"),
            comment: get_field("comment"),
            status: CsvRowStatus::Valid,
            errors: Vec::new(),
            site_id: None,
        };
        validate_row(&mut row, &mut seen);
        rows.push(row);
    }

    Ok(rows)
}

/// Validates a CSV of sites and, unless previewing, creates the valid rows
/// for the client.
///
/// Names already used by one of the client's sites are rejected per row.
///
/// # Errors
///
/// * `Unauthorized` unless the actor is an admin
/// * `ResourceNotFound` for an unknown client
/// * `InvalidCsvFormat` for an unreadable header
/// * `InvalidInput` if an import is requested and no row is valid
pub fn import_sites_csv(
    persistence: &mut Persistence,
    ctx: &RequestContext,
    client_id: i64,
    request: &ImportSitesRequest,
) -> Result<SiteImportResult, ApiError> {
    AuthorizationService::require_admin(&ctx.actor, "import_sites")?;
    let client = require(persistence.find_client(client_id), "client", client_id)?;

    let existing: HashSet<String> = persistence
        .list_sites_for_client(client_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(|s| s.name.trim().to_lowercase())
        .collect();

    let mut rows = preview_site_csv(&request.csv_content)?;
    for row in &mut rows {
        let taken = row
            .name
            .as_deref()
            .is_some_and(|n| existing.contains(&n.trim().to_lowercase()));
        if taken {
            row.errors.push(format!(
                "name: client {client_id} already has a site named '{}'",
                row.name.as_deref().unwrap_or_default()
            ));
            row.status = CsvRowStatus::Invalid;
        }
    }

    let valid_count = rows
        .iter()
        .filter(|r| r.status == CsvRowStatus::Valid)
        .count();
    let mut result = SiteImportResult {
        client_id,
        total_rows: rows.len(),
        valid_count,
        invalid_count: rows.len() - valid_count,
        rows,
        imported: false,
        event_id: None,
    };
    if request.preview_only {
        return Ok(result);
    }
    if valid_count == 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("csv_content"),
            message: String::from("the file contains no valid site row"),
        });
    }

    let sites: Vec<ImportedSite> = result
        .rows
        .iter()
        .filter(|r| r.status == CsvRowStatus::Valid)
        .map(|r| ImportedSite {
            name: r.name.clone().unwrap_or_default(),
            address: address_of(r),
            comment: r.comment.clone(),
        })
        .collect();

    let persisted = persist(persistence, import_sites(&client, sites, &ctx.operation()))?;
    let mut created = persisted.created_ids.iter().copied();
    for row in result
        .rows
        .iter_mut()
        .filter(|r| r.status == CsvRowStatus::Valid)
    {
        row.site_id = created.next();
    }
    result.imported = true;
    result.event_id = Some(persisted.event_id);

    tracing::info!(
        client_id,
        imported = valid_count,
        skipped = result.invalid_count,
        "Imported sites from CSV"
    );
    Ok(result)
}

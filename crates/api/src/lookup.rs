// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store lookups shared by handlers and the relation resolver.

use fieldops::{CoreError, TransitionResult};
use fieldops_domain::{DomainError, parse_timestamp};
use fieldops_persistence::{PersistTransitionResult, Persistence, PersistenceError};
use time::OffsetDateTime;

use crate::error::{ApiError, translate_core_error, translate_persistence_error};

/// Unwraps a lookup addressed by a path id: a miss is a 404.
pub fn require<T>(
    found: Result<Option<T>, PersistenceError>,
    entity: &'static str,
    id: i64,
) -> Result<T, ApiError> {
    found
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from(entity),
            message: format!("{entity} {id} not found"),
        })
}

/// Unwraps a lookup addressed by an id from the request body: a miss is
/// invalid input.
pub fn require_referenced<T>(
    found: Result<Option<T>, PersistenceError>,
    field: &'static str,
    id: i64,
) -> Result<T, ApiError> {
    found
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from(field),
            message: format!("{id} does not resolve"),
        })
}

/// Resolves an optional lookup without judging a miss.
///
/// Used for ids carried in a request body: the lifecycle engine decides
/// whether an unresolved reference is an error.
pub fn optional<T>(found: Result<Option<T>, PersistenceError>) -> Result<Option<T>, ApiError> {
    found.map_err(translate_persistence_error)
}

/// Resolves an id that may be absent from the request.
pub fn optional_by_id<T>(
    id: Option<i64>,
    find: impl FnOnce(i64) -> Result<Option<T>, PersistenceError>,
) -> Result<Option<T>, ApiError> {
    match id {
        Some(id) => optional(find(id)),
        None => Ok(None),
    }
}

/// Persists the outcome of a lifecycle operation.
pub fn persist(
    persistence: &mut Persistence,
    result: Result<TransitionResult, CoreError>,
) -> Result<PersistTransitionResult, ApiError> {
    let result = result.map_err(translate_core_error)?;
    persistence
        .persist_transition(&result)
        .map_err(translate_persistence_error)
}

/// Id of the entity a persisted operation created.
pub fn created_id(persisted: &PersistTransitionResult) -> Result<i64, ApiError> {
    persisted.created_id().ok_or_else(|| ApiError::Internal {
        message: String::from("the store reported no created id"),
    })
}

/// Parses an optional RFC 3339 timestamp from a request.
pub fn parse_optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, ApiError> {
    value
        .map(|v| parse_request_timestamp(field, v))
        .transpose()
}

/// Parses an RFC 3339 timestamp from a request.
pub fn parse_request_timestamp(field: &'static str, value: &str) -> Result<OffsetDateTime, ApiError> {
    parse_timestamp(value).map_err(|err| ApiError::InvalidInput {
        field: String::from(field),
        message: err.to_string(),
    })
}

/// Parses a status-like string through its `FromStr` implementation.
pub fn parse_field<T>(field: &'static str, value: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    value.parse::<T>().map_err(|err| ApiError::InvalidInput {
        field: String::from(field),
        message: err.to_string(),
    })
}

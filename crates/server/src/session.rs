// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction at the server boundary.
//!
//! The authenticating gateway in front of the server forwards the caller's
//! login in `X-Actor-Id`. The login is resolved against the user directory
//! so the role always comes from the store, never from the request.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use fieldops_api::{AuthenticationService, RequestContext};
use fieldops_audit::Cause;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// Header carrying the caller's login.
pub const ACTOR_HEADER: &str = "X-Actor-Id";
/// Optional correlation id recorded as the audit cause.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// The caller of a request, resolved and stamped with the request instant.
///
/// ```ignore
/// async fn handler(SessionActor(ctx): SessionActor) -> Result<Json<T>, HttpError> {
///     // ctx.actor, ctx.cause, ctx.now
/// }
/// ```
pub struct SessionActor(pub RequestContext);

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let login = header_value(&parts.headers, ACTOR_HEADER);
        if login.is_none() && parts.headers.contains_key(ACTOR_HEADER) {
            warn!("Actor header is not valid UTF-8");
        }

        let mut persistence = state.persistence.lock().await;
        let actor = AuthenticationService::authenticate(&mut persistence, login)?;
        drop(persistence);

        let description = format!("{} {}", parts.method, parts.uri.path());
        let cause_id = header_value(&parts.headers, REQUEST_ID_HEADER)
            .map_or_else(|| description.clone(), String::from);
        debug!(
            login = %actor.user.login,
            role = %actor.role(),
            cause = %cause_id,
            "Actor resolved"
        );

        Ok(Self(RequestContext::new(
            actor,
            Cause::new(cause_id, description),
            OffsetDateTime::now_utc(),
        )))
    }
}

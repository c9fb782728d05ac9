// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization middleware for Axum.
//!
//! Both are attached per route with `from_fn_with_state`:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/users", get(list_users))
//!     .route_layer(middleware::from_fn_with_state(Role::Admin, require_role))
//!     .route_layer(middleware::from_fn_with_state(verifier, authenticate));
//! ```
//!
//! `authenticate` must run before `require_role` (the outermost layer runs
//! first). Several role requirements compose by stacking several
//! `require_role` layers.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::{AuthError, Claims, Role, TokenVerifier};

/// Extract the bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MissingCredential)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

/// Verify the bearer token and attach its [`Claims`] to the request.
///
/// Every verification failure becomes the same 401 response; the precise
/// reason is only logged.
pub async fn authenticate(
    State(verifier): State<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = bearer_token(request.headers())
        .and_then(|token| verifier.verify(token, Utc::now()));

    match verified {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(AuthError::MissingCredential) => {
            tracing::debug!(path = %request.uri().path(), "Request without bearer credential");
            AuthError::MissingCredential.into_response()
        }
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = %e,
                "Rejected bearer token"
            );
            e.into_response()
        }
    }
}

/// Decide whether `claims` satisfy `required`.
///
/// `None` means authentication never ran for this request, which is a
/// routing bug rather than a bad request.
pub fn authorize(claims: Option<&Claims>, required: Role) -> Result<(), AuthError> {
    let claims = claims.ok_or(AuthError::ClaimsMissing)?;

    if claims.has_role(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Reject requests whose claims do not hold the route's required role.
pub async fn require_role(State(required): State<Role>, request: Request, next: Next) -> Response {
    match authorize(request.extensions().get::<Claims>(), required) {
        Ok(()) => next.run(request).await,
        Err(AuthError::ClaimsMissing) => {
            tracing::error!(
                path = %request.uri().path(),
                required_role = %required,
                "Role check ran without authenticated claims; authenticate layer is missing"
            );
            AuthError::ClaimsMissing.into_response()
        }
        Err(e) => {
            tracing::debug!(
                path = %request.uri().path(),
                required_role = %required,
                "Caller lacks required role"
            );
            e.into_response()
        }
    }
}

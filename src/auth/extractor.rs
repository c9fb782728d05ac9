// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers and login credentials.
//!
//! Use the `Auth` extractor in handlers behind the `authenticate` layer:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.subject() is the caller's user id
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine};

use super::{AuthError, Claims};

const BASIC_AUTH_REQUIRED: &str = "must provide email and password in Basic auth";

/// Claims attached by the `authenticate` middleware.
///
/// Rejects with [`AuthError::ClaimsMissing`] when the route was registered
/// without authentication.
#[derive(Debug, Clone)]
pub struct Auth(pub Claims);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Claims>() {
            Some(claims) => Ok(Auth(claims.clone())),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "Handler expected claims but the route is not authenticated"
                );
                Err(AuthError::ClaimsMissing)
            }
        }
    }
}

/// Email and password from an `Authorization: Basic` header.
pub struct BasicCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BasicCredentials {
    fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (email, password) = decoded.split_once(':')?;

        if email.is_empty() {
            return None;
        }

        Some(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(BasicCredentials::parse)
            .ok_or_else(|| AuthError::AuthenticationFailure(BASIC_AUTH_REQUIRED.to_string()))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization failures.
///
/// The token-verification variants (`MalformedToken` through `TokenExpired`)
/// are kept distinct for server-side diagnostics but all render as the same
/// `401 unauthorized` response, so callers cannot tell which check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer credential on the request
    #[error("Authorization header with a bearer token is required")]
    MissingCredential,
    /// Token structure, encoding or payload is invalid
    #[error("Token is malformed")]
    MalformedToken,
    /// Token declares an algorithm other than the one this service signs with
    #[error("Token algorithm {found} does not match expected {expected}")]
    AlgorithmMismatch { expected: String, found: String },
    /// Token names a key this service does not trust
    #[error("Token key id {0:?} is not recognized")]
    UnknownKeyId(String),
    /// Token signature does not verify
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token is past its expiry
    #[error("Token has expired")]
    TokenExpired,
    /// Caller is authenticated but lacks the required role
    #[error("Insufficient permissions for this operation")]
    Forbidden,
    /// Claims were expected in the request but authentication never ran
    #[error("Claims missing from request context")]
    ClaimsMissing,
    /// Login credentials were missing or did not match
    #[error("{0}")]
    AuthenticationFailure(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// True for failures produced while verifying a presented token.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::AlgorithmMismatch { .. }
                | AuthError::UnknownKeyId(_)
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
        )
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedToken
            | AuthError::AlgorithmMismatch { .. }
            | AuthError::UnknownKeyId(_)
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => "unauthorized",
            AuthError::Forbidden => "forbidden",
            AuthError::ClaimsMissing => "internal_error",
            AuthError::AuthenticationFailure(_) => "authentication_failure",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::MalformedToken
            | AuthError::AlgorithmMismatch { .. }
            | AuthError::UnknownKeyId(_)
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::ClaimsMissing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        if self.is_token_rejection() {
            "Unauthorized".to_string()
        } else if matches!(self, AuthError::ClaimsMissing) {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. structure: three base64url segments and a JSON header
//! 2. the header `alg` equals the registry's algorithm, exactly
//! 3. the header `kid` resolves to a trusted key
//! 4. the signature verifies under that key
//! 5. the payload deserializes into [`Claims`]
//! 6. `now` is before the expiry
//!
//! `now` is supplied by the caller, so verification never reads the clock.

use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, Validation};
use serde::Deserialize;

use super::claims::Claims;
use super::error::AuthError;
use super::keys::KeyRegistry;

/// Tokens above this size are rejected before any decoding.
const MAX_TOKEN_BYTES: usize = 8 * 1024;

#[derive(Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// Recovers [`Claims`] from untrusted token strings.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyRegistry>,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyRegistry>) -> Self {
        Self { keys }
    }

    /// Registry this verifier reads keys from.
    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    /// Verify `token` as of `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        if token.len() > MAX_TOKEN_BYTES {
            return Err(AuthError::MalformedToken);
        }

        let header = parse_structure(token)?;

        let expected = self.keys.algorithm();
        match Algorithm::from_str(&header.alg) {
            Ok(algorithm) if algorithm == expected => {}
            _ => {
                return Err(AuthError::AlgorithmMismatch {
                    expected: format!("{expected:?}"),
                    found: header.alg,
                })
            }
        }

        let key_id = header.kid.ok_or(AuthError::MalformedToken)?;
        let key = self.keys.lookup(&key_id)?;

        let mut validation = Validation::new(expected);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if now.timestamp() >= claims.expires_at() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Check the three-segment shape and read the header.
fn parse_structure(token: &str) -> Result<TokenHeader, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken);
    };

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedToken)?;
    URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::MalformedToken)?;

    serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)
}

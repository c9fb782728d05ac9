// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Header};

use super::claims::{Claims, InvalidClaimsWindow};
use super::keys::{KeyError, KeyRegistry};
use super::roles::Role;

/// Mints signed, time-bounded tokens with the registry's active key.
///
/// Issuance touches no store and keeps no state; the token is a pure
/// function of the inputs and the signing key.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyRegistry>,
    lifetime_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer whose tokens live for `lifetime` (whole seconds).
    pub fn new(keys: Arc<KeyRegistry>, lifetime: Duration) -> Result<Self, KeyError> {
        let lifetime_secs = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
        if lifetime_secs <= 0 {
            return Err(KeyError::InvalidLifetime(InvalidClaimsWindow {
                issued_at: 0,
                expires_at: lifetime_secs,
            }));
        }

        Ok(Self {
            keys,
            lifetime_secs,
        })
    }

    /// Issue a token for `subject` holding `roles`, valid from `now` until
    /// `now + lifetime`.
    pub fn issue(
        &self,
        subject: &str,
        roles: impl IntoIterator<Item = Role>,
        now: DateTime<Utc>,
    ) -> Result<String, KeyError> {
        let issued_at = now.timestamp();
        let expires_at = issued_at.saturating_add(self.lifetime_secs);
        let claims = Claims::new(subject, roles, issued_at, expires_at)?;

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, KeyError> {
        let (key_id, encoding, algorithm) = self.keys.signing_key();

        let mut header = Header::new(algorithm);
        header.kid = Some(key_id.to_string());

        Ok(encode(&header, claims, encoding)?)
    }
}

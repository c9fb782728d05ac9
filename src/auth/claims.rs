// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims: the identity and roles a token asserts.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::roles::Role;

/// Returned when a claims window does not satisfy `iat < exp`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token expiry ({expires_at}) must be after issuance ({issued_at})")]
pub struct InvalidClaimsWindow {
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Claims carried in a token payload.
///
/// Serialized as `{"sub", "roles", "iat", "exp"}` with Unix-second
/// timestamps. A `Claims` value is immutable and is always exactly what the
/// payload held: deserialization rejects missing fields, unknown fields,
/// unknown role names and an expiry that is not after issuance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct Claims {
    #[serde(rename = "sub")]
    subject: String,
    roles: BTreeSet<Role>,
    #[serde(rename = "iat")]
    issued_at: i64,
    #[serde(rename = "exp")]
    expires_at: i64,
}

/// Wire shape, validated into [`Claims`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClaims {
    sub: String,
    roles: BTreeSet<Role>,
    iat: i64,
    exp: i64,
}

impl TryFrom<RawClaims> for Claims {
    type Error = InvalidClaimsWindow;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        Claims::new(raw.sub, raw.roles, raw.iat, raw.exp)
    }
}

impl Claims {
    /// Build claims for `subject`. Duplicate roles collapse.
    pub fn new(
        subject: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Self, InvalidClaimsWindow> {
        if expires_at <= issued_at {
            return Err(InvalidClaimsWindow {
                issued_at,
                expires_at,
            });
        }

        Ok(Self {
            subject: subject.into(),
            roles: roles.into_iter().collect(),
            issued_at,
            expires_at,
        })
    }

    /// Identifier of the authenticated principal.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Issuance time, Unix seconds.
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Expiry time, Unix seconds. The token is invalid from this instant on.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Membership test against the role set.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// The subject identifies a user and is kept out of logs.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("iat", &self.issued_at)
            .field("exp", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_roles_collapse() {
        let claims = Claims::new("u1", [Role::User, Role::User, Role::Admin], 100, 200).unwrap();
        assert_eq!(claims.roles().len(), 2);
        assert!(claims.has_role(Role::Admin));
        assert!(claims.has_role(Role::User));
    }

    #[test]
    fn expiry_must_follow_issuance() {
        assert_eq!(
            Claims::new("u1", [Role::User], 200, 200),
            Err(InvalidClaimsWindow {
                issued_at: 200,
                expires_at: 200
            })
        );
        assert!(Claims::new("u1", [Role::User], 200, 100).is_err());
    }

    #[test]
    fn serializes_with_registered_claim_names() {
        let claims = Claims::new("u1", [Role::Admin], 100, 200).unwrap();
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"sub": "u1", "roles": ["ADMIN"], "iat": 100, "exp": 200})
        );
    }

    #[test]
    fn deserialization_is_lossless() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"u1","roles":["USER","ADMIN"],"iat":1,"exp":2}"#)
                .unwrap();
        assert_eq!(claims, Claims::new("u1", [Role::Admin, Role::User], 1, 2).unwrap());
    }

    #[test]
    fn deserialization_rejects_missing_or_unknown_fields() {
        assert!(serde_json::from_str::<Claims>(r#"{"sub":"u1","iat":1,"exp":2}"#).is_err());
        assert!(serde_json::from_str::<Claims>(
            r#"{"sub":"u1","roles":[],"iat":1,"exp":2,"admin":true}"#
        )
        .is_err());
    }

    #[test]
    fn deserialization_rejects_inverted_window() {
        assert!(serde_json::from_str::<Claims>(r#"{"sub":"u1","roles":[],"iat":5,"exp":2}"#).is_err());
    }

    #[test]
    fn debug_redacts_subject() {
        let claims = Claims::new("user-secret-id", [Role::User], 1, 2).unwrap();
        let debug = format!("{claims:?}");
        assert!(!debug.contains("user-secret-id"));
        assert!(debug.contains("[REDACTED]"));
    }
}

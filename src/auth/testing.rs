// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed RSA key fixtures for unit tests.

use std::sync::Arc;

use jsonwebtoken::{jwk::JwkSet, Algorithm};

use super::keys::KeyRegistry;

pub const PRIMARY_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_primary.pem");
pub const ROTATED_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_rotated.pem");
const RETIRED_JWKS: &str = include_str!("../../tests/fixtures/retired_jwks.json");

/// Registry signing RS256 with the primary key under id `primary`.
pub fn primary_registry() -> KeyRegistry {
    KeyRegistry::from_rsa_pem("primary", Algorithm::RS256, PRIMARY_KEY_PEM.as_bytes())
        .expect("primary fixture key loads")
}

pub fn shared_primary_registry() -> Arc<KeyRegistry> {
    Arc::new(primary_registry())
}

/// Registry signing with the rotated key under the id it carries in the
/// retired JWK set, i.e. the registry that was live before rotation.
pub fn retired_registry() -> KeyRegistry {
    KeyRegistry::from_rsa_pem("2024-retired", Algorithm::RS256, ROTATED_KEY_PEM.as_bytes())
        .expect("rotated fixture key loads")
}

/// JWK set holding the public half of [`ROTATED_KEY_PEM`] as `2024-retired`.
pub fn retired_jwks() -> JwkSet {
    serde_json::from_str(RETIRED_JWKS).expect("retired JWKS fixture parses")
}

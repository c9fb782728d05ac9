// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key material.
//!
//! A [`KeyRegistry`] holds the one private key this instance signs with and
//! every public key it accepts tokens from, indexed by key id. The registry
//! is built once at startup and never mutated; rotating keys means building
//! a new registry that keeps the retired public keys alongside the new
//! signing key, so tokens minted before the rotation stay valid until they
//! expire.
//!
//! ## Key sources
//!
//! - Signing key: RSA private key PEM, PKCS#8 (`PRIVATE KEY`) or PKCS#1
//!   (`RSA PRIVATE KEY`). Its public half is trusted under the same key id.
//! - Retired keys: a JWK set of RSA public keys, each with a `kid`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::signature::RsaKeyPair;
use thiserror::Error;

use super::claims::InvalidClaimsWindow;
use super::error::AuthError;

/// Failures while loading key material. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to read key file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid PEM: {0}")]
    Pem(#[from] pem::PemError),
    #[error("unsupported PEM block {0:?}, expected an RSA private key")]
    UnsupportedPemTag(String),
    #[error("invalid RSA private key: {0}")]
    InvalidPrivateKey(String),
    #[error("algorithm {0} is not an RSA signature scheme")]
    UnsupportedAlgorithm(String),
    #[error("invalid JWK set: {0}")]
    InvalidJwks(String),
    #[error("key id {0:?} is registered more than once")]
    DuplicateKeyId(String),
    #[error("signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("key pair self-check failed: {0}")]
    SelfCheck(String),
    #[error("invalid token lifetime: {0}")]
    InvalidLifetime(#[from] InvalidClaimsWindow),
}

/// The active issuance key.
struct SigningKey {
    key_id: String,
    algorithm: Algorithm,
    encoding: EncodingKey,
}

/// Immutable set of signing and verification keys.
pub struct KeyRegistry {
    signing: SigningKey,
    verification: HashMap<String, DecodingKey>,
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("signing_key_id", &self.signing.key_id)
            .field("algorithm", &self.signing.algorithm)
            .field("trusted_key_ids", &self.key_ids())
            .finish()
    }
}

/// Name of an RSA signature algorithm as it appears in a token header.
///
/// Returns `None` for every non-RSA algorithm.
pub fn rsa_algorithm_name(algorithm: Algorithm) -> Option<&'static str> {
    match algorithm {
        Algorithm::RS256 => Some("RS256"),
        Algorithm::RS384 => Some("RS384"),
        Algorithm::RS512 => Some("RS512"),
        Algorithm::PS256 => Some("PS256"),
        Algorithm::PS384 => Some("PS384"),
        Algorithm::PS512 => Some("PS512"),
        _ => None,
    }
}

impl KeyRegistry {
    /// Build a registry from an RSA private key PEM.
    ///
    /// The derived public key is trusted under `key_id`. A sign-then-verify
    /// round trip runs before returning so unusable key material is caught
    /// here rather than on the first login.
    pub fn from_rsa_pem(
        key_id: impl Into<String>,
        algorithm: Algorithm,
        private_pem: &[u8],
    ) -> Result<Self, KeyError> {
        if rsa_algorithm_name(algorithm).is_none() {
            return Err(KeyError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }

        let block = pem::parse(private_pem)?;
        let key_pair = match block.tag() {
            "PRIVATE KEY" => RsaKeyPair::from_pkcs8(block.contents()),
            "RSA PRIVATE KEY" => RsaKeyPair::from_der(block.contents()),
            other => return Err(KeyError::UnsupportedPemTag(other.to_string())),
        }
        .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;

        let key_id = key_id.into();
        let encoding = EncodingKey::from_rsa_pem(private_pem)?;
        let decoding = DecodingKey::from_rsa_der(key_pair.public().as_ref());

        let mut verification = HashMap::new();
        verification.insert(key_id.clone(), decoding);

        let registry = Self {
            signing: SigningKey {
                key_id,
                algorithm,
                encoding,
            },
            verification,
        };
        registry.self_check()?;

        tracing::info!(
            key_id = %registry.signing.key_id,
            algorithm = ?algorithm,
            "Loaded signing key"
        );

        Ok(registry)
    }

    /// Trust additional RSA public keys, typically retired signing keys.
    pub fn with_jwks(mut self, jwks: &JwkSet) -> Result<Self, KeyError> {
        for jwk in &jwks.keys {
            let key_id = jwk
                .common
                .key_id
                .clone()
                .ok_or_else(|| KeyError::InvalidJwks("key without kid".to_string()))?;

            let decoding = match &jwk.algorithm {
                AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                    .map_err(|e| KeyError::InvalidJwks(format!("key {key_id:?}: {e}")))?,
                _ => {
                    return Err(KeyError::InvalidJwks(format!(
                        "key {key_id:?} is not an RSA key"
                    )))
                }
            };

            if self.verification.contains_key(&key_id) {
                return Err(KeyError::DuplicateKeyId(key_id));
            }

            tracing::info!(key_id = %key_id, "Trusting retired verification key");
            self.verification.insert(key_id, decoding);
        }

        Ok(self)
    }

    /// Load the signing key and, optionally, a JWK set of retired keys.
    pub fn load(
        key_id: &str,
        algorithm: Algorithm,
        private_key_file: &Path,
        retired_jwks_file: Option<&Path>,
    ) -> Result<Self, KeyError> {
        let private_pem = read_file(private_key_file)?;
        let registry = Self::from_rsa_pem(key_id, algorithm, &private_pem)?;

        match retired_jwks_file {
            Some(path) => {
                let raw = read_file(path)?;
                let jwks: JwkSet = serde_json::from_slice(&raw)
                    .map_err(|e| KeyError::InvalidJwks(e.to_string()))?;
                registry.with_jwks(&jwks)
            }
            None => Ok(registry),
        }
    }

    /// Resolve a key id to the public key that verifies its tokens.
    pub fn lookup(&self, key_id: &str) -> Result<&DecodingKey, AuthError> {
        self.verification
            .get(key_id)
            .ok_or_else(|| AuthError::UnknownKeyId(key_id.to_string()))
    }

    /// The active issuance key: id, private key and algorithm.
    pub fn signing_key(&self) -> (&str, &EncodingKey, Algorithm) {
        (
            &self.signing.key_id,
            &self.signing.encoding,
            self.signing.algorithm,
        )
    }

    /// The single algorithm this registry signs and verifies with.
    pub fn algorithm(&self) -> Algorithm {
        self.signing.algorithm
    }

    /// Every trusted key id, sorted.
    pub fn key_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.verification.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn self_check(&self) -> Result<(), KeyError> {
        let (key_id, encoding, algorithm) = self.signing_key();

        let mut header = Header::new(algorithm);
        header.kid = Some(key_id.to_string());
        let token = encode(&header, &serde_json::json!({ "check": key_id }), encoding)?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let decoding = self
            .lookup(key_id)
            .map_err(|e| KeyError::SelfCheck(e.to_string()))?;
        decode::<serde_json::Value>(&token, decoding, &validation)
            .map_err(|e| KeyError::SelfCheck(e.to_string()))?;

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, KeyError> {
    std::fs::read(path).map_err(|source| KeyError::Read {
        path: path.to_path_buf(),
        source,
    })
}

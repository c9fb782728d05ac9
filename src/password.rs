// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! bcrypt password hashing.
//!
//! Hashing and verification run on the blocking thread pool; a cost-12
//! bcrypt round takes long enough to stall an async worker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hashes and checks passwords at a fixed bcrypt cost.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Create a hasher. Computes one hash up front, used to spend the same
    /// time on logins for unknown emails as for known ones.
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a new password.
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// Check `password` against `hash`.
    ///
    /// With no hash the dummy hash is checked instead and the result is
    /// always `false`.
    pub async fn verify(&self, password: &str, hash: Option<&str>) -> Result<bool, PasswordError> {
        let known = hash.is_some();
        let password = password.to_owned();
        let hash = hash.unwrap_or(self.dummy_hash.as_str()).to_owned();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        Ok(known && matches)
    }
}

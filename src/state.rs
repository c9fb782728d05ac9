// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{TokenIssuer, TokenVerifier};
use crate::password::PasswordHasher;
use crate::storage::DocumentStore;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    store: Arc<DocumentStore>,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(
        store: DocumentStore,
        issuer: TokenIssuer,
        verifier: TokenVerifier,
        passwords: PasswordHasher,
    ) -> Self {
        Self {
            store: Arc::new(store),
            issuer,
            verifier,
            passwords,
        }
    }

    /// The initialized document store.
    pub fn storage(&self) -> &DocumentStore {
        &self.store
    }
}

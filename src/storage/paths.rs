// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the document store layout.

use std::path::{Path, PathBuf};

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all users.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Advert Paths ==========

    /// Directory containing all adverts.
    pub fn adverts_dir(&self) -> PathBuf {
        self.root.join("adverts")
    }

    /// Path to a specific advert document.
    pub fn advert(&self, advert_id: &str) -> PathBuf {
        self.adverts_dir().join(format!("{advert_id}.json"))
    }
}

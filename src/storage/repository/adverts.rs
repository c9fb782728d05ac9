// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Advert repository.
//!
//! Each advert is stored as a separate JSON file under `adverts/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStore, StorageError, StorageResult};

/// Who to talk to about an advert.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Advert stored in the document store and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredAdvert {
    /// Unique advert identifier (UUID)
    pub id: String,
    /// Display name of the advertiser
    pub advertiser: String,
    /// Size of the advertisement
    pub size: String,
    /// Editions the advertisement is printed in
    pub editions: Vec<String>,
    /// Publication year
    pub year: String,
    /// States the advertisement runs in
    pub state: Vec<String>,
    pub contact: ContactDetails,
    /// When the advert was created
    pub date_created: DateTime<Utc>,
    /// When the advert was last modified
    pub date_modified: DateTime<Utc>,
}

/// Repository for advert documents.
pub struct AdvertRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> AdvertRepository<'a> {
    /// Create a new AdvertRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if an advert exists.
    pub fn exists(&self, advert_id: &str) -> bool {
        self.storage.exists(self.storage.paths().advert(advert_id))
    }

    /// Get an advert by ID.
    pub fn get(&self, advert_id: &str) -> StorageResult<StoredAdvert> {
        let path = self.storage.paths().advert(advert_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Advert {advert_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new advert.
    pub fn create(&self, advert: &StoredAdvert) -> StorageResult<()> {
        if self.exists(&advert.id) {
            return Err(StorageError::AlreadyExists(format!("Advert {}", advert.id)));
        }

        self.storage
            .write_json(self.storage.paths().advert(&advert.id), advert)
    }

    /// Replace an existing advert.
    pub fn update(&self, advert: &StoredAdvert) -> StorageResult<()> {
        if !self.exists(&advert.id) {
            return Err(StorageError::NotFound(format!("Advert {}", advert.id)));
        }

        self.storage
            .write_json(self.storage.paths().advert(&advert.id), advert)
    }

    /// Delete an advert.
    pub fn delete(&self, advert_id: &str) -> StorageResult<()> {
        if !self.exists(advert_id) {
            return Err(StorageError::NotFound(format!("Advert {advert_id}")));
        }

        self.storage.delete(self.storage.paths().advert(advert_id))
    }

    /// List all adverts, oldest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredAdvert>> {
        let advert_ids = self
            .storage
            .list_files(self.storage.paths().adverts_dir(), "json")?;

        let mut adverts = Vec::new();
        for id in advert_ids {
            if let Ok(advert) = self.get(&id) {
                adverts.push(advert);
            }
        }

        adverts.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
        Ok(adverts)
    }
}

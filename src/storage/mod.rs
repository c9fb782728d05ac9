// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent JSON documents under the configured data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   users/
//!     {user_id}.json     # includes the bcrypt password hash
//!   adverts/
//!     {advert_id}.json
//! ```
//!
//! Identifiers are UUID v4 strings and timestamps are UTC truncated to
//! milliseconds.

pub mod documents;
pub mod paths;
pub mod repository;

use chrono::{DateTime, SubsecRound, Utc};

pub use documents::{DocumentStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{AdvertRepository, ContactDetails, StoredAdvert, StoredUser, UserRepository};

/// Timestamp precision kept in stored documents.
pub fn stored_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(3)
}

/// Fresh document identifier.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// True if `id` has the shape of a document identifier.
pub fn is_document_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

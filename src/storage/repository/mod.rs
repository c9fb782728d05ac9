// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides CRUD operations for one collection, using the
//! DocumentStore for all file operations.

pub mod adverts;
pub mod users;

pub use adverts::{AdvertRepository, ContactDetails, StoredAdvert};
pub use users::{StoredUser, UserRepository};

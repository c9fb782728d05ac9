// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Each user is stored as a separate JSON file under `users/`. The stored
//! form carries the bcrypt password hash and never leaves the service.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{DocumentStore, StorageError, StorageResult};
use crate::auth::Role;

/// User as persisted in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    pub email: String,
    /// Roles granted to this user
    pub roles: BTreeSet<Role>,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// When the user was created
    pub date_created: DateTime<Utc>,
    /// When the user was last modified
    pub date_modified: DateTime<Utc>,
}

/// Repository for user documents.
pub struct UserRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if a user exists.
    pub fn exists(&self, user_id: &str) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Find the user registered under `email`.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self.list_all()?.into_iter().find(|user| user.email == email))
    }

    /// Create a new user. Both the id and the email must be unused.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.exists(&user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }
        if self.find_by_email(&user.email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Replace an existing user.
    ///
    /// Fails with `AlreadyExists` if the new email belongs to another user.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        if !self.exists(&user.id) {
            return Err(StorageError::NotFound(format!("User {}", user.id)));
        }
        if let Some(other) = self.find_by_email(&user.email)? {
            if other.id != user.id {
                return Err(StorageError::AlreadyExists(format!(
                    "User with email {}",
                    user.email
                )));
            }
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Delete a user.
    pub fn delete(&self, user_id: &str) -> StorageResult<()> {
        if !self.exists(user_id) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }

        self.storage.delete(self.storage.paths().user(user_id))
    }

    /// List all users, oldest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let user_ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in user_ids {
            match self.get(&id) {
                Ok(user) => users.push(user),
                Err(e) => tracing::warn!(user_id = %id, error = %e, "Skipping unreadable user document"),
            }
        }

        users.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, DocumentStore) {
        let dir = TempDir::new().unwrap();
        let mut storage = DocumentStore::new(StoragePaths::new(dir.path()));
        storage.initialize().expect("Failed to initialize");
        (dir, storage)
    }

    fn test_user(id: &str, email: &str) -> StoredUser {
        let now = Utc::now();
        StoredUser {
            id: id.to_string(),
            name: "Anna Walker".to_string(),
            email: email.to_string(),
            roles: BTreeSet::from([Role::User]),
            password_hash: "$2b$04$placeholder".to_string(),
            date_created: now,
            date_modified: now,
        }
    }

    #[test]
    fn create_and_get_user() {
        let (_dir, storage) = test_storage();
        let repo = UserRepository::new(&storage);

        let user = test_user("u-1", "anna@example.com");
        repo.create(&user).unwrap();

        assert_eq!(repo.get("u-1").unwrap(), user);
        assert_eq!(
            repo.find_by_email("anna@example.com").unwrap().map(|u| u.id),
            Some("u-1".to_string())
        );
        assert!(repo.find_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_dir, storage) = test_storage();
        let repo = UserRepository::new(&storage);

        repo.create(&test_user("u-1", "anna@example.com")).unwrap();
        let result = repo.create(&test_user("u-2", "anna@example.com"));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn update_cannot_take_another_users_email() {
        let (_dir, storage) = test_storage();
        let repo = UserRepository::new(&storage);

        repo.create(&test_user("u-1", "anna@example.com")).unwrap();
        repo.create(&test_user("u-2", "ben@example.com")).unwrap();

        let mut ben = repo.get("u-2").unwrap();
        ben.email = "anna@example.com".to_string();
        assert!(matches!(
            repo.update(&ben),
            Err(StorageError::AlreadyExists(_))
        ));

        ben.email = "ben@example.com".to_string();
        ben.name = "Ben".to_string();
        repo.update(&ben).unwrap();
        assert_eq!(repo.get("u-2").unwrap().name, "Ben");
    }

    #[test]
    fn delete_and_missing_users() {
        let (_dir, storage) = test_storage();
        let repo = UserRepository::new(&storage);

        repo.create(&test_user("u-1", "anna@example.com")).unwrap();
        repo.delete("u-1").unwrap();

        assert!(matches!(repo.get("u-1"), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.delete("u-1"), Err(StorageError::NotFound(_))));
        assert!(matches!(
            repo.update(&test_user("u-1", "anna@example.com")),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn list_all_orders_by_creation() {
        let (_dir, storage) = test_storage();
        let repo = UserRepository::new(&storage);

        let mut older = test_user("zz", "old@example.com");
        older.date_created -= chrono::Duration::days(1);
        repo.create(&test_user("aa", "new@example.com")).unwrap();
        repo.create(&older).unwrap();

        let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["zz", "aa"]);
    }
}

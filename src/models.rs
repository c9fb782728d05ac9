// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Update payloads use `Option` fields so a client can send only the fields
//! it wants changed; an absent field is left untouched.
//!
//! ## Model Categories
//!
//! - **Users**: accounts, their roles and login tokens
//! - **Adverts**: advertisement bookings and their contacts

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::{ContactDetails, StoredUser};

// =============================================================================
// User Models
// =============================================================================

/// A user as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl From<StoredUser> for User {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles: user.roles,
            date_created: user.date_created,
            date_modified: user.date_modified,
        }
    }
}

/// Request body for creating a user.
#[derive(Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub password: String,
    pub password_confirm: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Reasons the request cannot be accepted, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if self.password.is_empty() {
            return Err("password is required".to_string());
        }
        if self.password != self.password_confirm {
            return Err("password and password_confirm do not match".to_string());
        }
        Ok(())
    }
}

/// Request body for updating a user. Every field is optional.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl std::fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl UpdateUser {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.roles.is_none()
            && self.password.is_none()
            && self.password_confirm.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("name must not be empty".to_string());
        }
        if matches!(&self.email, Some(email) if email.trim().is_empty()) {
            return Err("email must not be empty".to_string());
        }
        match (&self.password, &self.password_confirm) {
            (None, None) => Ok(()),
            (Some(password), Some(confirm)) if password == confirm && !password.is_empty() => {
                Ok(())
            }
            _ => Err("password and password_confirm do not match".to_string()),
        }
    }
}

/// Response of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token: String,
}

// =============================================================================
// Advert Models
// =============================================================================

/// Request body for creating an advert.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewAdvert {
    pub advertiser: String,
    #[serde(default)]
    pub size: Option<String>,
    pub contact: ContactDetails,
    pub editions: Vec<String>,
    pub year: String,
    pub state: Vec<String>,
}

impl NewAdvert {
    pub fn validate(&self) -> Result<(), String> {
        if self.advertiser.trim().is_empty() {
            return Err("advertiser is required".to_string());
        }
        if self.year.trim().is_empty() {
            return Err("year is required".to_string());
        }
        Ok(())
    }
}

/// Request body for updating an advert. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAdvert {
    pub advertiser: Option<String>,
    pub size: Option<String>,
    pub contact: Option<ContactDetails>,
    pub editions: Option<Vec<String>>,
    pub year: Option<String>,
    pub state: Option<Vec<String>>,
}

impl UpdateAdvert {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.advertiser.is_none()
            && self.size.is_none()
            && self.contact.is_none()
            && self.editions.is_none()
            && self.year.is_none()
            && self.state.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.advertiser, Some(a) if a.trim().is_empty()) {
            return Err("advertiser must not be empty".to_string());
        }
        if matches!(&self.year, Some(y) if y.trim().is_empty()) {
            return Err("year must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: "Anna".into(),
            email: "anna@example.com".into(),
            roles: BTreeSet::from([Role::User]),
            password: "gophers".into(),
            password_confirm: "gophers".into(),
        }
    }

    #[test]
    fn new_user_requires_matching_passwords() {
        assert!(new_user().validate().is_ok());

        let mut mismatch = new_user();
        mismatch.password_confirm = "other".into();
        assert!(mismatch.validate().is_err());

        let mut blank = new_user();
        blank.email = "  ".into();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn new_user_debug_hides_passwords() {
        assert!(!format!("{:?}", new_user()).contains("gophers"));
    }

    #[test]
    fn update_user_password_needs_confirmation() {
        let only_password = UpdateUser {
            password: Some("new".into()),
            ..Default::default()
        };
        assert!(only_password.validate().is_err());

        let confirmed = UpdateUser {
            password: Some("new".into()),
            password_confirm: Some("new".into()),
            ..Default::default()
        };
        assert!(confirmed.validate().is_ok());
        assert!(!format!("{confirmed:?}").contains("\"new\""));
    }

    #[test]
    fn empty_updates_are_detected() {
        assert!(UpdateUser::default().is_empty());
        assert!(UpdateAdvert::default().is_empty());

        let update: UpdateAdvert = serde_json::from_str(r#"{"year":"2027"}"#).unwrap();
        assert!(!update.is_empty());
    }

    #[test]
    fn user_response_omits_password_hash() {
        let now = Utc::now();
        let stored = StoredUser {
            id: "u-1".into(),
            name: "Anna".into(),
            email: "anna@example.com".into(),
            roles: BTreeSet::from([Role::Admin]),
            password_hash: "$2b$04$secret".into(),
            date_created: now,
            date_modified: now,
        };

        let json = serde_json::to_value(User::from(stored)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["roles"], serde_json::json!(["ADMIN"]));
    }

    #[test]
    fn new_advert_size_is_optional_and_year_required() {
        let advert: NewAdvert = serde_json::from_str(
            r#"{"advertiser":"Acme","contact":{"name":"Jo","email":"jo@acme.test","phone":"1"},
                "editions":["spring"],"year":"","state":["VIC"]}"#,
        )
        .unwrap();
        assert_eq!(advert.size, None);
        assert!(advert.validate().is_err());
    }
}

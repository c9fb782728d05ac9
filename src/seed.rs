// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! First-start administrator.

use std::collections::BTreeSet;

use crate::{
    api::users::create_user,
    auth::Role,
    config::SeedAdmin,
    error::ApiError,
    models::NewUser,
    state::AppState,
    storage::UserRepository,
};

const SEED_ADMIN_NAME: &str = "Administrator";

/// Create an ADMIN user for `seed` unless its email is already registered.
///
/// Returns whether a user was created.
pub async fn seed_admin(state: &AppState, seed: &SeedAdmin) -> Result<bool, ApiError> {
    if UserRepository::new(state.storage())
        .find_by_email(&seed.email)?
        .is_some()
    {
        tracing::info!(email = %seed.email, "Seed admin already present");
        return Ok(false);
    }

    let user = create_user(
        state,
        NewUser {
            name: SEED_ADMIN_NAME.to_string(),
            email: seed.email.clone(),
            roles: BTreeSet::from([Role::Admin, Role::User]),
            password: seed.password.clone(),
            password_confirm: seed.password.clone(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Seed admin created");
    Ok(true)
}

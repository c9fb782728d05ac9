// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management and login.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::require_document_id;
use crate::{
    auth::{Auth, AuthError, BasicCredentials, Role},
    error::ApiError,
    models::{NewUser, TokenResponse, UpdateUser, User},
    state::AppState,
    storage::{new_document_id, stored_timestamp, StoredUser, UserRepository},
};

const AUTHENTICATION_FAILED: &str = "authentication failed";

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [User]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = UserRepository::new(state.storage()).list_all()?;
    Ok(Json(users.into_iter().map(User::from).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = NewUser,
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = User),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid user")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;

    let user = create_user(&state, request).await?;
    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Hash the password and persist a new user.
pub async fn create_user(state: &AppState, request: NewUser) -> Result<StoredUser, ApiError> {
    let password_hash = state.passwords.hash(&request.password).await?;
    let now = stored_timestamp(Utc::now());

    let user = StoredUser {
        id: new_document_id(),
        name: request.name,
        email: request.email,
        roles: request.roles,
        password_hash,
        date_created: now,
        date_modified: now,
    };
    UserRepository::new(state.storage()).create(&user)?;

    Ok(user)
}

/// Get a user. Callers without the ADMIN role may only fetch themselves.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = User),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not this caller's user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn retrieve(
    Auth(claims): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    require_document_id(&id)?;

    if !claims.has_role(Role::Admin) && claims.subject() != id {
        return Err(AuthError::Forbidden.into());
    }

    let user = UserRepository::new(state.storage()).get(&id)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UpdateUser,
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid update")
    )
)]
pub async fn update(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<UpdateUser>,
) -> Result<StatusCode, ApiError> {
    require_document_id(&id)?;
    update.validate().map_err(ApiError::unprocessable)?;

    let repo = UserRepository::new(state.storage());
    let mut user = repo.get(&id)?;
    if update.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }

    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(email) = update.email {
        user.email = email;
    }
    if let Some(roles) = update.roles {
        user.roles = roles;
    }
    if let Some(password) = update.password {
        user.password_hash = state.passwords.hash(&password).await?;
    }
    user.date_modified = stored_timestamp(Utc::now());

    repo.update(&user)?;
    tracing::info!(user_id = %id, "User updated");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    require_document_id(&id)?;

    UserRepository::new(state.storage()).delete(&id)?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange HTTP Basic credentials for a bearer token.
#[utoipa::path(
    get,
    path = "/v1/users/token",
    tag = "Users",
    security(("basic_auth" = [])),
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Missing or wrong credentials")
    )
)]
pub async fn token(
    State(state): State<AppState>,
    credentials: BasicCredentials,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = UserRepository::new(state.storage()).find_by_email(&credentials.email)?;

    let password_ok = state
        .passwords
        .verify(
            &credentials.password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        )
        .await?;

    let user = match user {
        Some(user) if password_ok => user,
        _ => {
            tracing::info!("Login rejected");
            return Err(AuthError::AuthenticationFailure(AUTHENTICATION_FAILED.to_string()).into());
        }
    };

    let token = state
        .issuer
        .issue(&user.id, user.roles.iter().copied(), Utc::now())
        .map_err(ApiError::internal)?;

    tracing::info!(user_id = %user.id, "Token issued");
    Ok(Json(TokenResponse { token }))
}

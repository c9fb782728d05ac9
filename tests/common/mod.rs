// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Full-router harness shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use jsonwebtoken::{jwk::JwkSet, Algorithm};
use peeps_api::{
    api::{router, users::create_user},
    auth::{KeyRegistry, Role, TokenIssuer, TokenVerifier},
    models::NewUser,
    password::PasswordHasher,
    state::AppState,
    storage::{DocumentStore, StoragePaths, StoredUser},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

// Same fixtures and key ids as the unit-test registries in src/auth/testing.rs.
pub const PRIMARY_KEY_PEM: &str = include_str!("../fixtures/rsa_primary.pem");
pub const ROTATED_KEY_PEM: &str = include_str!("../fixtures/rsa_rotated.pem");
pub const RETIRED_JWKS: &str = include_str!("../fixtures/retired_jwks.json");

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "gophers";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "hunter22";

pub fn primary_registry() -> KeyRegistry {
    KeyRegistry::from_rsa_pem("primary", Algorithm::RS256, PRIMARY_KEY_PEM.as_bytes())
        .expect("primary fixture key loads")
}

/// The registry that was live before rotation.
pub fn retired_registry() -> KeyRegistry {
    KeyRegistry::from_rsa_pem("2024-retired", Algorithm::RS256, ROTATED_KEY_PEM.as_bytes())
        .expect("rotated fixture key loads")
}

pub fn retired_jwks() -> JwkSet {
    serde_json::from_str(RETIRED_JWKS).expect("retired JWKS fixture parses")
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _data_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_keys(primary_registry())
    }

    pub fn with_keys(keys: KeyRegistry) -> Self {
        let data_dir = TempDir::new().expect("temp dir");
        let mut store = DocumentStore::new(StoragePaths::new(data_dir.path()));
        store.initialize().expect("store initializes");

        let keys = Arc::new(keys);
        let issuer = TokenIssuer::new(keys.clone(), Duration::from_secs(3600)).expect("issuer");
        let verifier = TokenVerifier::new(keys);
        let passwords = PasswordHasher::new(4).expect("hasher");

        let state = AppState::new(store, issuer, verifier, passwords);
        let app = router(state.clone(), Duration::from_secs(5));

        Self {
            app,
            state,
            _data_dir: data_dir,
        }
    }

    /// App with one ADMIN and one USER account.
    pub async fn seeded() -> (Self, StoredUser, StoredUser) {
        let app = Self::new();
        let admin = app
            .add_user("Admin", ADMIN_EMAIL, ADMIN_PASSWORD, [Role::Admin, Role::User])
            .await;
        let user = app
            .add_user("User", USER_EMAIL, USER_PASSWORD, [Role::User])
            .await;
        (app, admin, user)
    }

    pub async fn add_user<const N: usize>(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: [Role; N],
    ) -> StoredUser {
        create_user(
            &self.state,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                roles: BTreeSet::from(roles),
                password: password.to_string(),
                password_confirm: password.to_string(),
            },
        )
        .await
        .expect("user is created")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let body = match body {
            Some(json) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    /// Send with `Authorization: Bearer <token>`.
    pub async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(method, uri, Some(&format!("Bearer {token}")), body)
            .await
    }

    /// Log in over HTTP and return the response.
    pub async fn login_response(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let basic = format!("Basic {}", STANDARD.encode(format!("{email}:{password}")));
        self.send(Method::GET, "/v1/users/token", Some(&basic), None)
            .await
    }

    /// Log in over HTTP and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login_response(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("token in body").to_string()
    }
}

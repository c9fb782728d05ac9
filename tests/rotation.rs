// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key rotation: tokens signed before a rotation keep working while the
//! retired key is still trusted.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::*;
use jsonwebtoken::Algorithm;
use peeps_api::auth::{KeyRegistry, Role, TokenIssuer};
use serde_json::json;

/// Token minted by the deployment that ran before the rotation.
fn pre_rotation_token(subject: &str) -> String {
    TokenIssuer::new(Arc::new(retired_registry()), Duration::from_secs(3600))
        .unwrap()
        .issue(subject, [Role::Admin], Utc::now())
        .unwrap()
}

#[tokio::test]
async fn retired_key_tokens_verify_after_rotation() {
    let app = TestApp::with_keys(primary_registry().with_jwks(&retired_jwks()).unwrap());
    let token = pre_rotation_token("5cf37266-3473-4006-984f-9325122678b7");

    let (status, body) = app.send_as(&token, Method::GET, "/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, health) = app.send(Method::GET, "/v1/health", None, None).await;
    assert_eq!(
        health["checks"]["trusted_keys"],
        json!(["2024-retired", "primary"])
    );
}

#[tokio::test]
async fn dropping_the_retired_key_revokes_its_tokens() {
    let app = TestApp::new();
    let token = pre_rotation_token("5cf37266-3473-4006-984f-9325122678b7");

    let (status, body) = app.send_as(&token, Method::GET, "/v1/adverts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "unauthorized");
}

#[tokio::test]
async fn new_logins_are_signed_with_the_active_key() {
    let app = TestApp::with_keys(primary_registry().with_jwks(&retired_jwks()).unwrap());
    app.add_user("Admin", ADMIN_EMAIL, ADMIN_PASSWORD, [Role::Admin])
        .await;

    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let header = jsonwebtoken::decode_header(&token).unwrap();
    assert_eq!(header.kid.as_deref(), Some("primary"));
    assert_eq!(header.alg, Algorithm::RS256);
}

#[tokio::test]
async fn a_different_algorithm_is_refused_even_with_a_trusted_key() {
    let app = TestApp::new();
    let rs512 = KeyRegistry::from_rsa_pem("primary", Algorithm::RS512, PRIMARY_KEY_PEM.as_bytes())
        .unwrap();
    let token = TokenIssuer::new(Arc::new(rs512), Duration::from_secs(60))
        .unwrap()
        .issue("5cf37266-3473-4006-984f-9325122678b7", [Role::Admin], Utc::now())
        .unwrap();

    let (status, _) = app.send_as(&token, Method::GET, "/v1/adverts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test]
fn retired_fixtures_share_one_key_id() {
    let signing_kid = retired_registry().signing_key().0.to_string();
    let jwks_kids: Vec<String> = retired_jwks()
        .keys
        .iter()
        .filter_map(|jwk| jwk.common.key_id.clone())
        .collect();
    assert_eq!(jwks_kids, vec![signing_kid]);
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Peeps API - user and advert service with signed bearer tokens
//!
//! Users log in with HTTP Basic credentials and receive an RSA-signed JWT.
//! Every other route verifies that token and, where required, the caller's
//! role before the handler runs.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance, verification and role enforcement
//! - `config` - Environment configuration
//! - `password` - bcrypt password hashing
//! - `storage` - JSON document store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod seed;
pub mod state;
pub mod storage;

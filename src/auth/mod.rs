// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Signed bearer tokens and per-route role enforcement for the Peeps API.
//!
//! ## Auth Flow
//!
//! 1. Client calls `GET /v1/users/token` with HTTP Basic credentials
//! 2. The service checks the password and issues an RSA-signed JWT
//!    (`{"alg","kid"}` header, `{"sub","roles","iat","exp"}` payload)
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. `authenticate` verifies the token and stores its [`Claims`] in the
//!    request extensions
//! 5. `require_role` checks the route's role against those claims
//!
//! ## Security
//!
//! - The algorithm is fixed per deployment and compared for equality
//! - Keys are looked up by `kid`; retired keys stay trusted after rotation
//! - Verification failures are indistinguishable to the caller
//! - No clock skew leeway: a token is invalid from its `exp` second on

pub mod claims;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod keys;
pub mod middleware;
pub mod roles;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::{Auth, BasicCredentials};
pub use issuer::TokenIssuer;
pub use keys::{KeyError, KeyRegistry};
pub use middleware::{authenticate, require_role};
pub use roles::Role;
pub use verifier::TokenVerifier;

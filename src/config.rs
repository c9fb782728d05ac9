// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup. Any invalid
//! value is fatal: the service does not start with a half-valid setup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `API_HOST` | Server bind address | `0.0.0.0:3000` |
//! | `SHUTDOWN_TIMEOUT_SECS` | Grace period for in-flight requests on shutdown | `5` |
//! | `REQUEST_TIMEOUT_SECS` | Per-request timeout | `5` |
//! | `DATA_DIR` | Root directory for the document store | `./data` |
//! | `AUTH_KEY_ID` | `kid` of the active signing key | `1` |
//! | `AUTH_PRIVATE_KEY_FILE` | PEM file of the active RSA private key | `private.pem` |
//! | `AUTH_ALGORITHM` | RSA signing algorithm | `RS256` |
//! | `AUTH_RETIRED_JWKS_FILE` | JWKS of retired verification keys | unset |
//! | `TOKEN_LIFETIME_SECS` | Lifetime of issued tokens | `3600` |
//! | `BCRYPT_COST` | bcrypt work factor (4-31) | `12` |
//! | `SEED_ADMIN_EMAIL` | Email of an ADMIN user created at startup | unset |
//! | `SEED_ADMIN_PASSWORD` | Password of that user | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::auth::keys::rsa_algorithm_name;

pub const API_HOST_ENV: &str = "API_HOST";
pub const SHUTDOWN_TIMEOUT_ENV: &str = "SHUTDOWN_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const AUTH_KEY_ID_ENV: &str = "AUTH_KEY_ID";
pub const AUTH_PRIVATE_KEY_FILE_ENV: &str = "AUTH_PRIVATE_KEY_FILE";
pub const AUTH_ALGORITHM_ENV: &str = "AUTH_ALGORITHM";
pub const AUTH_RETIRED_JWKS_FILE_ENV: &str = "AUTH_RETIRED_JWKS_FILE";
pub const TOKEN_LIFETIME_ENV: &str = "TOKEN_LIFETIME_SECS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_API_HOST: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_KEY_ID: &str = "1";
const DEFAULT_PRIVATE_KEY_FILE: &str = "private.pem";
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Lowest bcrypt cost accepted.
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest bcrypt cost accepted.
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Credentials of the administrator created on first start.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: SocketAddr,
    pub shutdown_timeout: Duration,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
    pub key_id: String,
    pub private_key_file: PathBuf,
    pub algorithm: Algorithm,
    pub retired_jwks_file: Option<PathBuf>,
    pub token_lifetime: Duration,
    pub bcrypt_cost: u32,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let api_host: SocketAddr = parse_or(vars, API_HOST_ENV, DEFAULT_API_HOST)?;

        let shutdown_timeout =
            Duration::from_secs(parse_or(vars, SHUTDOWN_TIMEOUT_ENV, DEFAULT_SHUTDOWN_TIMEOUT_SECS)?);
        let request_timeout =
            Duration::from_secs(parse_or(vars, REQUEST_TIMEOUT_ENV, DEFAULT_REQUEST_TIMEOUT_SECS)?);

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or(DEFAULT_DATA_DIR));
        let key_id = get(AUTH_KEY_ID_ENV).unwrap_or(DEFAULT_KEY_ID).to_string();
        let private_key_file =
            PathBuf::from(get(AUTH_PRIVATE_KEY_FILE_ENV).unwrap_or(DEFAULT_PRIVATE_KEY_FILE));
        let retired_jwks_file = get(AUTH_RETIRED_JWKS_FILE_ENV).map(PathBuf::from);

        let algorithm = parse_algorithm(get(AUTH_ALGORITHM_ENV).unwrap_or("RS256"))?;

        let token_lifetime_secs: u64 =
            parse_or(vars, TOKEN_LIFETIME_ENV, DEFAULT_TOKEN_LIFETIME_SECS)?;
        if token_lifetime_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: TOKEN_LIFETIME_ENV,
                reason: "must be at least 1 second".to_string(),
            });
        }

        let bcrypt_cost: u32 = parse_or(vars, BCRYPT_COST_ENV, DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: BCRYPT_COST_ENV,
                reason: format!("{bcrypt_cost} is outside {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST}"),
            });
        }

        // Passwords are taken verbatim; surrounding whitespace is part of the secret.
        let seed_password = vars
            .get(SEED_ADMIN_PASSWORD_ENV)
            .map(String::as_str)
            .filter(|v| !v.is_empty());
        let seed_admin = match (get(SEED_ADMIN_EMAIL_ENV), seed_password) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                email: email.to_string(),
                password: password.to_string(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Incomplete(
                    SEED_ADMIN_EMAIL_ENV,
                    SEED_ADMIN_PASSWORD_ENV,
                ))
            }
        };

        let log_format = match get(LOG_FORMAT_ENV).map(str::to_ascii_lowercase).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected json or pretty, got {other:?}"),
                })
            }
        };

        Ok(Config {
            api_host,
            shutdown_timeout,
            request_timeout,
            data_dir,
            key_id,
            private_key_file,
            algorithm,
            retired_jwks_file,
            token_lifetime: Duration::from_secs(token_lifetime_secs),
            bcrypt_cost,
            seed_admin,
            log_format,
        })
    }
}

fn parse_or<T>(vars: &HashMap<String, String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: AUTH_ALGORITHM_ENV,
        reason: format!("{raw:?} is not an RSA signing algorithm"),
    };

    let algorithm = Algorithm::from_str(raw).map_err(|_| invalid())?;
    rsa_algorithm_name(algorithm).ok_or_else(invalid)?;
    Ok(algorithm)
}

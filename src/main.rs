// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use peeps_api::{
    api::router,
    auth::{KeyRegistry, TokenIssuer, TokenVerifier},
    config::{self, Config, LogFormat},
    password::PasswordHasher,
    seed::seed_admin,
    state::AppState,
    storage::{DocumentStore, StoragePaths},
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => {
            init_tracing(config.log_format);
            config
        }
        Err(e) => {
            init_tracing(LogFormat::default());
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting Peeps API");

    // No traffic is accepted unless the signing key loads and self-checks.
    let keys = KeyRegistry::load(
        &config.key_id,
        config.algorithm,
        &config.private_key_file,
        config.retired_jwks_file.as_deref(),
    )
    .map_err(|e| {
        error!("Failed to load signing keys: {}", e);
        e
    })?;
    let keys = Arc::new(keys);
    let issuer = TokenIssuer::new(keys.clone(), config.token_lifetime)?;
    let verifier = TokenVerifier::new(keys);

    let mut store = DocumentStore::new(StoragePaths::new(&config.data_dir));
    store.initialize().map_err(|e| {
        error!("Failed to initialize document store: {}", e);
        e
    })?;

    let passwords = PasswordHasher::new(config.bcrypt_cost)?;
    let state = AppState::new(store, issuer, verifier, passwords);

    if let Some(seed) = &config.seed_admin {
        seed_admin(&state, seed).await.map_err(|e| {
            error!("Failed to seed admin user: {}", e);
            e
        })?;
    }

    let app = router(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.api_host).await?;
    info!("Peeps API listening on http://{} (docs at /docs)", config.api_host);

    serve(listener, app, config.shutdown_timeout).await?;

    info!("Peeps API shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Serve until a shutdown signal, then give in-flight requests at most
/// `shutdown_timeout` to finish.
async fn serve(
    listener: tokio::net::TcpListener,
    app: axum::Router,
    shutdown_timeout: Duration,
) -> std::io::Result<()> {
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => result,
        _ = signalled_rx => match tokio::time::timeout(shutdown_timeout, server).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Shutdown timed out; abandoning in-flight requests"
                );
                Ok(())
            }
        },
    }
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

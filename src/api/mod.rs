// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP routes.
//!
//! | Route | Auth |
//! |-------|------|
//! | `GET /v1/health` | none |
//! | `GET /v1/users/token` | HTTP Basic |
//! | `GET, POST /v1/users` | bearer + ADMIN |
//! | `GET /v1/users/{id}` | bearer (self or ADMIN) |
//! | `PUT, DELETE /v1/users/{id}` | bearer + ADMIN |
//! | `/v1/adverts`, `/v1/adverts/{id}` | bearer |

use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, require_role, Role},
    error::{ApiError, INVALID_ID},
    models::{NewAdvert, NewUser, TokenResponse, UpdateAdvert, UpdateUser, User},
    state::AppState,
    storage::{is_document_id, ContactDetails, StoredAdvert},
};

pub mod adverts;
pub mod health;
pub mod users;

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let admin_only = || middleware::from_fn_with_state(Role::Admin, require_role);

    let authenticated = Router::new()
        .route(
            "/users",
            get(users::list).post(users::create).route_layer(admin_only()),
        )
        .route(
            "/users/{id}",
            get(users::retrieve).merge(
                put(users::update)
                    .delete(users::delete)
                    .route_layer(admin_only()),
            ),
        )
        .route("/adverts", get(adverts::list).post(adverts::create))
        .route(
            "/adverts/{id}",
            get(adverts::retrieve)
                .put(adverts::update)
                .delete(adverts::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            authenticate,
        ));

    let v1_routes = Router::new()
        .route("/health", get(health::health))
        .route("/users/token", get(users::token))
        .merge(authenticated)
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Reject path ids that cannot name a document.
pub(crate) fn require_document_id(id: &str) -> Result<(), ApiError> {
    if is_document_id(id) {
        Ok(())
    } else {
        Err(ApiError::bad_request(INVALID_ID))
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "basic_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::token,
        users::list,
        users::create,
        users::retrieve,
        users::update,
        users::delete,
        adverts::list,
        adverts::create,
        adverts::retrieve,
        adverts::update,
        adverts::delete
    ),
    components(
        schemas(
            User,
            NewUser,
            UpdateUser,
            TokenResponse,
            Role,
            StoredAdvert,
            ContactDetails,
            NewAdvert,
            UpdateAdvert,
            health::HealthResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Users", description = "User management and login"),
        (name = "Adverts", description = "Advert bookings")
    )
)]
pub struct ApiDoc;

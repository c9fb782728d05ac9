// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::require_document_id;
use crate::{
    error::ApiError,
    models::{NewAdvert, UpdateAdvert},
    state::AppState,
    storage::{new_document_id, stored_timestamp, AdvertRepository, StoredAdvert},
};

#[utoipa::path(
    get,
    path = "/v1/adverts",
    tag = "Adverts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [StoredAdvert]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StoredAdvert>>, ApiError> {
    let adverts = AdvertRepository::new(state.storage()).list_all()?;
    Ok(Json(adverts))
}

#[utoipa::path(
    post,
    path = "/v1/adverts",
    request_body = NewAdvert,
    tag = "Adverts",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = StoredAdvert),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Invalid advert")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<NewAdvert>,
) -> Result<(StatusCode, Json<StoredAdvert>), ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;

    let now = stored_timestamp(Utc::now());
    let advert = StoredAdvert {
        id: new_document_id(),
        advertiser: request.advertiser,
        size: request.size.unwrap_or_default(),
        editions: request.editions,
        year: request.year,
        state: request.state,
        contact: request.contact,
        date_created: now,
        date_modified: now,
    };

    AdvertRepository::new(state.storage()).create(&advert)?;
    tracing::info!(advert_id = %advert.id, "Advert created");
    Ok((StatusCode::CREATED, Json(advert)))
}

#[utoipa::path(
    get,
    path = "/v1/adverts/{id}",
    params(("id" = String, Path, description = "Advert identifier")),
    tag = "Adverts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredAdvert),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Advert not found")
    )
)]
pub async fn retrieve(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StoredAdvert>, ApiError> {
    require_document_id(&id)?;
    Ok(Json(AdvertRepository::new(state.storage()).get(&id)?))
}

#[utoipa::path(
    put,
    path = "/v1/adverts/{id}",
    params(("id" = String, Path, description = "Advert identifier")),
    request_body = UpdateAdvert,
    tag = "Adverts",
    security(("bearer_auth" = [])),
    responses(
        (status = 204),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Advert not found"),
        (status = 422, description = "Invalid update")
    )
)]
pub async fn update(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<UpdateAdvert>,
) -> Result<StatusCode, ApiError> {
    require_document_id(&id)?;
    update.validate().map_err(ApiError::unprocessable)?;

    let repo = AdvertRepository::new(state.storage());
    let mut advert = repo.get(&id)?;
    if update.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }

    if let Some(advertiser) = update.advertiser {
        advert.advertiser = advertiser;
    }
    if let Some(size) = update.size {
        advert.size = size;
    }
    if let Some(contact) = update.contact {
        advert.contact = contact;
    }
    if let Some(editions) = update.editions {
        advert.editions = editions;
    }
    if let Some(year) = update.year {
        advert.year = year;
    }
    if let Some(states) = update.state {
        advert.state = states;
    }
    advert.date_modified = stored_timestamp(Utc::now());

    repo.update(&advert)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/adverts/{id}",
    params(("id" = String, Path, description = "Advert identifier")),
    tag = "Adverts",
    security(("bearer_auth" = [])),
    responses(
        (status = 204),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Advert not found")
    )
)]
pub async fn delete(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    require_document_id(&id)?;

    AdvertRepository::new(state.storage()).delete(&id)?;
    tracing::info!(advert_id = %id, "Advert deleted");
    Ok(StatusCode::NO_CONTENT)
}

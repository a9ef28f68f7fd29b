use axum::{
    Json,
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::{AppError, OutcomeBody};
use crate::extractors::client_addr::ClientAddr;
use crate::extractors::json::AppJson;
use crate::lifecycle::{DeleteCommand, HideCommand, InsertCommand, InsertError, SearchError};
use crate::models::image::{DeleteRequest, HideRequest, ImageResponse, InsertRequest, SearchRequest};
use crate::state::AppState;

/// Base64 inflates by 4/3; leave room for the rest of the JSON body.
pub fn insert_body_limit(max_image_size: u64) -> DefaultBodyLimit {
    let encoded = max_image_size.saturating_mul(4).div_ceil(3);
    let limit = usize::try_from(encoded).unwrap_or(usize::MAX).saturating_add(64 * 1024);
    DefaultBodyLimit::max(limit)
}

#[utoipa::path(
    post,
    path = "/insert",
    tag = "Images",
    operation_id = "insertImage",
    summary = "Upload or replace an image",
    description = "Stores a base64-encoded image under the requested name, or under a random \
        5-character name when none is given. Uploading to a name you already own replaces it. \
        Without credentials the image is owned by `anonymous` and can never be replaced, \
        hidden or deleted.",
    request_body = InsertRequest,
    responses(
        (status = 201, description = "Image created (created)", body = OutcomeBody),
        (status = 202, description = "Image replaced (replaced)", body = OutcomeBody),
        (status = 400, description = "Bad or empty payload (invalid-payload)", body = OutcomeBody),
        (status = 401, description = "Missing or invalid credentials (not-logged-in, invalid-authtoken)", body = OutcomeBody),
        (status = 403, description = "Name owned by someone else (already-exists)", body = OutcomeBody),
        (status = 415, description = "Payload is not an image (invalid-mime)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state, addr, payload), fields(ip = %addr.0))]
pub async fn insert_image(
    State(state): State<AppState>,
    addr: ClientAddr,
    payload: Result<AppJson<InsertRequest>, AppError>,
) -> Response {
    let Ok(AppJson(req)) = payload else {
        tracing::debug!("Undecodable insert request");
        return InsertError::InvalidPayload.into_response();
    };

    let cmd = InsertCommand::new(
        req.image,
        req.image_name,
        req.image_format,
        req.client_name,
        req.username,
        req.auth_token,
        req.hidden,
        state.config.auth.require_auth,
        addr.0,
    );

    match state.lifecycle.insert(cmd).await {
        Ok(inserted) => inserted.into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/hide",
    tag = "Images",
    operation_id = "hideImage",
    summary = "Hide or unhide an owned image",
    description = "Sets the hidden flag of an image owned by the caller. Hidden images are \
        excluded from search but stay directly readable. Repeating a request is harmless.",
    request_body = HideRequest,
    responses(
        (status = 202, description = "Flag set (hidden, unhidden)", body = OutcomeBody),
        (status = 400, description = "Missing fields (malformed)", body = OutcomeBody),
        (status = 401, description = "Bad credentials (invalid-authtoken)", body = OutcomeBody),
        (status = 403, description = "Not the owner (no-permissions)", body = OutcomeBody),
        (status = 404, description = "No such image (does-not-exist)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state, addr, payload), fields(ip = %addr.0))]
pub async fn hide_image(
    State(state): State<AppState>,
    addr: ClientAddr,
    AppJson(payload): AppJson<HideRequest>,
) -> Response {
    let cmd = match HideCommand::new(
        payload.image_name,
        payload.hidden,
        payload.username,
        payload.auth_token,
        addr.0,
    ) {
        Ok(cmd) => cmd,
        Err(e) => return e.into_response(),
    };

    match state.lifecycle.set_hidden(cmd).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/delete",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an owned image",
    description = "Removes the image record, then its stored bytes.",
    request_body = DeleteRequest,
    responses(
        (status = 202, description = "Image deleted (deleted)", body = OutcomeBody),
        (status = 400, description = "Missing fields (malformed)", body = OutcomeBody),
        (status = 401, description = "Bad credentials (invalid-authtoken)", body = OutcomeBody),
        (status = 403, description = "Not the owner (no-permissions)", body = OutcomeBody),
        (status = 404, description = "No such image (does-not-exist)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state, addr, payload), fields(ip = %addr.0))]
pub async fn delete_image(
    State(state): State<AppState>,
    addr: ClientAddr,
    AppJson(payload): AppJson<DeleteRequest>,
) -> Response {
    let cmd = match DeleteCommand::new(
        payload.image_name,
        payload.username,
        payload.auth_token,
        addr.0,
    ) {
        Ok(cmd) => cmd,
        Err(e) => return e.into_response(),
    };

    match state.lifecycle.delete(cmd).await {
        Ok(deleted) => deleted.into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/search",
    tag = "Images",
    operation_id = "searchImages",
    summary = "Search visible images",
    description = "Returns every non-hidden image matching all supplied predicates, oldest \
        first. At least one predicate is required. A one-sided time range is closed with \
        `1` or the current time.",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching images", body = Vec<ImageResponse>),
        (status = 400, description = "No predicates (malformed)", body = OutcomeBody),
        (status = 403, description = "Search disabled (forbidden)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state, addr, payload), fields(ip = %addr.0))]
pub async fn search_images(
    State(state): State<AppState>,
    addr: ClientAddr,
    payload: Result<AppJson<SearchRequest>, AppError>,
) -> Response {
    // A disabled search answers before the body is looked at.
    if !state.lifecycle.search_enabled() {
        tracing::warn!("Attempted a search while search is disabled");
        return SearchError::Forbidden.into_response();
    }
    let payload = match payload {
        Ok(AppJson(payload)) => payload,
        Err(e) => return e.into_response(),
    };

    match state.lifecycle.search(payload.into(), &addr.0).await {
        Ok(records) => {
            let body: Vec<ImageResponse> = records.into_iter().map(ImageResponse::from).collect();
            Json(body).into_response()
        }
        Err(e) => e.into_response(),
    }
}


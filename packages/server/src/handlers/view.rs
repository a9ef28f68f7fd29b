use std::fmt::Write as _;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::DateTime;
use common::storage::BlobKey;
use minijinja::{Environment, context};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, OutcomeBody};
use crate::services::ImageRecord;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{file}",
    tag = "Images",
    operation_id = "viewImage",
    summary = "View an image",
    description = "`/{name}` renders an HTML page describing the image; \
        `/{name}.{format}` returns the stored bytes. Hidden images are still served.",
    params(("file" = String, Path, description = "Image name, optionally with its format")),
    responses(
        (status = 200, description = "Image page or raw image bytes"),
        (status = 404, description = "No such image (not-found)", body = OutcomeBody),
    ),
)]
#[instrument(skip(state))]
pub async fn view_image(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    if let Some(record) = state.images.find_by_name(&file).await? {
        let page = render_image_page(&record, &state.config.display.date_format)
            .map_err(|e| AppError::Internal(format!("Failed to render image page: {e}")))?;
        return Ok(Html(page).into_response());
    }

    let key = BlobKey::parse(&file)
        .map_err(|_| AppError::NotFound(format!("Image '{file}' not found")))?;

    let content_type = state
        .images
        .find_by_name(key.name())
        .await?
        .filter(|r| r.format == key.format())
        .map(|r| r.mime_type)
        .unwrap_or_else(|| {
            mime_guess::from_path(key.file_name())
                .first_or_octet_stream()
                .to_string()
        });

    let size = state.blob_store.size(&key).await?;
    let reader = state.blob_store.get_stream(&key).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

const IMAGE_PAGE: &str = include_str!("../../templates/image.html");

/// Render the descriptive page for an image.
///
/// The `.html` template name turns on autoescaping for every field.
pub fn render_image_page(
    record: &ImageRecord,
    date_format: &str,
) -> Result<String, minijinja::Error> {
    // `to_string` would panic on an invalid pattern.
    let mut uploaded = String::new();
    if let Some(t) = DateTime::from_timestamp(record.timestamp, 0) {
        if write!(uploaded, "{}", t.format(date_format)).is_err() {
            uploaded = t.to_rfc3339();
        }
    }

    let env = Environment::new();
    let page = env.template_from_named_str("image.html", IMAGE_PAGE)?;
    page.render(context! {
        name => &record.name,
        src => format!("{}.{}", record.name, record.format),
        uploader => &record.owner,
        client => &record.client,
        uploaded => uploaded,
        id => record.id,
    })
}

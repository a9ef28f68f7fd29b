use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::lifecycle::{DeleteError, Deleted, HideError, HideOutcome, InsertError, Inserted, SearchError};
use crate::services::MetadataError;

/// Structured outcome returned by every mutating endpoint, success or not.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OutcomeBody {
    pub success: bool,
    /// Stable machine-readable status, e.g. `created`, `already-exists`.
    #[serde(rename = "status-simple")]
    #[schema(example = "created")]
    pub status: &'static str,
    /// Human-readable description of the status.
    #[serde(rename = "status-humanreadable")]
    #[schema(example = "The image was successfully saved with the name abc")]
    pub status_readable: String,
    /// Resolved image name (insert only).
    #[serde(rename = "image-name", skip_serializing_if = "Option::is_none")]
    #[schema(example = "abc")]
    pub image_name: Option<String>,
}

impl OutcomeBody {
    pub fn ok(status: &'static str, status_readable: impl Into<String>) -> Self {
        Self {
            success: true,
            status,
            status_readable: status_readable.into(),
            image_name: None,
        }
    }

    pub fn failed(status: &'static str, status_readable: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            status_readable: status_readable.into(),
            image_name: None,
        }
    }
}

fn respond(status: StatusCode, body: OutcomeBody) -> Response {
    (status, Json(body)).into_response()
}

/// Errors from endpoints outside the image lifecycle (accounts, reads).
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidCredentials,
    UsernameTaken,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, OutcomeBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                OutcomeBody::failed("malformed", msg),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                OutcomeBody::failed("invalid-credentials", "Invalid username or password"),
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                OutcomeBody::failed("username-taken", "Username is already taken"),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                OutcomeBody::failed("not-found", msg),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    OutcomeBody::failed("internal-error", "An unexpected error occurred"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        respond(status, body)
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("{key} not found")),
            StorageError::InvalidKey(msg) => AppError::NotFound(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for Inserted {
    fn into_response(self) -> Response {
        let status = match self.status {
            crate::lifecycle::InsertStatus::Created => StatusCode::CREATED,
            crate::lifecycle::InsertStatus::Replaced => StatusCode::ACCEPTED,
        };
        let mut body = OutcomeBody::ok(self.code(), self.message());
        body.image_name = Some(self.name);
        respond(status, body)
    }
}

impl IntoResponse for InsertError {
    fn into_response(self) -> Response {
        let status = match self {
            InsertError::InvalidPayload => StatusCode::BAD_REQUEST,
            InsertError::NotLoggedIn | InsertError::InvalidAuthToken => StatusCode::UNAUTHORIZED,
            InsertError::AlreadyExists => StatusCode::FORBIDDEN,
            InsertError::InvalidMime => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            InsertError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        respond(status, OutcomeBody::failed(self.code(), self.message()))
    }
}

impl IntoResponse for HideOutcome {
    fn into_response(self) -> Response {
        respond(
            StatusCode::ACCEPTED,
            OutcomeBody::ok(self.code(), self.message()),
        )
    }
}

impl IntoResponse for HideError {
    fn into_response(self) -> Response {
        let status = match self {
            HideError::Malformed => StatusCode::BAD_REQUEST,
            HideError::InvalidAuthToken => StatusCode::UNAUTHORIZED,
            HideError::DoesNotExist => StatusCode::NOT_FOUND,
            HideError::NoPermissions => StatusCode::FORBIDDEN,
            HideError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        respond(status, OutcomeBody::failed(self.code(), self.message()))
    }
}

impl IntoResponse for Deleted {
    fn into_response(self) -> Response {
        respond(
            StatusCode::ACCEPTED,
            OutcomeBody::ok(self.code(), self.message()),
        )
    }
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        let status = match self {
            DeleteError::Malformed => StatusCode::BAD_REQUEST,
            DeleteError::InvalidAuthToken => StatusCode::UNAUTHORIZED,
            DeleteError::DoesNotExist => StatusCode::NOT_FOUND,
            DeleteError::NoPermissions => StatusCode::FORBIDDEN,
            DeleteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        respond(status, OutcomeBody::failed(self.code(), self.message()))
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match self {
            SearchError::Malformed => StatusCode::BAD_REQUEST,
            SearchError::Forbidden => StatusCode::FORBIDDEN,
            SearchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        respond(status, OutcomeBody::failed(self.code(), self.message()))
    }
}

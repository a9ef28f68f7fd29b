use serde::{Deserialize, Serialize};

use crate::lifecycle::SearchQuery;
use crate::services::ImageRecord;

/// Request body for `POST /insert`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct InsertRequest {
    /// Base64-encoded (standard alphabet) image bytes.
    #[schema(example = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==")]
    pub image: String,
    /// Requested name. A random 5-character name is generated when empty.
    #[serde(rename = "image-name")]
    #[schema(example = "abc")]
    pub image_name: Option<String>,
    /// File extension to store the image under. Defaults to `png`.
    #[serde(rename = "image-format")]
    #[schema(example = "jpg")]
    pub image_format: Option<String>,
    /// Free-form name of the uploading client. Defaults to `Unknown Client`.
    #[serde(rename = "client-name")]
    #[schema(example = "mis-cli")]
    pub client_name: Option<String>,
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[serde(rename = "auth-token")]
    pub auth_token: Option<String>,
    /// Exclude the image from search results.
    pub hidden: bool,
}

/// Request body for `POST /hide`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct HideRequest {
    #[serde(rename = "image-name")]
    #[schema(example = "abc")]
    pub image_name: Option<String>,
    /// `true` hides, `false` unhides.
    pub hidden: bool,
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[serde(rename = "auth-token")]
    pub auth_token: Option<String>,
}

/// Request body for `POST /delete`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DeleteRequest {
    #[serde(rename = "image-name")]
    #[schema(example = "abc")]
    pub image_name: Option<String>,
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[serde(rename = "auth-token")]
    pub auth_token: Option<String>,
}

/// Request body for `POST /search`. At least one predicate must be set.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct SearchRequest {
    #[serde(rename = "image-format")]
    #[schema(example = "png")]
    pub image_format: Option<String>,
    /// Owner username.
    #[schema(example = "alice")]
    pub uploader: Option<String>,
    #[serde(rename = "client-name")]
    pub client_name: Option<String>,
    /// Unix seconds, inclusive. `0` or absent means unbounded.
    #[serde(rename = "uploaded-after")]
    #[schema(example = 1700000000)]
    pub uploaded_after: i64,
    /// Unix seconds, inclusive. `0` or absent means unbounded.
    #[serde(rename = "uploaded-before")]
    pub uploaded_before: i64,
}

impl From<SearchRequest> for SearchQuery {
    fn from(req: SearchRequest) -> Self {
        SearchQuery {
            format: req.image_format,
            uploader: req.uploader,
            client: req.client_name,
            min_time: req.uploaded_after,
            max_time: req.uploaded_before,
        }
    }
}

/// A visible image as returned by search.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImageResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[serde(rename = "image-name")]
    #[schema(example = "abc")]
    pub name: String,
    #[serde(rename = "image-format")]
    #[schema(example = "jpg")]
    pub format: String,
    #[serde(rename = "mime-type")]
    #[schema(example = "image/jpeg")]
    pub mime_type: String,
    #[schema(example = "alice")]
    pub uploader: String,
    #[serde(rename = "client-name")]
    pub client: String,
    /// Unix seconds of the last upload.
    pub timestamp: i64,
}

impl From<ImageRecord> for ImageResponse {
    fn from(r: ImageRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            format: r.format,
            mime_type: r.mime_type,
            uploader: r.owner,
            client: r.client,
            timestamp: r.timestamp,
        }
    }
}

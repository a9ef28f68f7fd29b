use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Public name; the blob lives at `{name}.{format}`.
    #[sea_orm(unique)]
    pub name: String,

    pub format: String,

    /// Sniffed from the uploaded bytes, e.g. `image/png`.
    pub mime_type: String,

    /// Username, or `anonymous` for unauthenticated uploads.
    pub owner: String,

    /// Network origin of the last create/replace.
    pub uploader_address: String,

    pub client: String,

    pub hidden: bool,

    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl ActiveModelBehavior for ActiveModel {}

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::entity::image;

/// A stored image row.
pub type ImageRecord = image::Model;

/// Attributes of a newly claimed image name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub name: String,
    pub format: String,
    pub mime_type: String,
    pub owner: String,
    pub uploader_address: String,
    pub client: String,
    pub hidden: bool,
    pub timestamp: i64,
}

/// Attributes overwritten when an owner replaces an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpdate {
    pub format: String,
    pub mime_type: String,
    pub uploader_address: String,
    pub client: String,
    pub hidden: bool,
    pub timestamp: i64,
}

/// Search predicates. `None` fields match everything; the rest are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub format: Option<String>,
    pub uploader: Option<String>,
    pub client: Option<String>,
    pub min_time: Option<i64>,
    pub max_time: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The name is already claimed.
    #[error("image name already exists")]
    Conflict,
    /// No row matched the name.
    #[error("image not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(String),
}

impl From<DbErr> for MetadataError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => MetadataError::Conflict,
            _ => MetadataError::Database(err.to_string()),
        }
    }
}

/// Durable image metadata. Every call is atomic on its own; callers get no
/// multi-call transactions.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn find_owner(&self, name: &str) -> Result<Option<String>, MetadataError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ImageRecord>, MetadataError>;

    /// Claim `image.name`. Fails with `Conflict` if the name is taken.
    async fn insert(&self, image: NewImage) -> Result<(), MetadataError>;

    async fn update(&self, name: &str, update: ImageUpdate) -> Result<(), MetadataError>;

    async fn set_hidden(&self, name: &str, hidden: bool) -> Result<(), MetadataError>;

    async fn remove(&self, name: &str) -> Result<(), MetadataError>;

    /// Visible images matching every given predicate, oldest first.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<ImageRecord>, MetadataError>;
}

pub struct SeaOrmMetadataStore {
    db: DatabaseConnection,
}

impl SeaOrmMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SeaOrmMetadataStore {
    async fn find_owner(&self, name: &str) -> Result<Option<String>, MetadataError> {
        let owner = image::Entity::find()
            .select_only()
            .column(image::Column::Owner)
            .filter(image::Column::Name.eq(name))
            .into_tuple::<String>()
            .one(&self.db)
            .await?;
        Ok(owner)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ImageRecord>, MetadataError> {
        Ok(image::Entity::find()
            .filter(image::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    async fn insert(&self, new: NewImage) -> Result<(), MetadataError> {
        let model = image::ActiveModel {
            name: Set(new.name),
            format: Set(new.format),
            mime_type: Set(new.mime_type),
            owner: Set(new.owner),
            uploader_address: Set(new.uploader_address),
            client: Set(new.client),
            hidden: Set(new.hidden),
            timestamp: Set(new.timestamp),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn update(&self, name: &str, update: ImageUpdate) -> Result<(), MetadataError> {
        let result = image::Entity::update_many()
            .col_expr(image::Column::Format, Expr::value(update.format))
            .col_expr(image::Column::MimeType, Expr::value(update.mime_type))
            .col_expr(
                image::Column::UploaderAddress,
                Expr::value(update.uploader_address),
            )
            .col_expr(image::Column::Client, Expr::value(update.client))
            .col_expr(image::Column::Hidden, Expr::value(update.hidden))
            .col_expr(image::Column::Timestamp, Expr::value(update.timestamp))
            .filter(image::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn set_hidden(&self, name: &str, hidden: bool) -> Result<(), MetadataError> {
        let result = image::Entity::update_many()
            .col_expr(image::Column::Hidden, Expr::value(hidden))
            .filter(image::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), MetadataError> {
        let result = image::Entity::delete_many()
            .filter(image::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<ImageRecord>, MetadataError> {
        let mut query = image::Entity::find().filter(image::Column::Hidden.eq(false));

        if let Some(format) = &filter.format {
            query = query.filter(image::Column::Format.eq(format.as_str()));
        }
        if let Some(uploader) = &filter.uploader {
            query = query.filter(image::Column::Owner.eq(uploader.as_str()));
        }
        if let Some(client) = &filter.client {
            query = query.filter(image::Column::Client.eq(client.as_str()));
        }
        if let Some(min) = filter.min_time {
            query = query.filter(image::Column::Timestamp.gte(min));
        }
        if let Some(max) = filter.max_time {
            query = query.filter(image::Column::Timestamp.lte(max));
        }

        Ok(query
            .order_by_asc(image::Column::Timestamp)
            .order_by_asc(image::Column::Id)
            .all(&self.db)
            .await?)
    }
}

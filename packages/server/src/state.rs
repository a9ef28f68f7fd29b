use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::lifecycle::ImageLifecycle;
use crate::services::{JwtAuthGateway, MetadataStore, SeaOrmMetadataStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub lifecycle: Arc<ImageLifecycle>,
    pub images: Arc<dyn MetadataStore>,
    pub blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    /// Wire the lifecycle to the database-backed metadata store and token
    /// verifier.
    pub fn new(config: AppConfig, db: DatabaseConnection, blob_store: Arc<dyn BlobStore>) -> Self {
        let images: Arc<dyn MetadataStore> = Arc::new(SeaOrmMetadataStore::new(db.clone()));
        let auth = Arc::new(JwtAuthGateway::new(db.clone(), config.auth.jwt_secret.clone()));
        let lifecycle = ImageLifecycle::new(auth, images.clone(), blob_store.clone())
            .with_search_enabled(config.search.allow_search);

        Self {
            config,
            db,
            lifecycle: Arc::new(lifecycle),
            images,
            blob_store,
        }
    }
}

//! Collaborators the image lifecycle consumes through narrow traits.

pub mod auth;
pub mod metadata;

pub use auth::{AuthError, AuthGateway, JwtAuthGateway};
pub use metadata::{
    ImageRecord, ImageUpdate, MetadataError, MetadataStore, NewImage, SeaOrmMetadataStore,
    SearchFilter,
};

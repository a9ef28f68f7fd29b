use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::key::BlobKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Name-addressed blob storage for image bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, replacing any existing blob at that key.
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve a blob as a streaming async reader.
    async fn get_stream(&self, key: &BlobKey) -> Result<BoxReader, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, key: &BlobKey) -> Result<u64, StorageError>;
}

//! In-memory collaborators for lifecycle tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::storage::{BlobKey, BlobStore, BoxReader, StorageError};

use super::ImageLifecycle;
use crate::services::{
    AuthError, AuthGateway, ImageRecord, ImageUpdate, MetadataError, MetadataStore, NewImage,
    SearchFilter,
};

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";

pub fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[derive(Default)]
pub struct StubAuth {
    pub tokens: Mutex<HashMap<String, String>>,
    pub unreachable: bool,
    pub calls: AtomicUsize,
}

impl StubAuth {
    pub fn with_user(self, username: &str, token: &str) -> Self {
        self.tokens
            .lock()
            .unwrap()
            .insert(username.into(), token.into());
        self
    }
}

#[async_trait]
impl AuthGateway for StubAuth {
    async fn verify(&self, username: &str, token: &str) -> Result<(), AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(AuthError::Transport("connection refused".into()));
        }
        match self.tokens.lock().unwrap().get(username) {
            Some(t) if t == token => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

#[derive(Default)]
pub struct MemoryMetadata {
    pub rows: Mutex<BTreeMap<String, ImageRecord>>,
    pub next_id: AtomicUsize,
    pub fail_writes: bool,
    /// Report `Conflict` on insert even though the lookup saw nothing,
    /// as when a concurrent request claimed the name in between.
    pub lose_race: bool,
    pub writes: AtomicUsize,
    pub searches: AtomicUsize,
}

impl MemoryMetadata {
    pub fn row(&self, name: &str) -> Option<ImageRecord> {
        self.rows.lock().unwrap().get(name).cloned()
    }

    pub fn seed(&self, name: &str, format: &str, owner: &str) {
        self.seed_at(name, format, owner, 1);
    }

    pub fn seed_at(&self, name: &str, format: &str, owner: &str, timestamp: i64) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        self.rows.lock().unwrap().insert(
            name.into(),
            ImageRecord {
                id,
                name: name.into(),
                format: format.into(),
                mime_type: "image/png".into(),
                owner: owner.into(),
                uploader_address: "192.0.2.1".into(),
                client: "seed".into(),
                hidden: false,
                timestamp,
            },
        );
    }

    fn check_write(&self) -> Result<(), MetadataError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(MetadataError::Database("disk I/O error".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadata {
    async fn find_owner(&self, name: &str) -> Result<Option<String>, MetadataError> {
        Ok(self.row(name).map(|r| r.owner))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ImageRecord>, MetadataError> {
        Ok(self.row(name))
    }

    async fn insert(&self, new: NewImage) -> Result<(), MetadataError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        if self.lose_race || rows.contains_key(&new.name) {
            return Err(MetadataError::Conflict);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        rows.insert(
            new.name.clone(),
            ImageRecord {
                id,
                name: new.name,
                format: new.format,
                mime_type: new.mime_type,
                owner: new.owner,
                uploader_address: new.uploader_address,
                client: new.client,
                hidden: new.hidden,
                timestamp: new.timestamp,
            },
        );
        Ok(())
    }

    async fn update(&self, name: &str, update: ImageUpdate) -> Result<(), MetadataError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(name).ok_or(MetadataError::NotFound)?;
        row.format = update.format;
        row.mime_type = update.mime_type;
        row.uploader_address = update.uploader_address;
        row.client = update.client;
        row.hidden = update.hidden;
        row.timestamp = update.timestamp;
        Ok(())
    }

    async fn set_hidden(&self, name: &str, hidden: bool) -> Result<(), MetadataError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(name).ok_or(MetadataError::NotFound)?;
        row.hidden = hidden;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), MetadataError> {
        self.check_write()?;
        self.rows
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or(MetadataError::NotFound)
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<ImageRecord>, MetadataError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<_> = rows
            .values()
            .filter(|r| !r.hidden)
            .filter(|r| filter.format.as_ref().is_none_or(|f| &r.format == f))
            .filter(|r| filter.uploader.as_ref().is_none_or(|u| &r.owner == u))
            .filter(|r| filter.client.as_ref().is_none_or(|c| &r.client == c))
            .filter(|r| filter.min_time.is_none_or(|t| r.timestamp >= t))
            .filter(|r| filter.max_time.is_none_or(|t| r.timestamp <= t))
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.timestamp, r.id));
        Ok(found)
    }
}

#[derive(Default)]
pub struct MemoryBlobs {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_put: bool,
    pub fail_delete: bool,
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MemoryBlobs {
    pub fn blob(&self, file_name: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(file_name).cloned()
    }

    pub fn seed(&self, file_name: &str, data: &[u8]) {
        self.blobs
            .lock()
            .unwrap()
            .insert(file_name.into(), data.to_vec());
    }
}

fn io_error(msg: &str) -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        msg.to_string(),
    ))
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(io_error("read-only file system"));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(key.file_name(), data.to_vec());
        Ok(())
    }

    async fn get_stream(&self, key: &BlobKey) -> Result<BoxReader, StorageError> {
        let data = self
            .blob(&key.file_name())
            .ok_or_else(|| StorageError::NotFound(key.file_name()))?;
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete {
            return Err(io_error("permission denied"));
        }
        Ok(self.blobs.lock().unwrap().remove(&key.file_name()).is_some())
    }

    async fn size(&self, key: &BlobKey) -> Result<u64, StorageError> {
        self.blob(&key.file_name())
            .map(|b| b.len() as u64)
            .ok_or_else(|| StorageError::NotFound(key.file_name()))
    }
}

/// A lifecycle wired to the given doubles.
pub struct Harness {
    pub auth: Arc<StubAuth>,
    pub metadata: Arc<MemoryMetadata>,
    pub blobs: Arc<MemoryBlobs>,
    pub lifecycle: ImageLifecycle,
}

impl Harness {
    pub fn new(auth: StubAuth, metadata: MemoryMetadata, blobs: MemoryBlobs) -> Self {
        let auth = Arc::new(auth);
        let metadata = Arc::new(metadata);
        let blobs = Arc::new(blobs);
        let lifecycle = ImageLifecycle::new(auth.clone(), metadata.clone(), blobs.clone());
        Self {
            auth,
            metadata,
            blobs,
            lifecycle,
        }
    }

    /// Users `alice`/`t-alice` and `bob`/`t-bob`, empty stores.
    pub fn standard() -> Self {
        Self::new(
            StubAuth::default()
                .with_user("alice", "t-alice")
                .with_user("bob", "t-bob"),
            MemoryMetadata::default(),
            MemoryBlobs::default(),
        )
    }

    pub fn with_search_enabled(mut self, enabled: bool) -> Self {
        self.lifecycle = ImageLifecycle::new(
            self.auth.clone(),
            self.metadata.clone(),
            self.blobs.clone(),
        )
        .with_search_enabled(enabled);
        self
    }

    pub fn auth_calls(&self) -> usize {
        self.auth.calls.load(Ordering::SeqCst)
    }

    pub fn metadata_writes(&self) -> usize {
        self.metadata.writes.load(Ordering::SeqCst)
    }

    pub fn blob_puts(&self) -> usize {
        self.blobs.puts.load(Ordering::SeqCst)
    }
}

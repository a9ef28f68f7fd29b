//! Ownership-aware create/replace/hide/delete of images.
//!
//! `ImageLifecycle` sequences the three collaborators so that the blob
//! directory and the metadata table stay in agreement:
//!
//! * insert writes the blob first, then the row, so a failure in between can
//!   only leave an orphaned file, never a row pointing at nothing;
//! * delete removes the row first, then the blob, so a failure in between
//!   leaves at worst an unreferenced file.
//! * a replace that changes the format removes the old file only after the
//!   row points at the new one.
//!
//! Nothing is rolled back and nothing is retried. Two concurrent inserts of
//! the same unclaimed name race; the store's unique key decides the winner
//! of the row, the last writer wins the blob.

mod command;
mod delete;
mod hide;
mod insert;
mod naming;
mod outcome;
mod search;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use common::storage::BlobStore;

use crate::services::{AuthError, AuthGateway, MetadataStore};

pub use command::{Credentials, DeleteCommand, HideCommand, InsertCommand, SearchQuery};
pub use outcome::{
    Deleted, DeleteError, HideError, HideOutcome, InsertError, InsertStatus, Inserted,
    SearchError,
};

/// Identity of callers that supplied no credentials.
pub const ANONYMOUS: &str = "anonymous";
pub const DEFAULT_FORMAT: &str = "png";
pub const DEFAULT_CLIENT: &str = "Unknown Client";

pub struct ImageLifecycle {
    auth: Arc<dyn AuthGateway>,
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    search_enabled: bool,
}

impl ImageLifecycle {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            auth,
            metadata,
            blobs,
            search_enabled: true,
        }
    }

    /// Administratively enable or disable search.
    pub fn with_search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    pub fn search_enabled(&self) -> bool {
        self.search_enabled
    }

    async fn authenticate(&self, credentials: &Credentials, requester: &str) -> Result<(), AuthError> {
        let result = self
            .auth
            .verify(&credentials.username, &credentials.token)
            .await;
        match &result {
            Ok(()) => {}
            Err(AuthError::InvalidCredentials) => tracing::debug!(
                ip = requester,
                username = %credentials.username,
                "Authentication with the wrong token"
            ),
            Err(AuthError::Transport(detail)) => tracing::error!(
                ip = requester,
                username = %credentials.username,
                "Auth backend failed: {detail}"
            ),
        }
        result
    }
}

/// Whether `identity` may mutate an image owned by `owner`.
///
/// `anonymous` never has authority, even over images uploaded anonymously.
fn has_authority(owner: &str, identity: &str) -> bool {
    identity != ANONYMOUS && owner == identity
}

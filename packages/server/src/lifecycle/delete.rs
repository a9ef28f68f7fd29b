use common::storage::BlobKey;
use tracing::{debug, error, warn};

use super::command::DeleteCommand;
use super::outcome::{DeleteError, Deleted};
use super::{ImageLifecycle, has_authority};
use crate::services::MetadataError;

impl ImageLifecycle {
    /// Delete an image the caller owns: row first, then blob.
    pub async fn delete(&self, cmd: DeleteCommand) -> Result<Deleted, DeleteError> {
        let ip = cmd.requester.as_str();
        let username = cmd.credentials.username.as_str();
        let name = cmd.name.as_str();

        self.authenticate(&cmd.credentials, ip)
            .await
            .map_err(|_| DeleteError::InvalidAuthToken)?;

        let record = self.metadata.find_by_name(name).await.map_err(|e| {
            error!(ip, username, name, "Error looking up image for delete: {e}");
            DeleteError::Internal(e.to_string())
        })?;
        let Some(record) = record else {
            debug!(ip, username, name, "Attempted to delete an image that doesn't exist");
            return Err(DeleteError::DoesNotExist);
        };
        if !has_authority(&record.owner, username) {
            debug!(
                ip,
                username,
                name,
                owner = %record.owner,
                "Attempted to delete someone else's image"
            );
            return Err(DeleteError::NoPermissions);
        }

        match self.metadata.remove(name).await {
            Ok(()) => {}
            Err(MetadataError::NotFound) => return Err(DeleteError::DoesNotExist),
            Err(e) => {
                error!(ip, username, name, "Error deleting image from the database: {e}");
                return Err(DeleteError::Internal(e.to_string()));
            }
        }

        // The row is gone; a missing blob is already the desired end state.
        match BlobKey::new(&record.name, &record.format) {
            Ok(key) => match self.blobs.delete(&key).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(ip, username, name, key = %key, "Blob was already absent during delete");
                }
                Err(e) => {
                    error!(ip, username, name, key = %key, "Error deleting blob from the filesystem: {e}");
                    return Err(DeleteError::Internal(e.to_string()));
                }
            },
            Err(e) => {
                warn!(ip, username, name, "Stored image has no valid blob key: {e}");
            }
        }

        debug!(ip, username, name, "Image deleted");
        Ok(Deleted { name: cmd.name })
    }
}

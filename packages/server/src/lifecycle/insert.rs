use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use common::storage::{BlobKey, StorageError};
use tracing::{debug, error, warn};

use super::command::InsertCommand;
use super::naming::{GENERATED_NAME_LEN, random_name};
use super::outcome::{InsertError, InsertStatus, Inserted};
use super::{ANONYMOUS, DEFAULT_CLIENT, DEFAULT_FORMAT, ImageLifecycle, has_authority};
use crate::services::{ImageUpdate, MetadataError, NewImage};

impl ImageLifecycle {
    /// Create a new image or replace one the caller owns.
    pub async fn insert(&self, cmd: InsertCommand) -> Result<Inserted, InsertError> {
        let ip = cmd.requester.as_str();

        if cmd.image.is_empty() {
            debug!(ip, "Insert with an empty payload");
            return Err(InsertError::InvalidPayload);
        }
        let bytes = STANDARD.decode(cmd.image.as_bytes()).map_err(|e| {
            debug!(ip, "Insert payload is not valid base64: {e}");
            InsertError::InvalidPayload
        })?;

        let name = cmd.name.unwrap_or_else(|| random_name(GENERATED_NAME_LEN));
        let format = cmd.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        let client = cmd.client.unwrap_or_else(|| DEFAULT_CLIENT.to_string());
        let key = BlobKey::new(&name, &format).map_err(|e| {
            debug!(ip, name = %name, format = %format, "Insert with an unusable name: {e}");
            InsertError::InvalidPayload
        })?;

        let identity = match &cmd.credentials {
            Some(credentials) => {
                self.authenticate(credentials, ip)
                    .await
                    .map_err(|_| InsertError::InvalidAuthToken)?;
                credentials.username.clone()
            }
            None if cmd.require_auth => {
                debug!(ip, "Anonymous insert refused, authentication is required");
                return Err(InsertError::NotLoggedIn);
            }
            None => ANONYMOUS.to_string(),
        };

        let internal = |what: &str, detail: String| {
            error!(ip, username = %identity, name = %name, "Error while {what}: {detail}");
            InsertError::Internal(detail)
        };

        let existing = self
            .metadata
            .find_by_name(&name)
            .await
            .map_err(|e| internal("looking up the image owner", e.to_string()))?;
        let (status, previous_format) = match existing {
            Some(record) if has_authority(&record.owner, &identity) => {
                (InsertStatus::Replaced, Some(record.format))
            }
            Some(record) => {
                debug!(
                    ip,
                    username = %identity,
                    name = %name,
                    owner = %record.owner,
                    "Attempted to override an image uploaded by someone else"
                );
                return Err(InsertError::AlreadyExists);
            }
            None => (InsertStatus::Created, None),
        };

        let mime_type = sniff_image(&bytes).ok_or_else(|| {
            debug!(ip, username = %identity, name = %name, "Uploaded data is not an image");
            InsertError::InvalidMime
        })?;

        match self.blobs.put(&key, &bytes).await {
            Ok(()) => {}
            Err(StorageError::SizeLimitExceeded { actual, limit }) => {
                debug!(ip, username = %identity, name = %name, actual, limit, "Upload too large");
                return Err(InsertError::InvalidPayload);
            }
            Err(e) => return Err(internal("saving the image", e.to_string())),
        }

        // The blob is on disk from here on; failures below leave it in place.
        let timestamp = Utc::now().timestamp();
        match status {
            InsertStatus::Created => {
                let new = NewImage {
                    name: name.clone(),
                    format,
                    mime_type: mime_type.to_string(),
                    owner: identity.clone(),
                    uploader_address: cmd.requester.clone(),
                    client,
                    hidden: cmd.hidden,
                    timestamp,
                };
                match self.metadata.insert(new).await {
                    Ok(()) => {}
                    Err(MetadataError::Conflict) => {
                        warn!(
                            ip,
                            username = %identity,
                            name = %name,
                            "Name was claimed concurrently, blob left as written"
                        );
                        return Err(InsertError::AlreadyExists);
                    }
                    Err(e) => {
                        return Err(internal("inserting the image into the database", e.to_string()));
                    }
                }
            }
            InsertStatus::Replaced => {
                let update = ImageUpdate {
                    format,
                    mime_type: mime_type.to_string(),
                    uploader_address: cmd.requester.clone(),
                    client,
                    hidden: cmd.hidden,
                    timestamp,
                };
                self.metadata
                    .update(&name, update)
                    .await
                    .map_err(|e| internal("updating the image in the database", e.to_string()))?;

                // The row now points at the new format; the old file has no row.
                if let Some(old) = previous_format.filter(|old| old != key.format()) {
                    self.remove_stale_blob(&name, &old, ip).await;
                }
            }
        }

        debug!(ip, username = %identity, name = %name, ?status, "Image uploaded");
        Ok(Inserted { name, status })
    }

    /// Drop the blob a replace left behind under its previous format.
    ///
    /// The replace already succeeded, so failures here are logged only.
    async fn remove_stale_blob(&self, name: &str, format: &str, ip: &str) {
        let key = match BlobKey::new(name, format) {
            Ok(key) => key,
            Err(e) => {
                warn!(ip, name, format, "Previous image has no valid blob key: {e}");
                return;
            }
        };
        match self.blobs.delete(&key).await {
            Ok(true) => debug!(ip, key = %key, "Removed blob of the previous format"),
            Ok(false) => warn!(ip, key = %key, "Blob of the previous format was already absent"),
            Err(e) => error!(ip, key = %key, "Error removing blob of the previous format: {e}"),
        }
    }
}

/// Content-sniffed MIME type, only if the bytes are a known image kind.
fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
}

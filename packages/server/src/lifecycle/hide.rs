use tracing::{debug, error};

use super::command::HideCommand;
use super::outcome::{HideError, HideOutcome};
use super::{ImageLifecycle, has_authority};
use crate::services::MetadataError;

impl ImageLifecycle {
    /// Set the hidden flag of an image the caller owns. Idempotent.
    pub async fn set_hidden(&self, cmd: HideCommand) -> Result<HideOutcome, HideError> {
        let ip = cmd.requester.as_str();
        let username = cmd.credentials.username.as_str();
        let name = cmd.name.as_str();

        self.authenticate(&cmd.credentials, ip)
            .await
            .map_err(|_| HideError::InvalidAuthToken)?;

        let owner = self.metadata.find_owner(name).await.map_err(|e| {
            error!(ip, username, name, "Error looking up owner for hide: {e}");
            HideError::Internal(e.to_string())
        })?;
        match owner {
            None => {
                debug!(ip, username, name, "Attempted to hide an image that doesn't exist");
                return Err(HideError::DoesNotExist);
            }
            Some(owner) if !has_authority(&owner, username) => {
                debug!(ip, username, name, owner = %owner, "Attempted to hide someone else's image");
                return Err(HideError::NoPermissions);
            }
            Some(_) => {}
        }

        match self.metadata.set_hidden(name, cmd.hidden).await {
            Ok(()) => {}
            Err(MetadataError::NotFound) => return Err(HideError::DoesNotExist),
            Err(e) => {
                error!(ip, username, name, "Error changing hide status: {e}");
                return Err(HideError::Internal(e.to_string()));
            }
        }

        debug!(ip, username, name, hidden = cmd.hidden, "Hidden status changed");
        Ok(if cmd.hidden {
            HideOutcome::Hidden(cmd.name)
        } else {
            HideOutcome::Unhidden(cmd.name)
        })
    }
}

use chrono::Utc;
use tracing::{debug, error, warn};

use super::ImageLifecycle;
use super::command::SearchQuery;
use super::outcome::SearchError;
use crate::services::ImageRecord;

impl ImageLifecycle {
    /// Find visible images matching every supplied predicate.
    pub async fn search(
        &self,
        query: SearchQuery,
        requester: &str,
    ) -> Result<Vec<ImageRecord>, SearchError> {
        if !self.search_enabled {
            warn!(ip = requester, "Attempted a search while search is disabled");
            return Err(SearchError::Forbidden);
        }

        let filter = query.normalize(Utc::now().timestamp()).inspect_err(|_| {
            debug!(ip = requester, "Invalid search request");
        })?;

        let results = self.metadata.search(&filter).await.map_err(|e| {
            error!(ip = requester, ?filter, "Failed to execute search: {e}");
            SearchError::Internal(e.to_string())
        })?;

        debug!(ip = requester, ?filter, hits = results.len(), "Search executed");
        Ok(results)
    }
}

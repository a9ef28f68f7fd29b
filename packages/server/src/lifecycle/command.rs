use crate::services::SearchFilter;

use super::outcome::{DeleteError, HideError, SearchError};

/// A username/token pair presented by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    /// Both halves must be present and non-empty, otherwise the caller is
    /// treated as not logged in.
    pub fn from_parts(username: Option<String>, token: Option<String>) -> Option<Self> {
        match (non_empty(username), non_empty(token)) {
            (Some(username), Some(token)) => Some(Self { username, token }),
            _ => None,
        }
    }
}

/// Upload or replace an image.
#[derive(Debug, Clone)]
pub struct InsertCommand {
    /// Base64 (standard alphabet) image bytes.
    pub image: String,
    pub name: Option<String>,
    pub format: Option<String>,
    pub client: Option<String>,
    pub credentials: Option<Credentials>,
    pub hidden: bool,
    pub require_auth: bool,
    pub requester: String,
}

impl InsertCommand {
    /// Build a command, treating empty optional strings as absent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        image: String,
        name: Option<String>,
        format: Option<String>,
        client: Option<String>,
        username: Option<String>,
        token: Option<String>,
        hidden: bool,
        require_auth: bool,
        requester: impl Into<String>,
    ) -> Self {
        Self {
            image,
            name: non_empty(name),
            format: non_empty(format),
            client: non_empty(client),
            credentials: Credentials::from_parts(username, token),
            hidden,
            require_auth,
            requester: requester.into(),
        }
    }
}

/// Change the hidden flag of an owned image.
#[derive(Debug, Clone)]
pub struct HideCommand {
    pub name: String,
    pub hidden: bool,
    pub credentials: Credentials,
    pub requester: String,
}

impl HideCommand {
    pub fn new(
        name: Option<String>,
        hidden: bool,
        username: Option<String>,
        token: Option<String>,
        requester: impl Into<String>,
    ) -> Result<Self, HideError> {
        let name = non_empty(name).ok_or(HideError::Malformed)?;
        let credentials = Credentials::from_parts(username, token).ok_or(HideError::Malformed)?;
        Ok(Self {
            name,
            hidden,
            credentials,
            requester: requester.into(),
        })
    }
}

/// Remove an owned image and its blob.
#[derive(Debug, Clone)]
pub struct DeleteCommand {
    pub name: String,
    pub credentials: Credentials,
    pub requester: String,
}

impl DeleteCommand {
    pub fn new(
        name: Option<String>,
        username: Option<String>,
        token: Option<String>,
        requester: impl Into<String>,
    ) -> Result<Self, DeleteError> {
        let name = non_empty(name).ok_or(DeleteError::Malformed)?;
        let credentials =
            Credentials::from_parts(username, token).ok_or(DeleteError::Malformed)?;
        Ok(Self {
            name,
            credentials,
            requester: requester.into(),
        })
    }
}

/// Raw search predicates as supplied by the caller. Empty strings and
/// non-positive times mean "any".
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub format: Option<String>,
    pub uploader: Option<String>,
    pub client: Option<String>,
    pub min_time: i64,
    pub max_time: i64,
}

impl SearchQuery {
    /// Validate and close one-sided time ranges: a missing lower bound becomes
    /// `1`, a missing upper bound becomes `now`.
    pub fn normalize(self, now: i64) -> Result<SearchFilter, SearchError> {
        let format = non_empty(self.format);
        let uploader = non_empty(self.uploader);
        let client = non_empty(self.client);

        let (min_time, max_time) = match (self.min_time > 0, self.max_time > 0) {
            (false, false) => (None, None),
            (false, true) => (Some(1), Some(self.max_time)),
            (true, false) => (Some(self.min_time), Some(now)),
            (true, true) => (Some(self.min_time), Some(self.max_time)),
        };

        if format.is_none() && uploader.is_none() && client.is_none() && min_time.is_none() {
            return Err(SearchError::Malformed);
        }

        Ok(SearchFilter {
            format,
            uploader,
            client,
            min_time,
            max_time,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

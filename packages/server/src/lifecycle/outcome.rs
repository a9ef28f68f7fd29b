//! Closed result sets for each lifecycle command.
//!
//! Every variant has a stable short code that clients match on; internal
//! variants carry detail for the server log only.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// The name was unclaimed and now belongs to the caller.
    Created,
    /// The caller already owned the name; bytes and attributes were overwritten.
    Replaced,
}

/// A successful insert. `name` may have been generated by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted {
    pub name: String,
    pub status: InsertStatus,
}

impl Inserted {
    pub fn code(&self) -> &'static str {
        match self.status {
            InsertStatus::Created => "created",
            InsertStatus::Replaced => "replaced",
        }
    }

    pub fn message(&self) -> String {
        match self.status {
            InsertStatus::Created => {
                format!("The image was successfully saved with the name {}", self.name)
            }
            InsertStatus::Replaced => format!(
                "The image was successfully saved with the name {}, replacing your previous image with the same name",
                self.name
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    InvalidPayload,
    NotLoggedIn,
    InvalidAuthToken,
    AlreadyExists,
    InvalidMime,
    Internal(String),
}

impl InsertError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "invalid-payload",
            Self::NotLoggedIn => "not-logged-in",
            Self::InvalidAuthToken => "invalid-authtoken",
            Self::AlreadyExists => "already-exists",
            Self::InvalidMime => "invalid-mime",
            Self::Internal(_) => "internal-error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "The image payload, name or format is invalid.",
            Self::NotLoggedIn => {
                "This MIS server requires authentication. Please log in or register."
            }
            Self::InvalidAuthToken => {
                "Your authentication token was incorrect. Please try logging in again."
            }
            Self::AlreadyExists => "The requested image name is already in use by another user",
            Self::InvalidMime => "The uploaded data is of an incorrect MIME type.",
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideOutcome {
    Hidden(String),
    Unhidden(String),
}

impl HideOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Hidden(_) => "hidden",
            Self::Unhidden(_) => "unhidden",
        }
    }

    pub fn message(&self) -> String {
        let name = match self {
            Self::Hidden(name) | Self::Unhidden(name) => name,
        };
        format!("The image {name} was successfully {}.", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideError {
    Malformed,
    InvalidAuthToken,
    DoesNotExist,
    NoPermissions,
    Internal(String),
}

impl HideError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::InvalidAuthToken => "invalid-authtoken",
            Self::DoesNotExist => "does-not-exist",
            Self::NoPermissions => "no-permissions",
            Self::Internal(_) => "internal-error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Malformed => "The hide request is missing the image name or credentials.",
            Self::InvalidAuthToken => {
                "The authentication token was incorrect. Please try logging in again."
            }
            Self::DoesNotExist => "The image you requested to be hidden does not exist.",
            Self::NoPermissions => "The image you requested to be hidden was not uploaded by you.",
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub name: String,
}

impl Deleted {
    pub fn code(&self) -> &'static str {
        "deleted"
    }

    pub fn message(&self) -> String {
        format!("The image {} was successfully deleted.", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    Malformed,
    InvalidAuthToken,
    DoesNotExist,
    NoPermissions,
    Internal(String),
}

impl DeleteError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::InvalidAuthToken => "invalid-authtoken",
            Self::DoesNotExist => "does-not-exist",
            Self::NoPermissions => "no-permissions",
            Self::Internal(_) => "internal-error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Malformed => "The delete request is missing the image name or credentials.",
            Self::InvalidAuthToken => {
                "The authentication token was incorrect. Please try logging in again."
            }
            Self::DoesNotExist => "The image you requested to be deleted does not exist.",
            Self::NoPermissions => "The image you requested to be deleted was not uploaded by you.",
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    Malformed,
    Forbidden,
    Internal(String),
}

impl SearchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Forbidden => "forbidden",
            Self::Internal(_) => "internal-error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Malformed => "At least one search field must be set.",
            Self::Forbidden => "Searching is disabled on this server.",
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

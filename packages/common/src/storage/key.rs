use std::fmt;

use super::error::StorageError;

/// A validated `name.format` blob address.
///
/// Both halves are flat path components: no separators, no `..`, no control
/// characters and no leading dot, so a key never escapes the store root.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    name: String,
    format: String,
}

impl BlobKey {
    /// Build a key from an image name and its format tag.
    pub fn new(name: &str, format: &str) -> Result<Self, StorageError> {
        validate_component(name, "name")?;
        validate_component(format, "format")?;
        if format.contains('.') {
            return Err(StorageError::InvalidKey(
                "format must not contain '.'".into(),
            ));
        }
        Ok(Self {
            name: name.to_owned(),
            format: format.to_owned(),
        })
    }

    /// Parse a `name.format` file name, splitting on the last dot.
    pub fn parse(file_name: &str) -> Result<Self, StorageError> {
        let (name, format) = file_name.rsplit_once('.').ok_or_else(|| {
            StorageError::InvalidKey(format!("missing format in '{file_name}'"))
        })?;
        Self::new(name, format)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// The on-disk file name, `name.format`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format)
    }
}

fn validate_component(value: &str, what: &str) -> Result<(), StorageError> {
    if value.is_empty() {
        return Err(StorageError::InvalidKey(format!("{what} cannot be empty")));
    }

    // Rejects NUL as well as CR/LF.
    if value.chars().any(|c| c.is_ascii_control()) {
        return Err(StorageError::InvalidKey(format!(
            "{what} contains control characters"
        )));
    }

    if value.contains('/') || value.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "{what} contains a path separator"
        )));
    }

    if value.contains("..") {
        return Err(StorageError::InvalidKey(format!("{what} contains '..'")));
    }

    if value.starts_with('.') {
        return Err(StorageError::InvalidKey(format!(
            "{what} cannot start with '.'"
        )));
    }

    Ok(())
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({}.{})", self.name, self.format)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.format)
    }
}

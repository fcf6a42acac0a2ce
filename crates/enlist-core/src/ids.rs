//! Identifier types for enlist.
//!
//! This module provides strongly-typed identifiers for store projects and documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A project identifier.
///
/// The project scopes a store instance: each project gets its own database.
/// Only ASCII alphanumerics, `-` and `_` are accepted so that the identifier
/// is always safe to use as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a project identifier, validating its characters.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the identifier is empty or contains characters
    /// other than ASCII alphanumerics, `-` and `_`.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty { what: "project id" });
        }
        if let Some(ch) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(IdError::InvalidCharacter {
                what: "project id",
                ch,
            });
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a single document: a collection name plus a document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    collection: String,
    id: String,
}

impl DocumentRef {
    /// Create a document reference.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if either part is empty or contains `/` or a NUL byte.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Result<Self, IdError> {
        let collection = collection.into();
        let id = id.into();
        validate_segment("collection", &collection)?;
        validate_segment("document id", &id)?;
        Ok(Self { collection, id })
    }

    /// The collection this document belongs to.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The document id within its collection.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Validate a collection name.
///
/// # Errors
///
/// Returns `IdError` if the name is empty or contains `/` or a NUL byte.
pub fn validate_collection(name: &str) -> Result<(), IdError> {
    validate_segment("collection", name)
}

fn validate_segment(what: &'static str, value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty { what });
    }
    if let Some(ch) = value.chars().find(|c| *c == '/' || *c == '\0') {
        return Err(IdError::InvalidCharacter { what, ch });
    }
    Ok(())
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier is empty.
    #[error("{what} must not be empty")]
    Empty {
        /// Which identifier was empty.
        what: &'static str,
    },

    /// The identifier contains a character that is not allowed.
    #[error("{what} contains invalid character {ch:?}")]
    InvalidCharacter {
        /// Which identifier was invalid.
        what: &'static str,
        /// The offending character.
        ch: char,
    },
}

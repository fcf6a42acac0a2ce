//! Subscriber records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::record::{fields_from, EntityRecord, Fields};

/// Collection holding subscriber records, keyed by email address.
pub const SUBSCRIBER_COLLECTION: &str = "subscribers";

/// Stored name of the creation timestamp.
pub const CREATION_DATE_FIELD: &str = "creationdate";

/// An email subscription.
///
/// Stored field names are `name`, `email`, `creationdate` and `status`
/// (`status` is the active flag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Display name. Not written when empty so a re-subscription without a
    /// name keeps the stored one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Email address; also the document id.
    pub email: String,

    /// When the subscription was created. Not written when unset.
    #[serde(
        rename = "creationdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<DateTime<Utc>>,

    /// Whether the subscription is active.
    #[serde(rename = "status", default)]
    pub is_active: bool,
}

impl Subscriber {
    /// Create an active subscription for `email`.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: email.into(),
            creation_date: Some(Utc::now()),
            is_active: true,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Convert into the field map written to the store.
    ///
    /// # Errors
    ///
    /// Returns `FieldError` if the subscriber cannot be serialized.
    pub fn to_fields(&self) -> Result<Fields, FieldError> {
        fields_from(self)
    }

    /// Decode a subscriber from a stored record.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Decode` if the record does not hold a subscriber.
    pub fn from_record(record: &EntityRecord) -> Result<Self, FieldError> {
        record.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subscriber_is_active() {
        let sub = Subscriber::new("a@example.com");
        assert!(sub.is_active);
        assert!(sub.name.is_empty());
        assert!(sub.creation_date.is_some());
    }

    #[test]
    fn stored_field_names() {
        let fields = Subscriber::new("a@example.com")
            .with_name("Asha")
            .to_fields()
            .unwrap();
        assert_eq!(fields["email"], "a@example.com");
        assert_eq!(fields["name"], "Asha");
        assert_eq!(fields["status"], true);
        assert!(fields.contains_key("creationdate"));
    }

    #[test]
    fn empty_name_is_not_written() {
        let fields = Subscriber::new("a@example.com").to_fields().unwrap();
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn unset_creation_date_is_not_written() {
        let mut sub = Subscriber::new("a@example.com");
        sub.creation_date = None;
        let fields = sub.to_fields().unwrap();
        assert!(!fields.contains_key(CREATION_DATE_FIELD));
    }
}

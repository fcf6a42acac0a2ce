//! Schema-free entity records.
//!
//! A record is a JSON object plus the timestamps the store assigns to it. Writes
//! use merge semantics: see [`merge_fields`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;

/// The field map of a record.
pub type Fields = serde_json::Map<String, Value>;

/// A single document read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The document id within its collection.
    pub id: String,

    /// The record data.
    pub fields: Fields,

    /// When the document was first written.
    pub create_time: DateTime<Utc>,

    /// When the document was last written.
    pub update_time: DateTime<Utc>,
}

impl EntityRecord {
    /// Look up a field by path. Dotted paths (`address.city`) descend into
    /// nested objects.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.fields, path)
    }

    /// Read a numeric field as `f64`.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Missing` if the field is absent and
    /// `FieldError::WrongType` if it is not a number.
    pub fn get_f64(&self, path: &str) -> Result<f64, FieldError> {
        self.typed(path, "number", Value::as_f64)
    }

    /// Read a string field.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Missing` if the field is absent and
    /// `FieldError::WrongType` if it is not a string.
    pub fn get_str(&self, path: &str) -> Result<&str, FieldError> {
        self.typed(path, "string", Value::as_str)
    }

    /// Read a boolean field.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Missing` if the field is absent and
    /// `FieldError::WrongType` if it is not a boolean.
    pub fn get_bool(&self, path: &str) -> Result<bool, FieldError> {
        self.typed(path, "boolean", Value::as_bool)
    }

    /// Read the `balance` field of an account document.
    ///
    /// # Errors
    ///
    /// Same as [`EntityRecord::get_f64`].
    pub fn balance(&self) -> Result<f64, FieldError> {
        self.get_f64(crate::BALANCE_FIELD)
    }

    /// Decode the whole record into a typed value.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Decode` if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FieldError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| FieldError::Decode(e.to_string()))
    }

    fn typed<'a, T>(
        &'a self,
        path: &str,
        expected: &'static str,
        get: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, FieldError> {
        let value = self.field(path).ok_or_else(|| FieldError::Missing {
            field: path.to_string(),
        })?;
        get(value).ok_or_else(|| FieldError::WrongType {
            field: path.to_string(),
            expected,
        })
    }
}

/// Resolve a dotted field path against a field map.
#[must_use]
pub fn lookup_path<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Apply a merge-write to `target`.
///
/// Keys present in `incoming` overwrite, keys absent are preserved. When both
/// sides hold an object under the same key the objects are merged recursively,
/// so a write of `{"address": {"city": "x"}}` leaves `address.zip` intact.
///
/// Applying the same `incoming` twice yields the same result as applying it once.
pub fn merge_fields(target: &mut Fields, incoming: &Fields) {
    for (key, value) in incoming {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(update)) => {
                merge_fields(existing, update);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Serialize a typed value into a field map.
///
/// # Errors
///
/// Returns `FieldError::Decode` if serialization fails and
/// `FieldError::NotAnObject` if the value is not a JSON object.
pub fn fields_from<T: Serialize>(value: &T) -> Result<Fields, FieldError> {
    match serde_json::to_value(value).map_err(|e| FieldError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(FieldError::NotAnObject),
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields;

/// Extra fields attached to an error.
///
/// The logger writes them as separate top-level fields of the record and the
/// error monitor sends them as item extras:
///
/// ```text
/// CustomData::new().person_id("fbceab5f-1d55-4fba-9c36-dcce24c04122")
/// => {"error": "getting person failed: ...", "person-id": "fbceab5f-...", ...}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomData {
    fields: Map<String, Value>,
}

impl CustomData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store any value convertible to JSON under `name`, replacing a previous value.
    #[must_use]
    pub fn field<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn string<K: Into<String>, V: Into<String>>(self, name: K, value: V) -> Self {
        self.field(name, value.into())
    }

    #[must_use]
    pub fn int<K: Into<String>>(self, name: K, value: i64) -> Self {
        self.field(name, value)
    }

    /// Copy every field of `other` into `self`; values from `other` win.
    #[must_use]
    pub fn merge(self, other: CustomData) -> Self {
        self.map(other.fields)
    }

    #[must_use]
    pub fn map(mut self, fields: Map<String, Value>) -> Self {
        for (name, value) in fields {
            self.fields.insert(name, value);
        }
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn request_id<V: Into<String>>(self, value: V) -> Self {
        self.string(fields::REQUEST_ID, value)
    }

    #[must_use]
    pub fn user_id<V: Into<String>>(self, value: V) -> Self {
        self.string(fields::USER_ID, value)
    }

    #[must_use]
    pub fn account_id<V: Into<String>>(self, value: V) -> Self {
        self.string(fields::ACCOUNT_ID, value)
    }

    #[must_use]
    pub fn person_id<V: Into<String>>(self, value: V) -> Self {
        self.string(fields::PERSON_ID, value)
    }
}

impl From<Map<String, Value>> for CustomData {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

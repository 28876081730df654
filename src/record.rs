//! The cumulative registration record.
//!
//! A record is a map from field name to a loosely typed value, the same
//! shape that is persisted as JSON. Keys the wizard does not know about are
//! carried along untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Field;

/// A single field value: text, a flag, or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Field name → value mapping accumulated across wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationRecord {
    values: BTreeMap<String, FieldValue>,
}

impl RegistrationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy for constructing working values.
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a known field, replacing any previous value.
    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.values.insert(field.key().to_string(), value.into());
    }

    /// Set an arbitrary key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldValue> {
        self.values.remove(field.key())
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(field.key())
    }

    pub fn get_key(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Text value of `field`, or `None` if absent or not text.
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.get(field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Flag value of `field`, or `None` if absent or not a flag.
    pub fn flag(&self, field: Field) -> Option<bool> {
        match self.get(field) {
            Some(FieldValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// List value of `field`, or `None` if absent or not a list.
    pub fn list(&self, field: Field) -> Option<&[String]> {
        match self.get(field) {
            Some(FieldValue::List(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Merge `other` into `self`; keys present in `other` win.
    pub fn merge(&mut self, other: &RegistrationRecord) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Copy of the values for `fields` only.
    pub fn subset(&self, fields: &[Field]) -> RegistrationRecord {
        let values = fields
            .iter()
            .filter_map(|f| {
                self.values
                    .get(f.key())
                    .map(|v| (f.key().to_string(), v.clone()))
            })
            .collect();
        Self { values }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

//! Ordered label set shared by queries and collection jobs.
//!
//! Order is the order labels were supplied; inserting an existing key replaces
//! its value in place.

use crate::error::CoreError;
use anyhow::{Context, bail};
use serde::{Serialize, Serializer, ser::SerializeMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(Vec<(String, String)>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject keys that are not valid label names or collide with `reserved`.
    pub fn validate(&self, reserved: &[&str]) -> Result<(), CoreError> {
        for (key, _) in &self.0 {
            if reserved.contains(&key.as_str()) {
                return Err(CoreError::ReservedLabel(key.clone()));
            }
            if !is_label_name(key) {
                return Err(CoreError::InvalidLabel(key.clone()));
            }
        }
        Ok(())
    }

    /// Parse `key=value` pairs as given on the command line.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> anyhow::Result<Self> {
        let mut labels = Labels::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("label must be key=value, got {:?}", pair))?;
            let key = key.trim();
            if key.is_empty() {
                bail!("label key is empty in {:?}", pair);
            }
            labels.insert(key, value.trim());
        }
        Ok(labels)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Labels::new();
        for (k, v) in iter {
            labels.insert(k, v);
        }
        labels
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

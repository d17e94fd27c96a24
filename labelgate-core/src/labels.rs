//! Label sets and Kubernetes label key syntax.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// Optional DNS subdomain prefix ending in '/', then a 1-63 char name that
/// starts and ends alphanumeric with '-', '_' or '.' in between.
const LABEL_KEY_PATTERN: &str = r"^([a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*/)?[a-zA-Z0-9]([a-zA-Z0-9_.-]{0,61}[a-zA-Z0-9])?$";

const MAX_PREFIX_LEN: usize = 253;
const MAX_NAME_LEN: usize = 63;
const MAX_KEY_LEN: usize = 253;

/// Labels attached to a resource, keyed and iterated in byte-wise key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for LabelSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for LabelSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Checks label keys against Kubernetes key syntax
pub struct LabelKeyChecker {
    pattern: Regex,
}

impl LabelKeyChecker {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(LABEL_KEY_PATTERN)?,
        })
    }

    /// Returns `None` for a valid key, otherwise how the key should be reported
    pub fn check(&self, key: &str) -> Option<String> {
        if let Some(idx) = key.rfind('/') {
            let prefix = &key[..idx];
            let name = &key[idx + 1..];
            if prefix.len() > MAX_PREFIX_LEN {
                return Some(format!("{key} (prefix too long)"));
            }
            if name.len() > MAX_NAME_LEN {
                return Some(format!("{key} (name too long)"));
            }
            if key.len() > MAX_KEY_LEN {
                return Some(format!("{key} (key too long)"));
            }
        } else if key.len() > MAX_NAME_LEN {
            return Some(format!("{key} (name too long)"));
        }

        if self.pattern.is_match(key) {
            None
        } else {
            Some(key.to_string())
        }
    }
}

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ANNOTATORS: &str = "annotators";
pub const INPUT_FORMAT: &str = "inputFormat";
pub const OUTPUT_FORMAT: &str = "outputFormat";
pub const INPUT_SERIALIZER: &str = "inputSerializer";
pub const OUTPUT_SERIALIZER: &str = "outputSerializer";
pub const PRETTY_PRINT: &str = "prettyPrint";
pub const TOKENIZE_WHITESPACE: &str = "tokenize.whitespace";
pub const SSPLIT_EOL_ONLY: &str = "ssplit.eolonly";

/// A flat, ordered set of string settings.
///
/// Equality and hashing are by content, so two maps built separately from the
/// same pairs are interchangeable as cache keys. There is no way to mutate a
/// `Properties` in place: `with` and `overlay` return new values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a copy of `self` where every pair of `overrides` replaces ours.
    pub fn overlay<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = self.0.clone();
        for (key, value) in overrides {
            merged.insert(key.into(), value.into());
        }
        Self(merged)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Anything that isn't a recognisable boolean falls back to `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| bool::from_str(v.trim().to_lowercase().as_str()).ok())
            .unwrap_or(default)
    }

    /// Splits a comma separated value, dropping blanks.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

//! Owned string mappings for headers, form bodies and query strings.

use std::collections::BTreeMap;

/// An ordered `key -> value` mapping that remembers its defaults.
///
/// `reset_to_default()` restores the mapping it was created with, so a
/// caller can layer per-request overrides on top of a resource's default
/// query and undo them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    defaults: BTreeMap<String, String>,
    values: BTreeMap<String, String>,
}

impl Params {
    /// Creates an empty mapping with no defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapping whose defaults (and initial values) are `pairs`.
    pub fn with_defaults<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let defaults: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: defaults.clone(),
            defaults,
        }
    }

    /// Inserts or replaces one entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Removes one entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Copies every entry of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &Params) -> &mut Self {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
        self
    }

    /// Discards all changes since construction.
    pub fn reset_to_default(&mut self) {
        self.values = self.defaults.clone();
    }

    /// Looks up one entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies the current entries into a plain map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    /// Entries as `(key, value)` pairs, suitable for `reqwest` `.query()`.
    pub fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut params = Params::new();
        params.set("search", "acme");
        assert_eq!(params.get("search"), Some("acme"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut params = Params::with_defaults([("count", "5000"), ("order", "ID")]);
        let overrides = Params::new().with("count", "10").with("search", "x");
        params.merge(&overrides);

        assert_eq!(params.get("count"), Some("10"));
        assert_eq!(params.get("order"), Some("ID"));
        assert_eq!(params.get("search"), Some("x"));
    }

    #[test]
    fn test_reset_to_default_restores_construction_state() {
        let mut params = Params::with_defaults([("Content-Type", "application/json")]);
        params.set("Content-Type", "text/plain");
        params.set("X-Extra", "1");
        params.reset_to_default();

        assert_eq!(
            params.to_map(),
            Params::with_defaults([("Content-Type", "application/json")]).to_map()
        );
    }

    #[test]
    fn test_reset_without_defaults_empties() {
        let mut params = Params::new().with("a", "b");
        params.reset_to_default();
        assert!(params.is_empty());
    }

    #[test]
    fn test_clones_do_not_alias() {
        let base = Params::with_defaults([("count", "5000")]);
        let mut copy = base.clone();
        copy.set("count", "1");
        assert_eq!(base.get("count"), Some("5000"));
    }

    #[test]
    fn test_iter_is_key_ordered() {
        let params = Params::new().with("b", "2").with("a", "1");
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}

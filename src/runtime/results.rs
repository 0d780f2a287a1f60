//! Results - per-unit values collected during a walk
//!
//! One entry per unit that reached `visited` (skipped units hold the
//! default value); no entry for units that never started.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Results<T> {
    values: FxHashMap<String, T>,
}

impl<T> Default for Results<T> {
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }
}

impl<T> Results<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Record the value of a finished unit; returns false if one was already present
    pub(crate) fn record(&mut self, key: &str, value: T) -> bool {
        self.values.insert(key.to_string(), value).is_none()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries sorted by unit key
    pub fn into_sorted(self) -> Vec<(String, T)> {
        let mut entries: Vec<_> = self.values.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn into_inner(self) -> FxHashMap<String, T> {
        self.values
    }
}

impl<T> IntoIterator for Results<T> {
    type Item = (String, T);
    type IntoIter = std::collections::hash_map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

//! Insertion-ordered counting.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Counts occurrences of keys, remembering the order keys were first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq> Histogram<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`.
    pub fn add(&mut self, key: K) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key, 1)),
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(k, count)| (k, *count))
    }

    /// Key with the highest count. Ties go to the key seen first.
    pub fn mode(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (key, count) in &self.entries {
            match best {
                Some((_, best_count)) if *count <= best_count => {}
                _ => best = Some((key, *count)),
            }
        }
        best
    }
}

impl<K: Serialize> Serialize for Histogram<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_ordered(&self.entries, serializer)
    }
}

/// Serialize `(key, value)` pairs as a map, preserving their order.
pub fn serialize_ordered<S, K, V>(entries: &[(K, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

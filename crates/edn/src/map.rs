//! Insertion-ordered EDN map.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::value::{Edn, Keyword};

/// An EDN map that remembers the order its entries were read or inserted in.
///
/// Keeping the source order lets a map print back exactly as it was read.
/// Equality and hashing ignore order, so `{:a 1, :b 2}` equals `{:b 2, :a 1}`.
#[derive(Debug, Clone, Default)]
pub struct EdnMap {
    entries: Vec<(Edn, Edn)>,
}

impl EdnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Edn) -> Option<&Edn> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up the value stored under the keyword `:name`.
    pub fn get_keyword(&self, name: &str) -> Option<&Edn> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Edn::Keyword(kw) if kw.as_str() == name))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Edn) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<Edn>, value: impl Into<Edn>) -> Option<Edn> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert under the keyword `:name`.
    pub fn insert_keyword(&mut self, name: &str, value: impl Into<Edn>) -> Option<Edn> {
        self.insert(Edn::Keyword(Keyword::new(name)), value)
    }

    pub fn remove(&mut self, key: &Edn) -> Option<Edn> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Edn, &Edn)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Edn> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Edn> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Append an entry without checking for an existing key.
    pub(crate) fn push_unchecked(&mut self, key: Edn, value: Edn) {
        self.entries.push((key, value));
    }
}

impl PartialEq for EdnMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for EdnMap {}

impl Hash for EdnMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.entries.len());
        state.write_u64(unordered_hash(self.entries.iter()));
    }
}

/// Order-independent hash of a collection: the wrapping sum of item hashes.
pub(crate) fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items.fold(0u64, |acc, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    })
}

impl IntoIterator for EdnMap {
    type Item = (Edn, Edn);
    type IntoIter = std::vec::IntoIter<(Edn, Edn)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<Edn>, V: Into<Edn>> FromIterator<(K, V)> for EdnMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = EdnMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

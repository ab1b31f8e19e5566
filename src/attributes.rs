//! Attribute values and attribute sets.
//!
//! Keys and values are opaque to the untagger. The only value it interprets
//! is the [`Attr::Unset`] sentinel, which drops a key back to whatever the
//! root element says about it.

use std::collections::btree_map;
use std::collections::BTreeMap;

/// A single attribute value as returned by a resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attr<V> {
    /// A concrete value.
    Value(V),
    /// Remove the key, unless the root element defines it.
    Unset,
}

impl<V> Attr<V> {
    /// Returns true for the [`Attr::Unset`] sentinel.
    pub fn is_unset(&self) -> bool {
        matches!(self, Attr::Unset)
    }

    /// Borrow the concrete value, if any.
    pub fn value(&self) -> Option<&V> {
        match self {
            Attr::Value(value) => Some(value),
            Attr::Unset => None,
        }
    }
}

impl<V> From<V> for Attr<V> {
    fn from(value: V) -> Self {
        Attr::Value(value)
    }
}

/// Attribute set attached to one element.
///
/// May contain [`Attr::Unset`] entries; these are resolved during the text merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attributes<K, V> {
    entries: BTreeMap<K, Attr<V>>,
}

impl<K, V> Default for Attributes<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> Attributes<K, V> {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a concrete value.
    pub fn with(mut self, key: K, value: V) -> Self {
        self.entries.insert(key, Attr::Value(value));
        self
    }

    /// Builder-style insert of the [`Attr::Unset`] sentinel.
    pub fn with_unset(mut self, key: K) -> Self {
        self.entries.insert(key, Attr::Unset);
        self
    }

    /// Insert an entry, returning the previous one for `key`.
    pub fn insert(&mut self, key: K, value: Attr<V>) -> Option<Attr<V>> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&Attr<V>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, Attr<V>> {
        self.entries.iter()
    }
}

impl<K: Ord, V> FromIterator<(K, Attr<V>)> for Attributes<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, Attr<V>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> IntoIterator for Attributes<K, V> {
    type Item = (K, Attr<V>);
    type IntoIter = btree_map::IntoIter<K, Attr<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Attributes<K, V> {
    type Item = (&'a K, &'a Attr<V>);
    type IntoIter = btree_map::Iter<'a, K, Attr<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Final attributes of one text run. Never contains the sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAttributes<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K, V> Default for ResolvedAttributes<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> ResolvedAttributes<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.entries.keys()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ResolvedAttributes<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> IntoIterator for ResolvedAttributes<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

//! Caller-supplied tag → attribute resolution.
//!
//! There is one capability, [`Attributer`], which always receives the
//! ancestor path. Name-only closures and static maps are adapters over it.

extern crate alloc;

use alloc::string::String;
use std::collections::BTreeMap;

use crate::attributes::Attributes;

/// Resolves the attribute set of one element.
///
/// Called exactly once per element, at open-tag time, in document order.
/// `path` lists the open tag names from the root to the element itself, so
/// `path.last() == Some(&tag)` always holds.
pub trait Attributer<K, V> {
    /// Attribute set for `tag` opened under `path`.
    fn attributes(&mut self, tag: &str, path: &[&str]) -> Attributes<K, V>;
}

impl<K, V, F> Attributer<K, V> for F
where
    F: FnMut(&str, &[&str]) -> Attributes<K, V>,
{
    fn attributes(&mut self, tag: &str, path: &[&str]) -> Attributes<K, V> {
        self(tag, path)
    }
}

/// Adapter for resolvers that only look at the tag name.
#[derive(Clone, Copy, Debug)]
pub struct ByName<F>(pub F);

impl<K, V, F> Attributer<K, V> for ByName<F>
where
    F: FnMut(&str) -> Attributes<K, V>,
{
    fn attributes(&mut self, tag: &str, _path: &[&str]) -> Attributes<K, V> {
        (self.0)(tag)
    }
}

/// Static tag name → attribute set dictionary.
///
/// Tags missing from the map resolve to an empty set, so they inherit
/// everything from their ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagMap<K, V> {
    tags: BTreeMap<String, Attributes<K, V>>,
}

impl<K, V> Default for TagMap<K, V> {
    fn default() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> TagMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a tag's attributes.
    pub fn tag(mut self, name: impl Into<String>, attributes: Attributes<K, V>) -> Self {
        self.tags.insert(name.into(), attributes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, attributes: Attributes<K, V>) {
        self.tags.insert(name.into(), attributes);
    }

    pub fn get(&self, name: &str) -> Option<&Attributes<K, V>> {
        self.tags.get(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Owned lookup; unknown tags yield an empty set.
    pub fn resolve(&self, name: &str) -> Attributes<K, V> {
        self.tags.get(name).cloned().unwrap_or_default()
    }
}

impl<K: Ord + Clone, V: Clone> Attributer<K, V> for TagMap<K, V> {
    fn attributes(&mut self, tag: &str, _path: &[&str]) -> Attributes<K, V> {
        self.resolve(tag)
    }
}

impl<K, V, S> FromIterator<(S, Attributes<K, V>)> for TagMap<K, V>
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, Attributes<K, V>)>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(|(name, attrs)| (name.into(), attrs)).collect(),
        }
    }
}

/// Borrowing view of a [`TagMap`] usable where an `&mut Attributer` is needed.
#[derive(Debug)]
pub(crate) struct MapLookup<'m, K, V>(pub(crate) &'m TagMap<K, V>);

impl<K: Ord + Clone, V: Clone> Attributer<K, V> for MapLookup<'_, K, V> {
    fn attributes(&mut self, tag: &str, _path: &[&str]) -> Attributes<K, V> {
        self.0.resolve(tag)
    }
}

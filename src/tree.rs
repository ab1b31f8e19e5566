//! Element arena mirroring tag nesting.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::attributes::Attributes;

/// Index of an element inside its [`ElementTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

impl ElementId {
    /// Position in construction (pre-order) order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One tag occurrence and the attributes its resolver returned.
///
/// The parent link is a plain index; children are owned by the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Element<K, V> {
    name: String,
    attributes: Attributes<K, V>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl<K, V> Element<K, V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes<K, V> {
        &self.attributes
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for Element<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name:{} attributes:{:?}", self.name, self.attributes)
    }
}

/// Tree of elements built during one parse. The first element is the root.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementTree<K, V> {
    elements: Vec<Element<K, V>>,
}

impl<K, V> Default for ElementTree<K, V> {
    fn default() -> Self {
        Self {
            elements: Vec::with_capacity(8),
        }
    }
}

impl<K, V> ElementTree<K, V> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a fully resolved element under `parent`.
    pub(crate) fn push(
        &mut self,
        name: impl Into<String>,
        attributes: Attributes<K, V>,
        parent: Option<ElementId>,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(p.0)) {
            parent.children.push(id);
        }
        self.elements.push(Element {
            name: name.into(),
            attributes,
            children: Vec::new(),
            parent,
        });
        id
    }

    /// The outermost element, absent only for an empty tree.
    pub fn root(&self) -> Option<&Element<K, V>> {
        self.elements.first()
    }

    pub fn root_id(&self) -> Option<ElementId> {
        (!self.elements.is_empty()).then_some(ElementId(0))
    }

    pub fn get(&self, id: ElementId) -> Option<&Element<K, V>> {
        self.elements.get(id.0)
    }

    pub fn parent(&self, id: ElementId) -> Option<&Element<K, V>> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = &Element<K, V>> + '_ {
        self.get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child))
    }

    /// Walk from `id` up to the root, starting with `id` itself.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_, K, V> {
        Ancestors {
            tree: self,
            next: self.get(id).map(|_| id),
        }
    }

    /// Tag names from the root down to `id`.
    pub fn path(&self, id: ElementId) -> Vec<&str> {
        let mut names: Vec<&str> = self.ancestors(id).map(Element::name).collect();
        names.reverse();
        names
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in pre-order, which is also resolver call order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element<K, V>)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .map(|(idx, element)| (ElementId(idx), element))
    }
}

/// Iterator over an element and its ancestors, innermost first.
#[derive(Debug)]
pub struct Ancestors<'t, K, V> {
    tree: &'t ElementTree<K, V>,
    next: Option<ElementId>,
}

impl<'t, K, V> Iterator for Ancestors<'t, K, V> {
    type Item = &'t Element<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.tree.get(self.next?)?;
        self.next = element.parent;
        Some(element)
    }
}

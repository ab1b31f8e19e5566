//! Tag tree construction and per-run attribute merging.
//!
//! [`TagTreeBuilder`] is the event sink for [`crate::events::read_markup_events`].
//! It keeps the open-element stack, asks the [`Attributer`] for each element
//! exactly once, and appends one styled run per text event.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::attributes::{Attr, ResolvedAttributes};
use crate::error::UntagError;
use crate::events::MarkupEvent;
use crate::resolver::Attributer;
use crate::styled::StyledText;
use crate::tree::{ElementId, ElementTree};
use crate::untagger::UntagLimits;

/// Lifecycle of one parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildState {
    /// No event seen yet.
    NotStarted,
    /// Between document start and document end.
    Parsing,
    /// Document end reached with a consistent tree.
    Succeeded,
    /// An event was rejected; nothing further is accepted.
    Failed,
}

/// Tree and styled text produced by a successful build.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedMarkup<K, V> {
    tree: ElementTree<K, V>,
    styled: StyledText<K, V>,
}

impl<K, V> ParsedMarkup<K, V> {
    pub fn tree(&self) -> &ElementTree<K, V> {
        &self.tree
    }

    pub fn styled(&self) -> &StyledText<K, V> {
        &self.styled
    }

    pub fn into_styled(self) -> StyledText<K, V> {
        self.styled
    }

    pub fn into_parts(self) -> (ElementTree<K, V>, StyledText<K, V>) {
        (self.tree, self.styled)
    }
}

/// Event sink building the element tree and the styled output.
pub struct TagTreeBuilder<'a, K, V, A: ?Sized> {
    attributer: &'a mut A,
    limits: UntagLimits,
    state: BuildState,
    tree: ElementTree<K, V>,
    stack: SmallVec<[ElementId; 8]>,
    output: Option<StyledText<K, V>>,
    // Element that owns the last appended run; cleared by any tag event.
    run_owner: Option<ElementId>,
    root_closed: bool,
}

impl<'a, K, V, A> TagTreeBuilder<'a, K, V, A>
where
    K: Ord + Clone,
    V: Clone,
    A: Attributer<K, V> + ?Sized,
{
    pub fn new(attributer: &'a mut A, limits: UntagLimits) -> Self {
        Self {
            attributer,
            limits,
            state: BuildState::NotStarted,
            tree: ElementTree::new(),
            stack: SmallVec::new(),
            output: None,
            run_owner: None,
            root_closed: false,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Current open-element depth, root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Feed one event. Any error moves the builder to [`BuildState::Failed`].
    pub fn handle(&mut self, event: MarkupEvent<'_>) -> Result<(), UntagError> {
        let result = self.apply(event);
        if result.is_err() {
            self.state = BuildState::Failed;
        }
        result
    }

    /// Consume the builder, yielding the tree and styled text.
    pub fn finish(self) -> Result<ParsedMarkup<K, V>, UntagError> {
        if self.state != BuildState::Succeeded {
            return Err(UntagError::missing_result(format!(
                "Build finished in state {:?}",
                self.state
            )));
        }
        let Some(styled) = self.output else {
            return Err(UntagError::missing_result("No output buffer was produced"));
        };
        if self.tree.is_empty() {
            return Err(UntagError::missing_result("No root element was produced"));
        }
        Ok(ParsedMarkup {
            tree: self.tree,
            styled,
        })
    }

    fn apply(&mut self, event: MarkupEvent<'_>) -> Result<(), UntagError> {
        match (self.state, event) {
            (BuildState::NotStarted, MarkupEvent::DocumentStart) => {
                self.state = BuildState::Parsing;
                self.output = Some(StyledText::new());
                Ok(())
            }
            (BuildState::Parsing, MarkupEvent::StartElement(name)) => self.open_element(name),
            (BuildState::Parsing, MarkupEvent::EndElement(name)) => self.close_element(name),
            (BuildState::Parsing, MarkupEvent::Characters(text)) => {
                self.append_text(text);
                Ok(())
            }
            (BuildState::Parsing, MarkupEvent::Ignored) => Ok(()),
            (BuildState::Parsing, MarkupEvent::DocumentEnd) => {
                if let Some(open) = self.stack.last().and_then(|id| self.tree.get(*id)) {
                    return Err(UntagError::validation(
                        "UNCLOSED_ELEMENT",
                        format!("Element <{}> is never closed", open.name()),
                    )
                    .with_tag(open.name()));
                }
                self.state = BuildState::Succeeded;
                Ok(())
            }
            (state, event) => Err(UntagError::validation(
                "EVENT_OUT_OF_ORDER",
                format!("Event {:?} not accepted in state {:?}", event, state),
            )),
        }
    }

    fn open_element(&mut self, name: &str) -> Result<(), UntagError> {
        if self.root_closed {
            return Err(UntagError::validation(
                "EXTRA_ROOT_ELEMENT",
                format!("Element <{}> starts after the root element closed", name),
            )
            .with_tag(name));
        }
        let depth = self.stack.len() + 1;
        if depth > self.limits.max_depth {
            return Err(UntagError::validation(
                "LIMIT_EXCEEDED",
                "Element nesting exceeds max_depth",
            )
            .with_limit("max_depth", depth, self.limits.max_depth)
            .with_tag(name));
        }
        let count = self.tree.len() + 1;
        if count > self.limits.max_elements {
            return Err(UntagError::validation(
                "LIMIT_EXCEEDED",
                "Element count exceeds max_elements",
            )
            .with_limit("max_elements", count, self.limits.max_elements)
            .with_tag(name));
        }

        let parent = self.stack.last().copied();
        let mut path: SmallVec<[&str; 8]> = self
            .stack
            .iter()
            .filter_map(|id| self.tree.get(*id))
            .map(|element| element.name())
            .collect();
        path.push(name);
        log::trace!("resolving attributes for {}", path.join("."));
        let attributes = self.attributer.attributes(name, &path);
        drop(path);

        let id = self.tree.push(String::from(name), attributes, parent);
        self.stack.push(id);
        self.run_owner = None;
        Ok(())
    }

    fn close_element(&mut self, name: &str) -> Result<(), UntagError> {
        let Some(&top) = self.stack.last() else {
            return Err(UntagError::validation(
                "UNMATCHED_END_TAG",
                format!("End tag </{}> has no open element", name),
            )
            .with_tag(name));
        };
        let open_name = self.tree.get(top).map(|e| e.name()).unwrap_or_default();
        if open_name != name {
            return Err(UntagError::validation(
                "MISMATCHED_END_TAG",
                format!("End tag </{}> does not close <{}>", name, open_name),
            )
            .with_tag(name)
            .with_expected_tag(open_name));
        }
        self.stack.pop();
        if self.stack.is_empty() {
            self.root_closed = true;
        }
        self.run_owner = None;
        Ok(())
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(&current) = self.stack.last() else {
            log::trace!("text outside of any element skipped: {:?}", text);
            return;
        };
        let Some(output) = self.output.as_mut() else {
            return;
        };
        if self.run_owner == Some(current) && output.extend_last(text) {
            return;
        }
        output.push_run(text, merge_attributes(&self.tree, current));
        self.run_owner = Some(current);
    }
}

/// Resolve the attributes in effect for text directly inside `element`.
///
/// Values from closer elements win over ancestors. An [`Attr::Unset`] value
/// takes the root element's value for that key, or drops the key when the
/// root has no concrete value for it.
pub fn merge_attributes<K, V>(
    tree: &ElementTree<K, V>,
    element: ElementId,
) -> ResolvedAttributes<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    let mut merged: BTreeMap<&K, &Attr<V>> = BTreeMap::new();
    for ancestor in tree.ancestors(element) {
        for (key, value) in ancestor.attributes() {
            merged.entry(key).or_insert(value);
        }
    }

    let root = tree.root().map(|root| root.attributes());
    let mut resolved = ResolvedAttributes::new();
    for (key, value) in merged {
        match value {
            Attr::Value(value) => resolved.insert(key.clone(), value.clone()),
            Attr::Unset => {
                if let Some(Attr::Value(root_value)) = root.and_then(|attrs| attrs.get(key)) {
                    resolved.insert(key.clone(), root_value.clone());
                }
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::resolver::TagMap;

    type Map = TagMap<&'static str, &'static str>;

    fn feed(
        map: &mut Map,
        events: &[MarkupEvent<'_>],
    ) -> Result<ParsedMarkup<&'static str, &'static str>, UntagError> {
        let mut builder = TagTreeBuilder::new(map, UntagLimits::default());
        for event in events {
            builder.handle(*event)?;
        }
        builder.finish()
    }

    fn nested_events() -> Vec<MarkupEvent<'static>> {
        vec![
            MarkupEvent::DocumentStart,
            MarkupEvent::StartElement("root"),
            MarkupEvent::StartElement("outer"),
            MarkupEvent::Characters("start"),
            MarkupEvent::StartElement("inner"),
            MarkupEvent::Characters("mid"),
            MarkupEvent::EndElement("inner"),
            MarkupEvent::Characters("end"),
            MarkupEvent::EndElement("outer"),
            MarkupEvent::EndElement("root"),
            MarkupEvent::DocumentEnd,
        ]
    }

    #[test]
    fn child_values_override_and_parent_values_inherit() {
        let mut map = Map::new()
            .tag("outer", Attributes::new().with("color", "red").with("font", "F17"))
            .tag("inner", Attributes::new().with("color", "blue"));
        let parsed = feed(&mut map, &nested_events()).expect("build should succeed");
        let runs = parsed.styled().runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text, "mid");
        assert_eq!(runs[1].attributes.get(&"color"), Some(&"blue"));
        assert_eq!(runs[1].attributes.get(&"font"), Some(&"F17"));
        assert_eq!(runs[2].attributes.get(&"color"), Some(&"red"));
    }

    #[test]
    fn unset_takes_root_value_or_disappears() {
        let mut map = Map::new()
            .tag("root", Attributes::new().with("font", "F12"))
            .tag("outer", Attributes::new().with("font", "F17").with("color", "red"))
            .tag("inner", Attributes::new().with_unset("font").with_unset("color"));
        let parsed = feed(&mut map, &nested_events()).expect("build should succeed");
        let mid = &parsed.styled().runs()[1].attributes;
        assert_eq!(mid.get(&"font"), Some(&"F12"));
        assert!(!mid.contains_key(&"color"));
    }

    #[test]
    fn unset_on_root_is_dropped() {
        let mut map = Map::new().tag("root", Attributes::new().with_unset("font"));
        let events = [
            MarkupEvent::DocumentStart,
            MarkupEvent::StartElement("root"),
            MarkupEvent::Characters("x"),
            MarkupEvent::EndElement("root"),
            MarkupEvent::DocumentEnd,
        ];
        let parsed = feed(&mut map, &events).expect("build should succeed");
        assert!(parsed.styled().is_plain());
    }

    #[test]
    fn consecutive_text_in_same_element_extends_run() {
        let mut map = Map::new();
        let events = [
            MarkupEvent::DocumentStart,
            MarkupEvent::StartElement("root"),
            MarkupEvent::Characters("a "),
            MarkupEvent::Characters("&"),
            MarkupEvent::Ignored,
            MarkupEvent::Characters(" b"),
            MarkupEvent::EndElement("root"),
            MarkupEvent::DocumentEnd,
        ];
        let parsed = feed(&mut map, &events).expect("build should succeed");
        assert_eq!(parsed.styled().runs().len(), 1);
        assert_eq!(parsed.styled().text(), "a & b");
    }

    #[test]
    fn into_parts_returns_tree_and_styled_text() {
        let mut map = Map::new().tag("inner", Attributes::new().with("color", "blue"));
        let (tree, styled) = feed(&mut map, &nested_events())
            .expect("build should succeed")
            .into_parts();
        assert_eq!(tree.root().map(|root| root.name()), Some("root"));
        assert_eq!(styled.text(), "startmidend");
        assert_eq!(
            styled.attribute_at(&"color", 5).map(|(v, r)| (*v, r)),
            Some(("blue", 5..8))
        );
    }

    #[test]
    fn tree_mirrors_nesting() {
        let mut map = Map::new();
        let parsed = feed(&mut map, &nested_events()).expect("build should succeed");
        let tree = parsed.tree();
        assert_eq!(tree.len(), 3);
        let names: Vec<_> = tree.iter().map(|(_, e)| e.name()).collect();
        assert_eq!(names, vec!["root", "outer", "inner"]);
        let (inner_id, _) = tree.iter().last().expect("inner");
        assert_eq!(tree.path(inner_id), vec!["root", "outer", "inner"]);
    }

    #[test]
    fn attributer_sees_path_including_self() {
        let mut paths = Vec::new();
        let mut attributer = |_tag: &str, path: &[&str]| -> Attributes<&'static str, u32> {
            paths.push(path.join("."));
            Attributes::new()
        };
        let mut builder: TagTreeBuilder<'_, &'static str, u32, _> =
            TagTreeBuilder::new(&mut attributer, UntagLimits::default());
        for event in nested_events() {
            builder.handle(event).expect("event accepted");
        }
        builder.finish().expect("build should succeed");
        assert_eq!(paths, vec!["root", "root.outer", "root.outer.inner"]);
    }

    #[test]
    fn mismatched_end_tag_fails_the_build() {
        let mut map = Map::new();
        let mut builder: TagTreeBuilder<'_, &str, &str, Map> =
            TagTreeBuilder::new(&mut map, UntagLimits::default());
        builder.handle(MarkupEvent::DocumentStart).expect("start");
        builder.handle(MarkupEvent::StartElement("root")).expect("root");
        builder.handle(MarkupEvent::StartElement("inner")).expect("inner");
        let err = builder
            .handle(MarkupEvent::EndElement("outter"))
            .expect_err("mismatch rejected");
        assert_eq!(err.code, "MISMATCHED_END_TAG");
        assert_eq!(builder.state(), BuildState::Failed);
        assert_eq!(builder.depth(), 2);

        let err = builder
            .handle(MarkupEvent::Characters("late"))
            .expect_err("no events after failure");
        assert_eq!(err.code, "EVENT_OUT_OF_ORDER");
        assert_eq!(builder.finish().expect_err("failed").code, "MISSING_RESULT");
    }

    #[test]
    fn events_before_document_start_are_rejected() {
        let mut map = Map::new();
        let mut builder: TagTreeBuilder<'_, &str, &str, Map> =
            TagTreeBuilder::new(&mut map, UntagLimits::default());
        let err = builder
            .handle(MarkupEvent::StartElement("root"))
            .expect_err("not started");
        assert_eq!(err.code, "EVENT_OUT_OF_ORDER");
    }

    #[test]
    fn unclosed_element_fails_at_document_end() {
        let mut map = Map::new();
        let events = [
            MarkupEvent::DocumentStart,
            MarkupEvent::StartElement("root"),
            MarkupEvent::DocumentEnd,
        ];
        assert_eq!(
            feed(&mut map, &events).expect_err("unclosed").code,
            "UNCLOSED_ELEMENT"
        );
    }

    #[test]
    fn second_top_level_element_is_rejected() {
        let mut map = Map::new();
        let events = [
            MarkupEvent::DocumentStart,
            MarkupEvent::StartElement("root"),
            MarkupEvent::EndElement("root"),
            MarkupEvent::StartElement("root"),
        ];
        assert_eq!(
            feed(&mut map, &events).expect_err("extra root").code,
            "EXTRA_ROOT_ELEMENT"
        );
    }

    #[test]
    fn text_with_empty_stack_is_skipped() {
        let mut map = Map::new();
        let events = [
            MarkupEvent::DocumentStart,
            MarkupEvent::Characters("before"),
            MarkupEvent::StartElement("root"),
            MarkupEvent::Characters("in"),
            MarkupEvent::EndElement("root"),
            MarkupEvent::Characters("\n"),
            MarkupEvent::DocumentEnd,
        ];
        let parsed = feed(&mut map, &events).expect("build should succeed");
        assert_eq!(parsed.styled().text(), "in");
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut map = Map::new();
        let limits = UntagLimits {
            max_depth: 2,
            ..UntagLimits::default()
        };
        let mut builder: TagTreeBuilder<'_, &str, &str, Map> =
            TagTreeBuilder::new(&mut map, limits);
        builder.handle(MarkupEvent::DocumentStart).expect("start");
        builder.handle(MarkupEvent::StartElement("root")).expect("root");
        builder.handle(MarkupEvent::StartElement("a")).expect("a");
        let err = builder
            .handle(MarkupEvent::StartElement("b"))
            .expect_err("too deep");
        assert_eq!(err.code, "LIMIT_EXCEEDED");
        assert_eq!(err.limit.as_deref().map(|l| l.kind), Some("max_depth"));
    }

    #[test]
    fn merge_ignores_siblings() {
        let mut tree: ElementTree<&str, u32> = ElementTree::new();
        let root = tree.push("root", Attributes::new().with("size", 12), None);
        tree.push("b", Attributes::new().with("weight", 700), Some(root));
        let i = tree.push("i", Attributes::new().with("slant", 1), Some(root));
        let merged = merge_attributes(&tree, i);
        let keys: Vec<_> = merged.keys().copied().collect();
        assert_eq!(keys, vec!["size", "slant"]);
    }
}

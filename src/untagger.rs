//! Entry points: wrap, tokenize, build, and degrade gracefully.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use crate::attributes::Attributes;
use crate::builder::{ParsedMarkup, TagTreeBuilder};
use crate::error::UntagError;
use crate::events::{is_xml_name, read_markup_events};
use crate::resolver::{Attributer, ByName, MapLookup, TagMap};
use crate::styled::StyledText;

/// Tag name used for the synthetic wrapper when none is configured.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Hard bounds applied to every parse.
///
/// The default is unbounded so every well-formed input is styled. Use
/// [`UntagLimits::strict`] for untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UntagLimits {
    /// Maximum input length in bytes, before wrapping.
    pub max_input_bytes: usize,
    /// Maximum element nesting depth, synthetic root included.
    pub max_depth: usize,
    /// Maximum number of elements, synthetic root included.
    pub max_elements: usize,
}

impl Default for UntagLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: usize::MAX,
            max_depth: usize::MAX,
            max_elements: usize::MAX,
        }
    }
}

impl UntagLimits {
    /// Tight preset for untrusted, UI-sized strings.
    pub fn strict() -> Self {
        Self {
            max_input_bytes: 16 * 1024,
            max_depth: 32,
            max_elements: 1024,
        }
    }
}

/// Untagger options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UntagConfig {
    /// Name of the synthetic tag wrapped around every input.
    pub root_name: String,
    /// Hard parsing limits.
    pub limits: UntagLimits,
}

impl Default for UntagConfig {
    fn default() -> Self {
        Self {
            root_name: String::from(DEFAULT_ROOT_NAME),
            limits: UntagLimits::default(),
        }
    }
}

/// Converts tagged strings into [`StyledText`].
///
/// Holds configuration only; every call owns its own stack, tree and output.
///
/// ```
/// use string_untagger::{Attributes, TagMap, Untagger};
///
/// let styles = TagMap::new()
///     .tag("root", Attributes::new().with("color", "gray"))
///     .tag("i", Attributes::new().with("font", "bold"));
/// let text = Untagger::new().attributed_string_from_map("click <i>here</i> please", &styles);
///
/// assert_eq!(text.text(), "click here please");
/// assert_eq!(text.attribute_at(&"font", 6).map(|(v, r)| (*v, r)), Some(("bold", 6..10)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Untagger {
    config: UntagConfig,
}

impl Untagger {
    /// Untagger wrapping inputs in `<root>…</root>`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Untagger with a custom wrapper tag name.
    ///
    /// Use this when inputs contain a literal tag with the default root name.
    pub fn with_root_name(root_name: impl Into<String>) -> Self {
        Self::with_config(UntagConfig {
            root_name: root_name.into(),
            ..UntagConfig::default()
        })
    }

    pub fn with_config(config: UntagConfig) -> Self {
        Self { config }
    }

    pub fn root_name(&self) -> &str {
        &self.config.root_name
    }

    pub fn config(&self) -> &UntagConfig {
        &self.config
    }

    /// Parse `input`, returning the element tree and styled text.
    pub fn parse<K, V, A>(
        &self,
        input: &str,
        attributer: &mut A,
    ) -> Result<ParsedMarkup<K, V>, UntagError>
    where
        K: Ord + Clone,
        V: Clone,
        A: Attributer<K, V> + ?Sized,
    {
        let root_name = self.config.root_name.as_str();
        if !is_xml_name(root_name) {
            return Err(UntagError::validation(
                "INVALID_ROOT_NAME",
                format!("Root name {:?} is not a valid tag name", root_name),
            )
            .with_tag(root_name));
        }
        let limits = self.config.limits;
        if input.len() > limits.max_input_bytes {
            return Err(UntagError::validation(
                "LIMIT_EXCEEDED",
                "Input exceeds max_input_bytes",
            )
            .with_limit("max_input_bytes", input.len(), limits.max_input_bytes));
        }

        let prefix_len = root_name.len() + 2;
        let mut wrapped = String::with_capacity(input.len() + 2 * prefix_len + 1);
        wrapped.push('<');
        wrapped.push_str(root_name);
        wrapped.push('>');
        wrapped.push_str(input);
        wrapped.push_str("</");
        wrapped.push_str(root_name);
        wrapped.push('>');

        let mut builder = TagTreeBuilder::new(attributer, limits);
        read_markup_events(&wrapped, |event| builder.handle(event))
            .map_err(|err| err.shift_token_offset(prefix_len))?;
        builder.finish()
    }

    /// Styled text for `input`, or the error that prevented styling.
    pub fn try_attributed_string<K, V, A>(
        &self,
        input: &str,
        attributer: &mut A,
    ) -> Result<StyledText<K, V>, UntagError>
    where
        K: Ord + Clone,
        V: Clone,
        A: Attributer<K, V> + ?Sized,
    {
        self.parse(input, attributer).map(ParsedMarkup::into_styled)
    }

    /// Styled text for `input`; never fails.
    ///
    /// When the markup cannot be parsed the original `input` comes back
    /// verbatim with no attributes, and the reason is logged at `warn`.
    pub fn attributed_string<K, V, A>(&self, input: &str, attributer: &mut A) -> StyledText<K, V>
    where
        K: Ord + Clone,
        V: Clone,
        A: Attributer<K, V> + ?Sized,
    {
        match self.try_attributed_string(input, attributer) {
            Ok(styled) => {
                log::debug!(
                    "untagged {} bytes into {} runs",
                    input.len(),
                    styled.runs().len()
                );
                styled
            }
            Err(err) => {
                log::warn!("untag failed, returning input unstyled: {}", err);
                StyledText::plain(input)
            }
        }
    }

    /// [`Untagger::attributed_string`] with a `(tag, path)` closure.
    pub fn attributed_string_with<K, V, F>(&self, input: &str, attributer: F) -> StyledText<K, V>
    where
        K: Ord + Clone,
        V: Clone,
        F: FnMut(&str, &[&str]) -> Attributes<K, V>,
    {
        let mut attributer = attributer;
        self.attributed_string(input, &mut attributer)
    }

    /// [`Untagger::attributed_string`] with a closure over the tag name only.
    pub fn attributed_string_by_name<K, V, F>(
        &self,
        input: &str,
        attributer: F,
    ) -> StyledText<K, V>
    where
        K: Ord + Clone,
        V: Clone,
        F: FnMut(&str) -> Attributes<K, V>,
    {
        self.attributed_string(input, &mut ByName(attributer))
    }

    /// [`Untagger::attributed_string`] with a static tag dictionary.
    pub fn attributed_string_from_map<K, V>(
        &self,
        input: &str,
        attributes: &TagMap<K, V>,
    ) -> StyledText<K, V>
    where
        K: Ord + Clone,
        V: Clone,
    {
        self.attributed_string(input, &mut MapLookup(attributes))
    }
}

/// String-side shorthand using the default root name.
pub trait Untag {
    /// Styled text using a static tag dictionary.
    fn untagged<K: Ord + Clone, V: Clone>(&self, attributes: &TagMap<K, V>) -> StyledText<K, V>;

    /// Styled text using a `(tag, path)` closure.
    fn untagged_with<K, V, F>(&self, attributer: F) -> StyledText<K, V>
    where
        K: Ord + Clone,
        V: Clone,
        F: FnMut(&str, &[&str]) -> Attributes<K, V>;
}

impl Untag for str {
    fn untagged<K: Ord + Clone, V: Clone>(&self, attributes: &TagMap<K, V>) -> StyledText<K, V> {
        Untagger::new().attributed_string_from_map(self, attributes)
    }

    fn untagged_with<K, V, F>(&self, attributer: F) -> StyledText<K, V>
    where
        K: Ord + Clone,
        V: Clone,
        F: FnMut(&str, &[&str]) -> Attributes<K, V>,
    {
        Untagger::new().attributed_string_with(self, attributer)
    }
}

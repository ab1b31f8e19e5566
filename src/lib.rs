//! Turn strings with lightweight XML-style tags into attributed text.
//!
//! Each tag name maps to a set of caller-defined attributes. Text inherits
//! the attributes of every enclosing tag, with inner tags winning on
//! conflicts, and [`Attr::Unset`] resetting a key to the root's value.
//!
//! # Usage
//!
//! ```rust
//! use string_untagger::{Attributes, Untagger};
//!
//! let untagger = Untagger::new();
//! let text = untagger.attributed_string_with(
//!     "<outer>start<inner>mid</inner>end</outer>",
//!     |tag: &str, _path: &[&str]| match tag {
//!         "outer" => Attributes::new().with("color", "red").with("font", "F17"),
//!         "inner" => Attributes::new().with("color", "blue"),
//!         _ => Attributes::new(),
//!     },
//! );
//!
//! assert_eq!(text.text(), "startmidend");
//! let (mid, range) = text.attributes_at(5).expect("offset in range");
//! assert_eq!(range, 5..8);
//! assert_eq!(mid.get(&"color"), Some(&"blue"));
//! assert_eq!(mid.get(&"font"), Some(&"F17"));
//! ```
//!
//! Malformed markup never errors at this level: the input is returned as-is,
//! unstyled. Use [`Untagger::try_attributed_string`] or [`Untagger::parse`]
//! to observe the failure.

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod attributes;
pub mod builder;
pub mod error;
pub mod events;
pub mod resolver;
pub mod styled;
pub mod tree;
pub mod untagger;

pub use attributes::{Attr, Attributes, ResolvedAttributes};
pub use builder::{merge_attributes, BuildState, ParsedMarkup, TagTreeBuilder};
pub use error::{ErrorLimitContext, ErrorPhase, UntagError, UntagErrorContext};
pub use events::{read_markup_events, MarkupEvent};
pub use resolver::{Attributer, ByName, TagMap};
pub use styled::{StyledRun, StyledText};
pub use tree::{Ancestors, Element, ElementId, ElementTree};
pub use untagger::{Untag, UntagConfig, UntagLimits, Untagger, DEFAULT_ROOT_NAME};

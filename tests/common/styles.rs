use std::ops::Range;

use string_untagger::StyledText;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    ForegroundColor,
    Font,
    UnderlineStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value {
    Color(&'static str),
    Font { size: u8, bold: bool },
    Underline(&'static str),
}

pub const GRAY: Value = Value::Color("gray");
pub const LIGHT_GRAY: Value = Value::Color("lightGray");
pub const RED: Value = Value::Color("red");
pub const BLUE: Value = Value::Color("blue");
pub const GREEN: Value = Value::Color("green");
pub const MAGENTA: Value = Value::Color("magenta");
pub const FONT_12: Value = Value::Font {
    size: 12,
    bold: false,
};
pub const FONT_17: Value = Value::Font {
    size: 17,
    bold: false,
};
pub const FONT_17B: Value = Value::Font {
    size: 17,
    bold: true,
};
pub const FONT_18B: Value = Value::Font {
    size: 18,
    bold: true,
};
pub const DOUBLE: Value = Value::Underline("double");

/// Assert the full attribute set at `range.start` and that it spans exactly `range`.
#[track_caller]
pub fn assert_attributes_at(
    text: &StyledText<Key, Value>,
    expected: &[(Key, Value)],
    range: Range<usize>,
) {
    let (found, found_range) = text
        .attributes_at(range.start)
        .unwrap_or_else(|| panic!("no run at offset {}", range.start));
    assert_eq!(found_range, range, "effective range at {}", range.start);
    let found: Vec<(Key, Value)> = found.iter().map(|(k, v)| (*k, *v)).collect();
    let mut expected = expected.to_vec();
    expected.sort_by_key(|(k, _)| *k);
    assert_eq!(found, expected, "attributes at {:?}", range);
}

#[track_caller]
pub fn assert_no_attributes(text: &StyledText<Key, Value>, range: Range<usize>) {
    let (found, found_range) = text
        .attributes_at(range.start)
        .unwrap_or_else(|| panic!("no run at offset {}", range.start));
    assert!(found.is_empty(), "unexpected attributes {:?}", found);
    assert_eq!(found_range, range);
}

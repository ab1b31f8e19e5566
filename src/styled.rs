//! Styled text output: ordered runs of text with resolved attributes.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::attributes::ResolvedAttributes;

/// Contiguous text sharing one resolved attribute set.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledRun<K, V> {
    /// Run text, tags stripped.
    pub text: String,
    /// Attributes after inheritance and sentinel resolution.
    pub attributes: ResolvedAttributes<K, V>,
}

/// Attributed text produced by one untag call.
///
/// Offsets are UTF-8 byte offsets into [`StyledText::text`].
#[derive(Clone, Debug, PartialEq)]
pub struct StyledText<K, V> {
    runs: Vec<StyledRun<K, V>>,
    len: usize,
}

impl<K, V> Default for StyledText<K, V> {
    fn default() -> Self {
        Self {
            runs: Vec::with_capacity(8),
            len: 0,
        }
    }
}

impl<K: Ord, V> StyledText<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unstyled text: one attribute-free run, or none for `""`.
    pub fn plain(text: &str) -> Self {
        let mut out = Self::new();
        out.push_run(text, ResolvedAttributes::new());
        out
    }

    /// Append a run. Empty text is dropped.
    pub fn push_run(&mut self, text: &str, attributes: ResolvedAttributes<K, V>) {
        if text.is_empty() {
            return;
        }
        self.len += text.len();
        self.runs.push(StyledRun {
            text: text.into(),
            attributes,
        });
    }

    /// Extend the last run's text without touching its attributes.
    ///
    /// Returns false when there is no run to extend.
    pub(crate) fn extend_last(&mut self, text: &str) -> bool {
        match self.runs.last_mut() {
            Some(run) => {
                run.text.push_str(text);
                self.len += text.len();
                true
            }
            None => false,
        }
    }

    pub fn runs(&self) -> &[StyledRun<K, V>] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<StyledRun<K, V>> {
        self.runs
    }

    /// Concatenation of all run texts.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.len);
        for run in &self.runs {
            out.push_str(&run.text);
        }
        out
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when no run carries any attribute.
    pub fn is_plain(&self) -> bool {
        self.runs.iter().all(|run| run.attributes.is_empty())
    }

    /// Byte range covered by each run, in order.
    pub fn run_ranges(&self) -> impl Iterator<Item = (Range<usize>, &StyledRun<K, V>)> + '_ {
        let mut start = 0usize;
        self.runs.iter().map(move |run| {
            let end = start + run.text.len();
            let range = start..end;
            start = end;
            (range, run)
        })
    }
}

impl<K: Ord, V: PartialEq> StyledText<K, V> {
    /// Attributes at `offset` and the widest range around it with the same set.
    ///
    /// Adjacent runs with equal attribute sets are reported as one range.
    pub fn attributes_at(
        &self,
        offset: usize,
    ) -> Option<(&ResolvedAttributes<K, V>, Range<usize>)> {
        let ranges: Vec<(Range<usize>, &StyledRun<K, V>)> = self.run_ranges().collect();
        let hit = ranges.iter().position(|(range, _)| range.contains(&offset))?;
        let attributes = &ranges[hit].1.attributes;

        let mut first = hit;
        while first > 0 && ranges[first - 1].1.attributes == *attributes {
            first -= 1;
        }
        let mut last = hit;
        while last + 1 < ranges.len() && ranges[last + 1].1.attributes == *attributes {
            last += 1;
        }
        Some((attributes, ranges[first].0.start..ranges[last].0.end))
    }

    /// Value of one attribute at `offset`, with its effective range.
    pub fn attribute_at(&self, key: &K, offset: usize) -> Option<(&V, Range<usize>)> {
        let (attributes, range) = self.attributes_at(offset)?;
        attributes.get(key).map(|value| (value, range))
    }
}

//! Match results: the output of the recognizer.
//!
//! A [`MatchResult`] is produced per (section, utterance) pair and consumed
//! immediately by the dispatcher. It names the winning pattern by its index
//! within the section and carries the slots that pattern's capture elements
//! bound.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use crate::score::Confidence;

/// The value bound to one capture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotValue {
    /// The original utterance text covered by the slot.
    pub text: String,
    /// Token positions bound to the slot.
    pub tokens: Range<usize>,
    /// Byte range of `text` within the utterance.
    pub span: Range<usize>,
}

/// Slot name to slot value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slots(BTreeMap<String, SlotValue>);

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: SlotValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&SlotValue> {
        self.0.get(name)
    }

    /// The text bound to a slot, if it was captured.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|value| value.text.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl fmt::Display for Slots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {:?}", value.text)?;
        }
        write!(f, "}}")
    }
}

/// The recognizer's verdict for one section and one utterance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub score: Confidence,
    /// Index of the matched pattern within its section.
    pub pattern: Option<usize>,
    pub slots: Slots,
}

impl MatchResult {
    /// A result that matched nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.pattern.is_some() && !self.score.is_zero()
    }

    /// True when this is a match whose score is strictly above `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.is_match() && self.score.value() > threshold
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern {
            Some(index) => write!(f, "pattern #{index} {} (score: {})", self.slots, self.score),
            None => write!(f, "no match"),
        }
    }
}

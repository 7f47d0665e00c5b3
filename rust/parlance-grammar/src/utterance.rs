//! Utterance layer: the raw text of one user input and its tokens.
//!
//! An utterance is created once per dispatch and tokenized exactly once.
//! Every section is scored against the same token sequence, and slot values
//! are sliced back out of the original text so that capture results keep the
//! user's spelling and spacing.

use std::ops::Range;

use crate::token::{Token, tokenize};

/// One spoken or typed user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    tokens: Vec<Token>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = tokenize(&text);
        Utterance { text, tokens }
    }

    /// The raw input text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the input contains no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Byte range in the raw text covered by a range of token positions.
    ///
    /// Returns `None` for an empty or out-of-bounds token range.
    pub fn byte_span(&self, tokens: Range<usize>) -> Option<Range<usize>> {
        if tokens.is_empty() || tokens.end > self.tokens.len() {
            return None;
        }
        Some(self.tokens[tokens.start].span.start..self.tokens[tokens.end - 1].span.end)
    }

    /// The original text covered by a range of token positions.
    pub fn slice(&self, tokens: Range<usize>) -> Option<&str> {
        self.byte_span(tokens).map(|span| &self.text[span])
    }
}

impl From<&str> for Utterance {
    fn from(text: &str) -> Self {
        Utterance::new(text)
    }
}

//! Tokenization layer: splitting utterance text into normalized tokens.
//!
//! Both utterances and the literal words of pattern definitions go through
//! the same tokenizer, so a literal matches a token exactly when their
//! normalized values are equal. Normalization lower-cases, folds typographic
//! apostrophes and strips diacritics, so "Café" and "cafe" compare equal.

use std::ops::Range;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A single token extracted from input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The normalized value used for matching.
    pub value: String,
    /// The original text before normalization.
    pub original: String,
    /// Zero-based position in the token sequence.
    pub position: usize,
    /// Byte range of the token within the source text.
    pub span: Range<usize>,
    /// What kind of token this is.
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A token containing at least one letter.
    Word,
    /// A token made only of digits.
    Number,
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '\u{2019}'
}

/// Normalize a single word for matching.
pub fn normalize(word: &str) -> String {
    word.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect()
}

/// Tokenize input text into a sequence of tokens.
///
/// Tokens are maximal runs of alphanumeric characters and apostrophes.
/// Everything else (whitespace, punctuation, symbols) separates tokens and
/// is dropped. Runs made only of apostrophes are dropped as well.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (index, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        match (start, is_token_char(c)) {
            (None, true) => start = Some(index),
            (Some(begin), false) => {
                push_token(&mut tokens, text, begin..index);
                start = None;
            }
            _ => {}
        }
    }

    tokens
}

fn push_token(tokens: &mut Vec<Token>, text: &str, span: Range<usize>) {
    let original = &text[span.clone()];
    if !original.chars().any(char::is_alphanumeric) {
        return;
    }

    let kind = if original.chars().all(|c| c.is_numeric()) {
        TokenKind::Number
    } else {
        TokenKind::Word
    };

    tokens.push(Token {
        value: normalize(original),
        original: original.to_string(),
        position: tokens.len(),
        span,
        kind,
    });
}

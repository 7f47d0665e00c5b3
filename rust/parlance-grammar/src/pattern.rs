//! Pattern compilation: from declarative definitions to a matcher program.
//!
//! A compiled [`Pattern`] is a flat list of ops. Optional segments do not
//! nest in the compiled form; instead an `Optional { end }` op marks the
//! start of its body and records where the body ends, so the recognizer can
//! either step into the body (take it) or jump to `end` (skip it). Because
//! every jump goes forward, the minimum number of tokens each suffix of the
//! program needs can be computed in one backwards pass and used to prune the
//! alignment search.
//!
//! ```text
//! play <song_name> [by <artist>]
//!
//! 0: Literal(play)
//! 1: Capture(song_name)
//! 2: Optional { end: 5 }
//! 3:   Literal(by)
//! 4:   Capture(artist)
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::definition::{
    CAPTURE, ElementDefinition, LITERAL, OPTIONAL, PatternDefinition, WILDCARD,
};
use crate::error::GrammarError;
use crate::token::tokenize;

/// One accepted spelling of a literal element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Phrase {
    /// The word or phrase as written in the definition.
    pub(crate) text: String,
    /// Its normalized tokens.
    pub(crate) tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    /// Matches exactly one of the phrases.
    Literal(Vec<Phrase>),
    /// Binds one or more tokens to the slot with this index.
    Capture(usize),
    /// Swallows zero or more tokens.
    Wildcard,
    /// The ops up to `end` form a body that may be skipped.
    Optional { end: usize },
}

/// An executable pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    ops: Vec<Op>,
    slots: Vec<String>,
    /// `min_tokens[pc]` is the fewest tokens that ops `pc..` can consume.
    min_tokens: Vec<usize>,
}

impl Pattern {
    pub(crate) fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub(crate) fn min_tokens(&self) -> &[usize] {
        &self.min_tokens
    }

    /// Names of the capture slots, in declaration order.
    pub fn slot_names(&self) -> &[String] {
        &self.slots
    }

    pub(crate) fn slot_name(&self, slot: usize) -> &str {
        &self.slots[slot]
    }

    fn fmt_ops(&self, f: &mut fmt::Formatter<'_>, range: std::ops::Range<usize>) -> fmt::Result {
        let mut pc = range.start;
        let mut first = true;
        while pc < range.end {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match &self.ops[pc] {
                Op::Literal(phrases) if phrases.len() == 1 => write!(f, "{}", phrases[0].text)?,
                Op::Literal(phrases) => {
                    let alternatives: Vec<_> = phrases.iter().map(|p| p.text.as_str()).collect();
                    write!(f, "({})", alternatives.join("|"))?;
                }
                Op::Capture(slot) => write!(f, "<{}>", self.slots[*slot])?,
                Op::Wildcard => write!(f, "*")?,
                Op::Optional { end } => {
                    write!(f, "[")?;
                    self.fmt_ops(f, pc + 1..*end)?;
                    write!(f, "]")?;
                    pc = *end;
                    continue;
                }
            }
            pc += 1;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_ops(f, 0..self.ops.len())
    }
}

/// Compile a pattern definition.
///
/// Fails with [`GrammarError::InvalidPatternSpec`] when an element kind is
/// unrecognized, a capture slot name repeats, or an element is empty.
pub fn compile(definition: &PatternDefinition) -> Result<Pattern, GrammarError> {
    if definition.elements.is_empty() {
        return Err(GrammarError::invalid("pattern has no elements"));
    }

    let mut compiler = Compiler::default();
    compiler.elements(&definition.elements)?;

    let min_tokens = minimum_tokens(&compiler.ops);
    Ok(Pattern {
        ops: compiler.ops,
        slots: compiler.slots,
        min_tokens,
    })
}

#[derive(Default)]
struct Compiler {
    ops: Vec<Op>,
    slots: Vec<String>,
    seen: HashSet<String>,
}

impl Compiler {
    fn elements(&mut self, elements: &[ElementDefinition]) -> Result<(), GrammarError> {
        elements.iter().try_for_each(|element| self.element(element))
    }

    fn element(&mut self, element: &ElementDefinition) -> Result<(), GrammarError> {
        match element.kind.as_str() {
            LITERAL => {
                if element.words.is_empty() {
                    return Err(GrammarError::invalid("literal element has no words"));
                }
                let phrases = element
                    .words
                    .iter()
                    .map(|word| phrase(word))
                    .collect::<Result<Vec<_>, _>>()?;
                self.ops.push(Op::Literal(phrases));
            }
            OPTIONAL => {
                if element.elements.is_empty() {
                    return Err(GrammarError::invalid("optional element has no body"));
                }
                let start = self.ops.len();
                self.ops.push(Op::Optional { end: start });
                self.elements(&element.elements)?;
                self.ops[start] = Op::Optional {
                    end: self.ops.len(),
                };
            }
            CAPTURE => {
                let name = element
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| GrammarError::invalid("capture element has no slot name"))?;
                if !self.seen.insert(name.to_string()) {
                    return Err(GrammarError::invalid(format!(
                        "capture slot '{name}' appears more than once"
                    )));
                }
                self.ops.push(Op::Capture(self.slots.len()));
                self.slots.push(name.to_string());
            }
            WILDCARD => self.ops.push(Op::Wildcard),
            other => {
                return Err(GrammarError::invalid(format!(
                    "unrecognized element kind '{other}'"
                )));
            }
        }
        Ok(())
    }
}

fn phrase(word: &str) -> Result<Phrase, GrammarError> {
    let tokens: Vec<String> = tokenize(word).into_iter().map(|t| t.value).collect();
    if tokens.is_empty() {
        return Err(GrammarError::invalid(format!(
            "literal word '{word}' contains no tokens"
        )));
    }
    Ok(Phrase {
        text: word.trim().to_string(),
        tokens,
    })
}

fn minimum_tokens(ops: &[Op]) -> Vec<usize> {
    let mut min = vec![0; ops.len() + 1];
    for pc in (0..ops.len()).rev() {
        min[pc] = match &ops[pc] {
            Op::Literal(phrases) => {
                let shortest = phrases.iter().map(|p| p.tokens.len()).min().unwrap_or(0);
                shortest + min[pc + 1]
            }
            Op::Capture(_) => 1 + min[pc + 1],
            Op::Wildcard => min[pc + 1],
            Op::Optional { end } => min[pc + 1].min(min[*end]),
        };
    }
    min
}

//! The recognizer: scoring an utterance against a section's patterns.
//!
//! For each pattern the recognizer looks for the best alignment of the
//! pattern's ops against a contiguous run of the utterance tokens. Words
//! before or after that run are leftovers: they do not fail the pattern, they
//! count as gap and lower its score.
//!
//! ## Search
//!
//! The search is a memoized walk over `(op, token position)` states. Each
//! state records, per number of literal tokens matched from there to the end,
//! the suffix alignment with the fewest gap tokens. Every state is solved
//! once, so the cost is polynomial in the pattern and utterance lengths no
//! matter how many wildcards and optionals a pattern stacks.
//!
//! - `Literal`: each phrase is tried in declaration order and must equal the
//!   next normalized tokens exactly.
//! - `Optional`: the body is tried first, then the skip.
//! - `Capture`: one token or more, shortest run first.
//! - `Wildcard`: zero tokens or more, shortest run first.
//!
//! Among alignments of one pattern the highest score wins, then the one with
//! more literal tokens, then the first one found in the order above.
//! Branches that cannot possibly fit in the remaining tokens are pruned using
//! the pattern's minimum suffix lengths.
//!
//! Across patterns the highest score wins; on equal scores the pattern
//! declared first wins.

use std::ops::Range;
use std::rc::Rc;

use crate::matching::{MatchResult, SlotValue, Slots};
use crate::pattern::{Op, Pattern};
use crate::score::{Confidence, Coverage, CoverageScorer, Scorer};
use crate::section::Section;
use crate::token::Token;
use crate::utterance::Utterance;

/// Scores utterances against sections.
#[derive(Debug, Clone, Default)]
pub struct Recognizer<S = CoverageScorer> {
    scorer: S,
}

impl Recognizer<CoverageScorer> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Scorer> Recognizer<S> {
    /// A recognizer that scores alignments with a custom scorer.
    pub fn with_scorer(scorer: S) -> Self {
        Recognizer { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score an utterance against every pattern of a section.
    pub fn recognize(&self, section: &Section, utterance: &Utterance) -> MatchResult {
        let result = self.recognize_patterns(section.patterns(), utterance);
        tracing::trace!(skill = section.skill_id(), %result, "recognized");
        result
    }

    /// Score an utterance against an ordered set of patterns.
    pub fn recognize_patterns(&self, patterns: &[Pattern], utterance: &Utterance) -> MatchResult {
        if utterance.is_empty() {
            return MatchResult::none();
        }

        let mut best: Option<(usize, &Pattern, Alignment)> = None;
        for (index, pattern) in patterns.iter().enumerate() {
            let Some(alignment) = self.align(pattern, utterance.tokens()) else {
                continue;
            };
            tracing::trace!(%pattern, score = %alignment.score, "pattern aligned");
            if best
                .as_ref()
                .is_none_or(|(_, _, current)| alignment.score > current.score)
            {
                let perfect = alignment.score == Confidence::CERTAIN;
                best = Some((index, pattern, alignment));
                if perfect {
                    break;
                }
            }
        }

        match best {
            Some((index, pattern, alignment)) => MatchResult {
                score: alignment.score,
                pattern: Some(index),
                slots: alignment.slots(pattern, utterance),
            },
            None => MatchResult::none(),
        }
    }

    /// The best alignment of one pattern, if any scores above zero.
    fn align(&self, pattern: &Pattern, tokens: &[Token]) -> Option<Alignment> {
        let mut search = Search::new(pattern, tokens);
        let total = tokens.len();
        let mut best: Option<Alignment> = None;

        for start in 0..=total {
            if total - start < pattern.min_tokens()[0] {
                break;
            }
            let frontier = search.suffixes(0, start);
            for (literal, suffix) in frontier.entries() {
                if literal == 0 {
                    continue;
                }
                let gap = start + suffix.gap;
                let coverage = Coverage {
                    literal,
                    captured: total - literal - gap,
                    gap,
                };
                let score = self.scorer.score(&coverage);
                if score.is_zero() {
                    continue;
                }
                let better = best.as_ref().is_none_or(|current| {
                    score > current.score
                        || (score == current.score && literal > current.literal)
                });
                if better {
                    best = Some(Alignment {
                        score,
                        literal,
                        captures: suffix.captures.clone(),
                    });
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
struct Alignment {
    score: Confidence,
    literal: usize,
    /// (slot index, token range) in pattern order.
    captures: Vec<(usize, Range<usize>)>,
}

impl Alignment {
    fn slots(&self, pattern: &Pattern, utterance: &Utterance) -> Slots {
        let mut slots = Slots::new();
        for (slot, tokens) in &self.captures {
            let Some(span) = utterance.byte_span(tokens.clone()) else {
                continue;
            };
            slots.insert(
                pattern.slot_name(*slot),
                SlotValue {
                    text: utterance.text()[span.clone()].to_string(),
                    tokens: tokens.clone(),
                    span,
                },
            );
        }
        slots
    }
}

/// The rest of an alignment, from some state to the end of the pattern.
#[derive(Debug, Clone)]
struct Suffix {
    gap: usize,
    captures: Vec<(usize, Range<usize>)>,
}

/// Best suffixes of one state, indexed by the literal tokens they match.
#[derive(Debug)]
struct Frontier(Vec<Option<Suffix>>);

impl Frontier {
    fn new(tokens: usize) -> Self {
        Frontier(vec![None; tokens + 1])
    }

    fn entries(&self) -> impl Iterator<Item = (usize, &Suffix)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(literal, suffix)| Some((literal, suffix.as_ref()?)))
    }

    /// Keep `suffix` if it needs fewer gap tokens than what is there.
    fn offer(&mut self, literal: usize, suffix: Suffix) {
        let entry = &mut self.0[literal];
        if entry.as_ref().is_none_or(|kept| suffix.gap < kept.gap) {
            *entry = Some(suffix);
        }
    }

    /// Offer every suffix of `next`, prefixed by one step of the walk.
    fn extend(
        &mut self,
        next: &Frontier,
        literal: usize,
        gap: usize,
        capture: Option<(usize, Range<usize>)>,
    ) {
        for (suffix_literal, suffix) in next.entries() {
            let total_literal = literal + suffix_literal;
            let total_gap = gap + suffix.gap;
            if self.0[total_literal]
                .as_ref()
                .is_some_and(|kept| kept.gap <= total_gap)
            {
                continue;
            }
            let captures = capture
                .iter()
                .cloned()
                .chain(suffix.captures.iter().cloned())
                .collect();
            self.offer(
                total_literal,
                Suffix {
                    gap: total_gap,
                    captures,
                },
            );
        }
    }
}

struct Search<'a> {
    ops: &'a [Op],
    min_tokens: &'a [usize],
    tokens: &'a [Token],
    /// Solved states, at `pc * (tokens + 1) + pos`.
    memo: Vec<Option<Rc<Frontier>>>,
}

impl<'a> Search<'a> {
    fn new(pattern: &'a Pattern, tokens: &'a [Token]) -> Self {
        let ops = pattern.ops();
        Search {
            ops,
            min_tokens: pattern.min_tokens(),
            tokens,
            memo: vec![None; (ops.len() + 1) * (tokens.len() + 1)],
        }
    }

    fn suffixes(&mut self, pc: usize, pos: usize) -> Rc<Frontier> {
        let key = pc * (self.tokens.len() + 1) + pos;
        if let Some(solved) = &self.memo[key] {
            return solved.clone();
        }

        let frontier = Rc::new(self.solve(pc, pos));
        self.memo[key] = Some(frontier.clone());
        frontier
    }

    fn solve(&mut self, pc: usize, pos: usize) -> Frontier {
        let mut frontier = Frontier::new(self.tokens.len());
        let remaining = self.tokens.len() - pos;
        if remaining < self.min_tokens[pc] {
            return frontier;
        }

        let ops = self.ops;
        let Some(op) = ops.get(pc) else {
            // trailing leftovers
            frontier.offer(
                0,
                Suffix {
                    gap: remaining,
                    captures: Vec::new(),
                },
            );
            return frontier;
        };

        match op {
            Op::Literal(phrases) => {
                for phrase in phrases {
                    if !self.matches_at(&phrase.tokens, pos) {
                        continue;
                    }
                    let len = phrase.tokens.len();
                    let next = self.suffixes(pc + 1, pos + len);
                    frontier.extend(&next, len, 0, None);
                }
            }
            Op::Optional { end } => {
                let taken = self.suffixes(pc + 1, pos);
                frontier.extend(&taken, 0, 0, None);
                let skipped = self.suffixes(*end, pos);
                frontier.extend(&skipped, 0, 0, None);
            }
            Op::Capture(slot) => {
                let longest = remaining - self.min_tokens[pc + 1];
                for len in 1..=longest {
                    let next = self.suffixes(pc + 1, pos + len);
                    frontier.extend(&next, 0, 0, Some((*slot, pos..pos + len)));
                }
            }
            Op::Wildcard => {
                let longest = remaining - self.min_tokens[pc + 1];
                for len in 0..=longest {
                    let next = self.suffixes(pc + 1, pos + len);
                    frontier.extend(&next, 0, len, None);
                }
            }
        }
        frontier
    }

    fn matches_at(&self, phrase: &[String], pos: usize) -> bool {
        self.tokens
            .get(pos..pos + phrase.len())
            .is_some_and(|window| window.iter().zip(phrase).all(|(t, w)| t.value == *w))
    }
}

//! Scoring for pattern alignments.
//!
//! A score has to be comparable across unrelated skills: the dispatcher
//! picks one winner out of every section's best match, so the same
//! utterance scored by two different sections must land on the same scale.
//! The default [`CoverageScorer`] does this by asking a single question of
//! every alignment: of the words that were not bound to a slot, what
//! fraction did the pattern recognize as specific literal terms?
//!
//! ```text
//! pattern:   play <song_name> by <artist>
//! utterance: play bohemian rhapsody by queen
//!            ^^^^ ~~~~~~~~~~~~~~~~~ ^^ ~~~~~
//!            literal   captured  literal captured
//!
//! score = literal / (literal + gap) = 2 / (2 + 0) = 1.0
//! ```
//!
//! Tokens swallowed by wildcard gaps count against the score, and so do
//! leftover words before or after the part of the utterance the pattern
//! covers ("hey play ..." keeps matching, just below 1.0). Captured tokens
//! are neutral. Scorers are pluggable through the [`Scorer`] trait.

use std::fmt;

/// A confidence score in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const CERTAIN: Confidence = Confidence(1.0);

    /// Clamps into [0.0, 1.0]; NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Confidence::ZERO
        } else {
            Confidence(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// How the tokens of an utterance were accounted for by one alignment.
///
/// In a complete alignment `literal + captured + gap` equals the number of
/// tokens in the utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Tokens matched by literal elements.
    pub literal: usize,
    /// Tokens bound to capture slots.
    pub captured: usize,
    /// Tokens swallowed by wildcard gaps or left over around the match.
    pub gap: usize,
}

impl Coverage {
    pub fn total(&self) -> usize {
        self.literal + self.captured + self.gap
    }
}

/// Turns the coverage of a complete alignment into a confidence.
///
/// For a fixed `literal` count a scorer must never prefer a larger `gap`:
/// the recognizer only keeps the smallest gap per literal count.
pub trait Scorer: Send + Sync {
    fn score(&self, coverage: &Coverage) -> Confidence;
}

/// Literal-token coverage ratio: `literal / (literal + gap)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageScorer;

impl Scorer for CoverageScorer {
    fn score(&self, coverage: &Coverage) -> Confidence {
        if coverage.literal == 0 {
            return Confidence::ZERO;
        }
        Confidence::new(coverage.literal as f64 / (coverage.literal + coverage.gap) as f64)
    }
}

impl<F> Scorer for F
where
    F: Fn(&Coverage) -> Confidence + Send + Sync,
{
    fn score(&self, coverage: &Coverage) -> Confidence {
        self(coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Confidence::new(1.5), Confidence::CERTAIN);
        assert_eq!(Confidence::new(-0.2), Confidence::ZERO);
        assert_eq!(Confidence::new(f64::NAN), Confidence::ZERO);
    }

    #[test]
    fn captured_tokens_do_not_dilute_the_score() {
        let coverage = Coverage {
            literal: 2,
            captured: 3,
            gap: 0,
        };
        assert_eq!(CoverageScorer.score(&coverage), Confidence::CERTAIN);
    }

    #[test]
    fn gap_tokens_are_penalized() {
        let coverage = Coverage {
            literal: 3,
            captured: 0,
            gap: 1,
        };
        assert_eq!(CoverageScorer.score(&coverage).value(), 0.75);
    }

    #[test]
    fn no_literal_tokens_scores_zero() {
        let coverage = Coverage {
            literal: 0,
            captured: 4,
            gap: 0,
        };
        assert!(CoverageScorer.score(&coverage).is_zero());
    }
}

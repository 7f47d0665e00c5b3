//! # Parlance Grammar: utterance patterns and their recognizer
//!
//! Skills describe the phrasings they answer to as declarative patterns.
//! This crate compiles those patterns into small matcher programs, groups
//! them per skill into sections, and scores utterances against them.
//!
//! ## Core Ideas
//!
//! - **Patterns are data**: a build-time generator emits
//!   [`SectionDefinition`]s; nothing in this crate parses grammar files.
//! - **One tokenization per utterance**: utterances and literal words share
//!   the same normalizing tokenizer, so matching is plain token equality.
//! - **Scores are comparable across skills**: every section is scored on the
//!   same scale (see [`score`]), so a dispatcher can pick one winner among
//!   unrelated skills.
//! - **Deterministic ties**: equal scores resolve by declaration order.
//!
//! ## Architecture
//!
//! ```text
//! SectionDefinition ─ compile ─▶ Section ─┐
//!                                         ├─ Recognizer ─▶ MatchResult
//! text ─ tokenize ─▶ Utterance ───────────┘   (score, pattern, slots)
//! ```
//!
//! ## Example
//!
//! ```
//! use parlance_grammar::{ElementDefinition as E, PatternDefinition, SectionDefinition};
//! use parlance_grammar::{Recognizer, SectionRegistry, Utterance};
//!
//! let sections = SectionRegistry::load([SectionDefinition::new(
//!     "music",
//!     vec![PatternDefinition::new(vec![
//!         E::literal(["play"]),
//!         E::capture("song_name"),
//!         E::literal(["by"]),
//!         E::capture("artist"),
//!     ])],
//! )])
//! .unwrap();
//!
//! let section = sections.get("music").unwrap();
//! let result = Recognizer::new().recognize(section, &Utterance::new("play bohemian rhapsody by queen"));
//!
//! assert_eq!(result.score.value(), 1.0);
//! assert_eq!(result.slots.text("song_name"), Some("bohemian rhapsody"));
//! assert_eq!(result.slots.text("artist"), Some("queen"));
//! ```

pub mod definition;
pub mod error;
pub mod matching;
pub mod pattern;
pub mod recognizer;
pub mod score;
pub mod section;
pub mod token;
pub mod utterance;

pub use definition::{ElementDefinition, PatternDefinition, SectionDefinition};
pub use error::GrammarError;
pub use matching::{MatchResult, SlotValue, Slots};
pub use pattern::{Pattern, compile};
pub use recognizer::Recognizer;
pub use score::{Confidence, Coverage, CoverageScorer, Scorer};
pub use section::{Section, SectionRegistry};
pub use token::{Token, TokenKind};
pub use utterance::Utterance;

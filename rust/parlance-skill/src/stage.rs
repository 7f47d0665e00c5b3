//! The three stages of a skill chain.
//!
//! ```text
//! Utterance ─ Recognize ─▶ MatchResult ─ Process ─▶ Data ─ Output ─▶ RenderedResult
//!              (sync)                     (async)          (sync)
//! ```
//!
//! Recognition is cheap and runs for every skill on every utterance, so it is
//! synchronous. Processing may call out to the network or a device API and is
//! the only stage that suspends. Output turns the processed data into a
//! [`RenderedResult`] and never blocks.

use std::sync::Arc;

use async_trait::async_trait;
use parlance_grammar::{CoverageScorer, MatchResult, Recognizer, Scorer, Section, Slots, Utterance};

use crate::error::ChainError;
use crate::result::RenderedResult;

/// Scores an utterance for one skill.
pub trait Recognize: Send + Sync {
    fn recognize(&self, utterance: &Utterance) -> MatchResult;
}

/// Does the skill's actual work with the captured slots.
#[async_trait]
pub trait Process: Send + Sync {
    type Data: Send;

    async fn process(&self, utterance: &Utterance, slots: &Slots)
    -> Result<Self::Data, ChainError>;
}

/// Renders processed data for the host.
pub trait Output: Send + Sync {
    type Data;

    fn output(&self, data: Self::Data) -> Result<RenderedResult, ChainError>;
}

/// The usual recognizer: score the utterance against the skill's section.
#[derive(Debug, Clone)]
pub struct StandardRecognizer<S = CoverageScorer> {
    section: Arc<Section>,
    recognizer: Recognizer<S>,
}

impl StandardRecognizer<CoverageScorer> {
    pub fn new(section: Arc<Section>) -> Self {
        Self::with_recognizer(section, Recognizer::new())
    }
}

impl<S: Scorer> StandardRecognizer<S> {
    pub fn with_recognizer(section: Arc<Section>, recognizer: Recognizer<S>) -> Self {
        StandardRecognizer {
            section,
            recognizer,
        }
    }

    pub fn section(&self) -> &Section {
        &self.section
    }
}

impl<S: Scorer> Recognize for StandardRecognizer<S> {
    fn recognize(&self, utterance: &Utterance) -> MatchResult {
        self.recognizer.recognize(&self.section, utterance)
    }
}

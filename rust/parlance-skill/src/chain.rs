//! Skill chains: one recognize, process and output stage bound together.
//!
//! A chain moves through its states as a typestate, so a stage can only run
//! after the one before it succeeded:
//!
//! ```text
//! SkillChain ─ recognize ─▶ Recognized ─ process ─▶ Processed ─ output ─▶ RenderedResult
//!      │                        │                       │
//!      └── below threshold      └── ChainError          └── ChainError
//!          (None)
//! ```
//!
//! The dispatcher holds chains behind the object-safe [`Skill`] trait, which
//! splits the same flow into a scoring call and a response call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parlance_grammar::{MatchResult, Slots, Utterance};
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_PROCESSING_TIMEOUT;
use crate::error::ChainError;
use crate::result::RenderedResult;
use crate::stage::{Output, Process, Recognize};

/// Limits applied to a processing stage.
#[derive(Debug, Clone)]
pub struct ProcessControl {
    pub timeout: Duration,
    pub cancellation: CancellationToken,
}

impl Default for ProcessControl {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSING_TIMEOUT)
    }
}

impl ProcessControl {
    pub fn new(timeout: Duration) -> Self {
        ProcessControl {
            timeout,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// A recognize stage, a process stage and an output stage whose data types
/// line up.
pub struct SkillChain<R, P, O> {
    recognizer: R,
    processor: P,
    output: O,
}

impl<R, P, O> SkillChain<R, P, O>
where
    R: Recognize,
    P: Process,
    O: Output<Data = P::Data>,
{
    pub fn new(recognizer: R, processor: P, output: O) -> Self {
        SkillChain {
            recognizer,
            processor,
            output,
        }
    }

    /// Run the recognize stage. Returns `None` unless the score is strictly
    /// above `threshold`.
    pub fn recognize<'a>(
        &'a self,
        utterance: &'a Utterance,
        threshold: f64,
    ) -> Option<Recognized<'a, R, P, O>> {
        let matched = self.recognizer.recognize(utterance);
        matched.exceeds(threshold).then_some(Recognized {
            chain: self,
            utterance,
            matched,
        })
    }

    pub fn into_shared(self) -> Arc<dyn Skill>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

/// A chain whose recognize stage accepted the utterance.
pub struct Recognized<'a, R, P, O> {
    chain: &'a SkillChain<R, P, O>,
    utterance: &'a Utterance,
    matched: MatchResult,
}

impl<'a, R, P, O> Recognized<'a, R, P, O>
where
    R: Recognize,
    P: Process,
    O: Output<Data = P::Data>,
{
    pub fn matched(&self) -> &MatchResult {
        &self.matched
    }

    pub fn slots(&self) -> &Slots {
        &self.matched.slots
    }

    /// Run the process stage, bounded by the control's timeout and
    /// cancellation token.
    pub async fn process(self, control: &ProcessControl) -> Result<Processed<'a, O>, ChainError> {
        let chain = self.chain;
        let work = chain.processor.process(self.utterance, &self.matched.slots);

        let data = tokio::select! {
            biased;
            _ = control.cancellation.cancelled() => Err(ChainError::Cancelled),
            outcome = tokio::time::timeout(control.timeout, work) => match outcome {
                Ok(result) => result,
                Err(_) => Err(ChainError::ProcessingTimedOut(control.timeout)),
            },
        }?;

        Ok(Processed {
            output: &chain.output,
            data,
        })
    }
}

/// A chain whose process stage produced data.
pub struct Processed<'a, O: Output> {
    output: &'a O,
    data: O::Data,
}

impl<O: Output> Processed<'_, O> {
    pub fn data(&self) -> &O::Data {
        &self.data
    }

    /// Run the output stage.
    pub fn output(self) -> Result<RenderedResult, ChainError> {
        self.output.output(self.data)
    }
}

/// A match the dispatcher accepted for one skill.
///
/// Only the dispatcher creates selections, so [`Skill::respond`] cannot be
/// reached without going through scoring and the acceptance threshold (or the
/// fallback path, which carries an empty match).
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    matched: MatchResult,
}

impl Selection {
    pub(crate) fn new(matched: MatchResult) -> Self {
        Selection { matched }
    }

    pub fn matched(&self) -> &MatchResult {
        &self.matched
    }

    pub fn into_matched(self) -> MatchResult {
        self.matched
    }
}

/// A skill as the dispatcher sees it.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Score an utterance without running anything else.
    fn score(&self, utterance: &Utterance) -> MatchResult;

    /// Process and render an utterance this skill was selected for.
    async fn respond(
        &self,
        utterance: &Utterance,
        selection: Selection,
        control: &ProcessControl,
    ) -> Result<RenderedResult, ChainError>;
}

#[async_trait]
impl<R, P, O> Skill for SkillChain<R, P, O>
where
    R: Recognize,
    P: Process,
    O: Output<Data = P::Data>,
{
    fn score(&self, utterance: &Utterance) -> MatchResult {
        self.recognizer.recognize(utterance)
    }

    async fn respond(
        &self,
        utterance: &Utterance,
        selection: Selection,
        control: &ProcessControl,
    ) -> Result<RenderedResult, ChainError> {
        let recognized = Recognized {
            chain: self,
            utterance,
            matched: selection.into_matched(),
        };
        let processed = recognized.process(control).await?;
        processed.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_grammar::{ElementDefinition as E, PatternDefinition, Section, SectionDefinition};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    use crate::stage::StandardRecognizer;

    struct Echo {
        delay: Duration,
    }

    #[async_trait]
    impl Process for Echo {
        type Data = String;

        async fn process(&self, _: &Utterance, slots: &Slots) -> Result<String, ChainError> {
            tokio::time::sleep(self.delay).await;
            slots
                .text("message")
                .map(str::to_owned)
                .ok_or_else(|| ChainError::processing("nothing to echo"))
        }
    }

    struct Plain;

    impl Output for Plain {
        type Data = String;

        fn output(&self, data: String) -> Result<RenderedResult, ChainError> {
            if data.is_empty() {
                return Err(ChainError::rendering("empty message"));
            }
            Ok(RenderedResult::new("Echo", data))
        }
    }

    fn echo_chain(delay: Duration) -> SkillChain<StandardRecognizer, Echo, Plain> {
        let section = Section::compile(&SectionDefinition::new(
            "echo",
            vec![PatternDefinition::new(vec![
                E::literal(["say"]),
                E::capture("message"),
            ])],
        ));
        SkillChain::new(
            StandardRecognizer::new(Arc::new(section)),
            Echo { delay },
            Plain,
        )
    }

    #[tokio::test]
    async fn it_runs_all_three_stages() -> TestResult {
        let chain = echo_chain(Duration::ZERO);
        let utterance = Utterance::new("say hello world");

        let recognized = chain.recognize(&utterance, 0.3).ok_or("not recognized")?;
        assert_eq!(recognized.slots().text("message"), Some("hello world"));

        let processed = recognized.process(&ProcessControl::default()).await?;
        assert_eq!(processed.data(), "hello world");

        assert_eq!(processed.output()?, RenderedResult::new("Echo", "hello world"));
        Ok(())
    }

    #[test]
    fn it_stops_below_the_threshold() {
        let chain = echo_chain(Duration::ZERO);
        let utterance = Utterance::new("play some music");
        assert!(chain.recognize(&utterance, 0.3).is_none());

        let utterance = Utterance::new("say hi");
        assert!(chain.recognize(&utterance, 1.0).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn it_times_out_slow_processing() -> TestResult {
        let chain = echo_chain(Duration::from_secs(5));
        let utterance = Utterance::new("say hello");
        let recognized = chain.recognize(&utterance, 0.3).ok_or("not recognized")?;

        let result = recognized
            .process(&ProcessControl::new(Duration::from_secs(2)))
            .await;
        assert!(matches!(
            result,
            Err(ChainError::ProcessingTimedOut(timeout)) if timeout == Duration::from_secs(2)
        ));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn it_observes_cancellation() -> TestResult {
        let chain = echo_chain(Duration::from_secs(5));
        let utterance = Utterance::new("say hello");
        let recognized = chain.recognize(&utterance, 0.3).ok_or("not recognized")?;

        let control = ProcessControl::default();
        control.cancellation.cancel();

        assert!(matches!(
            recognized.process(&control).await,
            Err(ChainError::Cancelled)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn skill_respond_surfaces_processing_failures() {
        let chain = echo_chain(Duration::ZERO).into_shared();
        let utterance = Utterance::new("say nothing");
        let mut matched = chain.score(&utterance);
        matched.slots = Slots::new();

        let result = chain
            .respond(&utterance, Selection::new(matched), &ProcessControl::default())
            .await;
        assert_eq!(
            result,
            Err(ChainError::ProcessingFailed("nothing to echo".into()))
        );
    }
}

//! Utterance dispatch: pick one skill and run it.
//!
//! ```text
//! text ─▶ Utterance ─▶ score every skill ─▶ best score > threshold? ─┬─ no ─▶ NoMatch
//!                                                                   │
//!                                                                   └─ yes ─▶ respond ─┬─▶ Rendered
//!                                                                                      └─▶ Failed
//! ```
//!
//! Exactly one skill runs per dispatch. Ties go to the skill registered
//! first. Failures of the selected skill are logged and reported as "no
//! usable result"; the dispatcher does not retry with the runner-up.

use std::sync::Arc;

use parlance_grammar::{MatchResult, Recognizer, Scorer, SectionRegistry, Utterance};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::chain::{ProcessControl, Selection, Skill};
use crate::config::DispatchConfig;
use crate::context::SkillContext;
use crate::error::{ChainError, SkillError};
use crate::registry::SkillRegistry;
use crate::result::RenderedResult;

/// Score an utterance against every section and return the identifier and
/// result of the best one strictly above `threshold`.
///
/// Sections are scored in registry order and ties keep the earlier section.
pub fn select<S: Scorer>(
    utterance: &Utterance,
    sections: &SectionRegistry,
    recognizer: &Recognizer<S>,
    threshold: f64,
) -> Option<(String, MatchResult)> {
    best_of(
        sections
            .iter()
            .map(|section| (section.skill_id(), recognizer.recognize(section, utterance))),
        threshold,
    )
    .map(|(skill_id, result)| (skill_id.to_owned(), result))
}

fn best_of<K>(
    candidates: impl Iterator<Item = (K, MatchResult)>,
    threshold: f64,
) -> Option<(K, MatchResult)> {
    let mut best: Option<(K, MatchResult)> = None;
    for (key, result) in candidates {
        if !result.exceeds(threshold) {
            continue;
        }
        if best
            .as_ref()
            .is_none_or(|(_, current)| result.score > current.score)
        {
            best = Some((key, result));
        }
    }
    best
}

/// What happened to one utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Rendered {
        skill_id: String,
        result: RenderedResult,
    },
    NoMatch,
    Failed {
        skill_id: String,
        error: ChainError,
    },
}

impl DispatchOutcome {
    pub fn skill_id(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Rendered { skill_id, .. } | DispatchOutcome::Failed { skill_id, .. } => {
                Some(skill_id)
            }
            DispatchOutcome::NoMatch => None,
        }
    }

    pub fn into_result(self) -> Option<RenderedResult> {
        match self {
            DispatchOutcome::Rendered { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Routes utterances to skills.
///
/// A dispatcher is immutable once built and may be shared across tasks;
/// concurrent dispatches do not interfere with each other.
pub struct Dispatcher {
    skills: Vec<(String, Arc<dyn Skill>)>,
    fallback: Option<Arc<dyn Skill>>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Dispatcher {
            skills: Vec::new(),
            fallback: None,
            config,
        }
    }

    /// Build every enabled skill (and the fallback) from a registry.
    pub fn from_registry(
        registry: &SkillRegistry,
        context: &SkillContext,
        config: DispatchConfig,
    ) -> Result<Self, SkillError> {
        let skills = registry.build_enabled(context)?;
        let fallback = registry.build_fallback(context)?;
        tracing::info!(
            skills = skills.len(),
            fallback = fallback.is_some(),
            "dispatcher ready"
        );
        Ok(Dispatcher {
            skills,
            fallback,
            config,
        })
    }

    pub fn with_skill(mut self, skill_id: impl Into<String>, skill: Arc<dyn Skill>) -> Self {
        self.skills.push((skill_id.into(), skill));
        self
    }

    pub fn with_fallback(mut self, skill: Arc<dyn Skill>) -> Self {
        self.fallback = Some(skill);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|(skill_id, _)| skill_id.as_str())
    }

    /// The skill that would handle `utterance`, with its match.
    pub fn select(&self, utterance: &Utterance) -> Option<(&str, MatchResult)> {
        self.select_skill(utterance)
            .map(|(position, result)| (self.skills[position].0.as_str(), result))
    }

    fn select_skill(&self, utterance: &Utterance) -> Option<(usize, MatchResult)> {
        if utterance.is_empty() {
            return None;
        }
        best_of(
            self.skills
                .iter()
                .enumerate()
                .map(|(position, (skill_id, skill))| {
                    let result = skill.score(utterance);
                    tracing::debug!(skill = %skill_id, score = %result.score, "scored");
                    (position, result)
                }),
            self.config.acceptance_threshold,
        )
    }

    /// Dispatch an utterance. `None` means no skill matched or the selected
    /// skill failed.
    pub async fn dispatch(&self, text: &str) -> Option<RenderedResult> {
        self.dispatch_with(text, &CancellationToken::new()).await
    }

    /// Like [`Dispatcher::dispatch`], abandoning processing when
    /// `cancellation` fires.
    pub async fn dispatch_with(
        &self,
        text: &str,
        cancellation: &CancellationToken,
    ) -> Option<RenderedResult> {
        self.dispatch_outcome(text, cancellation).await.into_result()
    }

    /// Dispatch an utterance and report exactly what happened.
    pub async fn dispatch_outcome(
        &self,
        text: &str,
        cancellation: &CancellationToken,
    ) -> DispatchOutcome {
        let utterance = Utterance::new(text);
        let span = tracing::debug_span!("dispatch", utterance = text);
        self.run(&utterance, cancellation).instrument(span).await
    }

    /// Dispatch an utterance; if nothing usable comes back, let the fallback
    /// skill answer instead.
    pub async fn dispatch_or_fallback(&self, text: &str) -> Option<RenderedResult> {
        let utterance = Utterance::new(text);
        let cancellation = CancellationToken::new();
        let span = tracing::debug_span!("dispatch", utterance = text);

        async {
            if let DispatchOutcome::Rendered { result, .. } = self.run(&utterance, &cancellation).await {
                return Some(result);
            }
            let fallback = self.fallback.as_ref()?;
            match fallback
                .respond(
                    &utterance,
                    Selection::new(MatchResult::none()),
                    &self.control(&cancellation),
                )
                .await
            {
                Ok(result) => Some(result),
                Err(error) => {
                    tracing::warn!(%error, "fallback skill failed");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, utterance: &Utterance, cancellation: &CancellationToken) -> DispatchOutcome {
        let Some((position, matched)) = self.select_skill(utterance) else {
            tracing::debug!("no skill matched");
            return DispatchOutcome::NoMatch;
        };
        let (skill_id, skill) = &self.skills[position];
        tracing::debug!(skill = %skill_id, %matched, "selected skill");

        match skill
            .respond(utterance, Selection::new(matched), &self.control(cancellation))
            .await
        {
            Ok(result) => DispatchOutcome::Rendered {
                skill_id: skill_id.clone(),
                result,
            },
            Err(error) => {
                tracing::warn!(skill = %skill_id, %error, "skill chain failed");
                DispatchOutcome::Failed {
                    skill_id: skill_id.clone(),
                    error,
                }
            }
        }
    }

    fn control(&self, cancellation: &CancellationToken) -> ProcessControl {
        ProcessControl::new(self.config.processing_timeout).with_cancellation(cancellation.clone())
    }
}

//! Error types for skill registration and skill chains.

use std::fmt::Display;
use std::time::Duration;

use parlance_grammar::GrammarError;
use thiserror::Error;

/// Startup errors: registering, resolving and building skills.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("skill '{0}' is already registered")]
    DuplicateSkillId(String),

    #[error("no skill is registered as '{0}'")]
    UnknownSkillId(String),

    #[error("failed to build skill '{skill_id}': {reason}")]
    Build { skill_id: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Why a skill chain ended in the failed state.
///
/// These are per-dispatch errors. The dispatcher logs them and reports "no
/// usable result"; they are never fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    #[error("processing timed out after {0:?}")]
    ProcessingTimedOut(Duration),

    #[error("processing was cancelled")]
    Cancelled,

    #[error("rendering failed: {0}")]
    RenderingFailed(String),
}

impl ChainError {
    pub fn processing(reason: impl Display) -> Self {
        ChainError::ProcessingFailed(reason.to_string())
    }

    pub fn rendering(reason: impl Display) -> Self {
        ChainError::RenderingFailed(reason.to_string())
    }
}

//! Error types for pattern compilation and section loading.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("invalid pattern specification: {reason}")]
    InvalidPatternSpec { reason: String },

    #[error("section for skill '{0}' is already registered")]
    DuplicateSection(String),

    #[error("no section is registered for skill '{0}'")]
    UnknownSection(String),

    #[error("malformed section definition: {0}")]
    Definition(#[from] serde_json::Error),
}

impl GrammarError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        GrammarError::InvalidPatternSpec {
            reason: reason.into(),
        }
    }
}

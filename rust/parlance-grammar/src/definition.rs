//! Declarative pattern definitions, as emitted by the sentence generator.
//!
//! The generator that reads the line-oriented grammar files runs at build
//! time and emits these structures (usually as JSON). They are plain data:
//! nothing here is validated until [`crate::pattern::compile`] turns a
//! definition into an executable [`crate::pattern::Pattern`].
//!
//! ```json
//! {
//!   "skill_id": "lyrics",
//!   "patterns": [
//!     { "elements": [
//!       { "kind": "literal", "words": ["play", "put on"] },
//!       { "kind": "capture", "name": "song_name" },
//!       { "kind": "optional", "elements": [
//!         { "kind": "literal", "words": ["by"] },
//!         { "kind": "capture", "name": "artist" }
//!       ] }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GrammarError;

pub const LITERAL: &str = "literal";
pub const OPTIONAL: &str = "optional";
pub const CAPTURE: &str = "capture";
pub const WILDCARD: &str = "wildcard";

/// One element of a pattern definition.
///
/// `kind` selects which of the other fields are meaningful:
///
/// - `literal`: `words` lists equivalent words or phrases
/// - `optional`: `elements` is the sub-pattern that may be skipped
/// - `capture`: `name` is the slot the matched tokens are bound to
/// - `wildcard`: no fields; swallows any run of tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementDefinition>,
}

impl ElementDefinition {
    fn of_kind(kind: &str) -> Self {
        ElementDefinition {
            kind: kind.to_string(),
            words: Vec::new(),
            name: None,
            elements: Vec::new(),
        }
    }

    pub fn literal<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ElementDefinition {
            words: words.into_iter().map(Into::into).collect(),
            ..Self::of_kind(LITERAL)
        }
    }

    pub fn optional(elements: Vec<ElementDefinition>) -> Self {
        ElementDefinition {
            elements,
            ..Self::of_kind(OPTIONAL)
        }
    }

    pub fn capture(name: impl Into<String>) -> Self {
        ElementDefinition {
            name: Some(name.into()),
            ..Self::of_kind(CAPTURE)
        }
    }

    pub fn wildcard() -> Self {
        Self::of_kind(WILDCARD)
    }
}

/// One alternative phrasing of an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub elements: Vec<ElementDefinition>,
}

impl PatternDefinition {
    pub fn new(elements: Vec<ElementDefinition>) -> Self {
        PatternDefinition { elements }
    }
}

impl From<Vec<ElementDefinition>> for PatternDefinition {
    fn from(elements: Vec<ElementDefinition>) -> Self {
        PatternDefinition::new(elements)
    }
}

/// All phrasings for one skill, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub skill_id: String,
    pub patterns: Vec<PatternDefinition>,
}

impl SectionDefinition {
    pub fn new(skill_id: impl Into<String>, patterns: Vec<PatternDefinition>) -> Self {
        SectionDefinition {
            skill_id: skill_id.into(),
            patterns,
        }
    }

    /// Decode a list of section definitions from generator output.
    pub fn list_from_json(json: &str) -> Result<Vec<SectionDefinition>, GrammarError> {
        Ok(serde_json::from_str(json)?)
    }
}

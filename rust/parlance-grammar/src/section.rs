//! Sections and the section registry.
//!
//! A section is the compiled set of alternative phrasings for one skill.
//! Sections are compiled once at startup from [`SectionDefinition`]s and
//! never change afterwards; the registry hands them out as `Arc<Section>` so
//! recognizers and dispatch can hold on to them without copying.
//!
//! A pattern that fails to compile is logged and skipped. Its siblings in the
//! same section still load, so one bad phrasing does not take a whole skill
//! offline.

use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::SectionDefinition;
use crate::error::GrammarError;
use crate::pattern::{Pattern, compile};

/// The compiled patterns of one skill, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    skill_id: String,
    patterns: Vec<Pattern>,
}

impl Section {
    pub fn new(skill_id: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Section {
            skill_id: skill_id.into(),
            patterns,
        }
    }

    /// Compile a section definition, skipping patterns that fail to compile.
    pub fn compile(definition: &SectionDefinition) -> Self {
        let mut patterns = Vec::with_capacity(definition.patterns.len());
        for (index, pattern) in definition.patterns.iter().enumerate() {
            match compile(pattern) {
                Ok(pattern) => patterns.push(pattern),
                Err(error) => tracing::warn!(
                    skill = %definition.skill_id,
                    pattern = index,
                    %error,
                    "skipping pattern"
                ),
            }
        }

        if patterns.is_empty() {
            tracing::warn!(skill = %definition.skill_id, "section has no usable patterns");
        }

        Section::new(definition.skill_id.clone(), patterns)
    }

    pub fn skill_id(&self) -> &str {
        &self.skill_id
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Skill identifier to compiled section, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: Vec<Arc<Section>>,
    index: HashMap<String, usize>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register every definition.
    ///
    /// A repeated skill identifier is a startup error.
    pub fn load<I>(definitions: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = SectionDefinition>,
    {
        let mut registry = SectionRegistry::new();
        for definition in definitions {
            registry.insert(Section::compile(&definition))?;
        }
        tracing::debug!(sections = registry.len(), "section registry loaded");
        Ok(registry)
    }

    /// Load sections from the generator's JSON output.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        SectionRegistry::load(SectionDefinition::list_from_json(json)?)
    }

    pub fn insert(&mut self, section: Section) -> Result<(), GrammarError> {
        if self.index.contains_key(section.skill_id()) {
            return Err(GrammarError::DuplicateSection(section.skill_id().to_string()));
        }
        self.index
            .insert(section.skill_id().to_string(), self.sections.len());
        self.sections.push(Arc::new(section));
        Ok(())
    }

    pub fn get(&self, skill_id: &str) -> Option<&Arc<Section>> {
        self.index.get(skill_id).map(|&i| &self.sections[i])
    }

    /// Like [`SectionRegistry::get`], but an absent section is an error.
    pub fn resolve(&self, skill_id: &str) -> Result<Arc<Section>, GrammarError> {
        self.get(skill_id)
            .cloned()
            .ok_or_else(|| GrammarError::UnknownSection(skill_id.to_string()))
    }

    /// Sections in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Section>> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

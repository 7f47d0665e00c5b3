//! Runtime configuration handed to skill factories.
//!
//! The host builds one [`SkillContext`] at startup. It carries the user's
//! locale and preferences and the compiled section registry, so a factory can
//! look up its own section instead of reaching for global state.

use std::collections::HashMap;
use std::sync::Arc;

use parlance_grammar::{Section, SectionRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SkillError;

const ENABLED_KEY_PREFIX: &str = "skills_handler_is_enabled_";

/// The preference key that enables or disables a skill.
pub fn enabled_preference_key(skill_id: &str) -> String {
    format!("{ENABLED_KEY_PREFIX}{skill_id}")
}

/// User preferences, as a flat map of JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(HashMap<String, Value>);

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SkillError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A boolean preference, or `default` if absent or not a boolean.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Everything a skill factory may read when building a skill.
#[derive(Debug, Clone)]
pub struct SkillContext {
    pub locale: String,
    pub preferences: Preferences,
    sections: Arc<SectionRegistry>,
}

impl SkillContext {
    pub fn new(sections: Arc<SectionRegistry>) -> Self {
        SkillContext {
            locale: "en".into(),
            preferences: Preferences::new(),
            sections,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    /// The compiled section for a skill.
    pub fn section(&self, skill_id: &str) -> Result<Arc<Section>, SkillError> {
        Ok(self.sections.resolve(skill_id)?)
    }
}

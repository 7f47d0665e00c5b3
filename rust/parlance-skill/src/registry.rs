//! The skill registry: every skill the host knows about, by identifier.
//!
//! Registration is static. The host registers a [`SkillInfo`] per skill at
//! startup; the registry then answers which skills are available and enabled
//! for a given [`SkillContext`] and builds them. Availability is a property of
//! the environment (a missing permission, an unsupported device); enablement
//! additionally honors the user's preference for the skill.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::Skill;
use crate::context::{SkillContext, enabled_preference_key};
use crate::error::SkillError;

type Factory = Arc<dyn Fn(&SkillContext) -> Result<Arc<dyn Skill>, SkillError> + Send + Sync>;
type Availability = Arc<dyn Fn(&SkillContext) -> bool + Send + Sync>;

/// A user-facing setting a skill exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    pub key: String,
    pub title: String,
    pub default: Value,
}

impl SettingDescriptor {
    pub fn new(key: impl Into<String>, title: impl Into<String>, default: impl Into<Value>) -> Self {
        SettingDescriptor {
            key: key.into(),
            title: title.into(),
            default: default.into(),
        }
    }
}

/// The settings screen of one skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSettings {
    pub entries: Vec<SettingDescriptor>,
}

impl SkillSettings {
    pub fn new(entries: Vec<SettingDescriptor>) -> Self {
        SkillSettings { entries }
    }
}

/// Static metadata for a skill and the factory that builds it.
#[derive(Clone)]
pub struct SkillInfo {
    id: String,
    name: String,
    enabled_by_default: bool,
    factory: Factory,
    availability: Option<Availability>,
    settings: Option<SkillSettings>,
}

impl fmt::Debug for SkillInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled_by_default", &self.enabled_by_default)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SkillInfo {
    pub fn new<F>(
        id: impl Into<String>,
        name: impl Into<String>,
        enabled_by_default: bool,
        factory: F,
    ) -> Self
    where
        F: Fn(&SkillContext) -> Result<Arc<dyn Skill>, SkillError> + Send + Sync + 'static,
    {
        SkillInfo {
            id: id.into(),
            name: name.into(),
            enabled_by_default,
            factory: Arc::new(factory),
            availability: None,
            settings: None,
        }
    }

    /// Gate the skill on the environment. Skills without a check are always
    /// available.
    pub fn with_availability<F>(mut self, check: F) -> Self
    where
        F: Fn(&SkillContext) -> bool + Send + Sync + 'static,
    {
        self.availability = Some(Arc::new(check));
        self
    }

    pub fn with_settings(mut self, settings: SkillSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    pub fn settings(&self) -> Option<&SkillSettings> {
        self.settings.as_ref()
    }

    pub fn is_available(&self, context: &SkillContext) -> bool {
        self.availability
            .as_ref()
            .is_none_or(|check| check(context))
    }

    /// Available, and switched on by the user (or by default).
    pub fn is_enabled(&self, context: &SkillContext) -> bool {
        self.is_available(context)
            && context
                .preferences
                .bool(&enabled_preference_key(&self.id), self.enabled_by_default)
    }

    pub fn build(&self, context: &SkillContext) -> Result<Arc<dyn Skill>, SkillError> {
        (self.factory)(context)
    }
}

/// All registered skills, in registration order, plus an optional fallback.
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: Vec<SkillInfo>,
    index: HashMap<String, usize>,
    fallback: Option<SkillInfo>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill. Identifiers are unique; a duplicate leaves the
    /// registry unchanged.
    pub fn register(&mut self, info: SkillInfo) -> Result<(), SkillError> {
        if self.index.contains_key(info.id()) {
            return Err(SkillError::DuplicateSkillId(info.id));
        }
        tracing::debug!(skill = info.id(), "registered skill");
        self.index.insert(info.id.clone(), self.skills.len());
        self.skills.push(info);
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Result<&SkillInfo, SkillError> {
        self.index
            .get(id)
            .map(|&position| &self.skills[position])
            .ok_or_else(|| SkillError::UnknownSkillId(id.to_owned()))
    }

    /// The skill that answers when nothing else matched. It never competes
    /// in selection.
    pub fn set_fallback(&mut self, info: SkillInfo) {
        self.fallback = Some(info);
    }

    pub fn fallback(&self) -> Option<&SkillInfo> {
        self.fallback.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillInfo> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn available<'a>(
        &'a self,
        context: &'a SkillContext,
    ) -> impl Iterator<Item = &'a SkillInfo> + 'a {
        self.skills.iter().filter(|info| info.is_available(context))
    }

    pub fn enabled<'a>(
        &'a self,
        context: &'a SkillContext,
    ) -> impl Iterator<Item = &'a SkillInfo> + 'a {
        self.skills.iter().filter(|info| info.is_enabled(context))
    }

    pub fn build(&self, id: &str, context: &SkillContext) -> Result<Arc<dyn Skill>, SkillError> {
        self.resolve(id)?.build(context)
    }

    /// Build every enabled skill, in registration order.
    pub fn build_enabled(
        &self,
        context: &SkillContext,
    ) -> Result<Vec<(String, Arc<dyn Skill>)>, SkillError> {
        self.enabled(context)
            .map(|info| Ok((info.id.clone(), info.build(context)?)))
            .collect()
    }

    /// Build the fallback skill, if one is set and available.
    pub fn build_fallback(
        &self,
        context: &SkillContext,
    ) -> Result<Option<Arc<dyn Skill>>, SkillError> {
        match &self.fallback {
            Some(info) if info.is_available(context) => info.build(context).map(Some),
            _ => Ok(None),
        }
    }
}

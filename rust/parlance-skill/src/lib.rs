//! # Parlance Skill: skill chains and utterance dispatch
//!
//! A skill answers one kind of request: a timer, the weather, song lyrics.
//! Each skill is a [`SkillChain`] of three stages. A [`Dispatcher`] scores
//! every enabled skill against an utterance, runs the single best one, and
//! hands back a [`RenderedResult`].
//!
//! ## Architecture
//!
//! ```text
//! SkillRegistry ─ build_enabled(SkillContext) ─▶ Dispatcher
//!   SkillInfo { id, factory, availability }          │
//!                                                    ▼
//!                  text ─▶ score all ─▶ best > threshold ─▶ SkillChain
//!                                                          recognize ─▶ process ─▶ output
//! ```
//!
//! Sections come from `parlance-grammar`; the [`SkillContext`] carries them to
//! skill factories alongside the user's locale and preferences.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use parlance_grammar::{ElementDefinition as E, PatternDefinition, SectionDefinition};
//! use parlance_grammar::{SectionRegistry, Slots, Utterance};
//! use parlance_skill::{
//!     ChainError, DispatchConfig, Dispatcher, Output, Process, RenderedResult, SkillChain,
//!     SkillContext, SkillInfo, SkillRegistry, StandardRecognizer,
//! };
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl Process for Greet {
//!     type Data = String;
//!
//!     async fn process(&self, _: &Utterance, slots: &Slots) -> Result<String, ChainError> {
//!         Ok(format!("Hello, {}!", slots.text("name").unwrap_or("stranger")))
//!     }
//! }
//!
//! struct Card;
//!
//! impl Output for Card {
//!     type Data = String;
//!
//!     fn output(&self, greeting: String) -> Result<RenderedResult, ChainError> {
//!         Ok(RenderedResult::new("Greeting", greeting))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sections = Arc::new(SectionRegistry::load([SectionDefinition::new(
//!     "greet",
//!     vec![PatternDefinition::new(vec![
//!         E::literal(["say"]),
//!         E::literal(["hello"]),
//!         E::literal(["to"]),
//!         E::capture("name"),
//!     ])],
//! )])?);
//!
//! let mut registry = SkillRegistry::new();
//! registry.register(SkillInfo::new("greet", "Greeter", true, |context| {
//!     let recognizer = StandardRecognizer::new(context.section("greet")?);
//!     Ok(SkillChain::new(recognizer, Greet, Card).into_shared())
//! }))?;
//!
//! let context = SkillContext::new(sections);
//! let dispatcher = Dispatcher::from_registry(&registry, &context, DispatchConfig::default())?;
//!
//! let result = dispatcher.dispatch("Say hello to Ada").await;
//! assert_eq!(result.map(|r| r.body), Some("Hello, Ada!".to_string()));
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod result;
pub mod stage;

pub use chain::{ProcessControl, Processed, Recognized, Selection, Skill, SkillChain};
pub use config::{DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_PROCESSING_TIMEOUT, DispatchConfig};
pub use context::{Preferences, SkillContext, enabled_preference_key};
pub use dispatcher::{DispatchOutcome, Dispatcher, select};
pub use error::{ChainError, SkillError};
pub use registry::{SettingDescriptor, SkillInfo, SkillRegistry, SkillSettings};
pub use result::{RenderedItem, RenderedResult};
pub use stage::{Output, Process, Recognize, StandardRecognizer};

//! Rendered results: what a skill chain hands back to the host.
//!
//! A result is data, not presentation. The host decides whether to draw it
//! on screen, read it aloud, or both; nothing here is formatted for a
//! particular medium.

use serde::{Deserialize, Serialize};

/// The structured output of a skill's output stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedResult {
    pub title: String,
    pub body: String,
    /// What a speech front-end should say, when it differs from `body`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RenderedItem>,
}

/// A labelled sub-item, e.g. one verse of a song or one forecast day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedItem {
    pub label: String,
    pub value: String,
}

impl RenderedResult {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        RenderedResult {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_speech(mut self, speech: impl Into<String>) -> Self {
        self.speech = Some(speech.into());
        self
    }

    pub fn with_item(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.push(RenderedItem {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// The text to speak: `speech` if set, otherwise `body`.
    pub fn speech_text(&self) -> &str {
        self.speech.as_deref().unwrap_or(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn speech_defaults_to_body() {
        let result = RenderedResult::new("Time", "It is 10:42");
        assert_eq!(result.speech_text(), "It is 10:42");
        assert_eq!(result.with_speech("Ten forty-two").speech_text(), "Ten forty-two");
    }

    #[test]
    fn serializes_without_empty_fields() {
        let result = RenderedResult::new("Lyrics", "Is this the real life?")
            .with_item("artist", "Queen");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "title": "Lyrics",
                "body": "Is this the real life?",
                "items": [{ "label": "artist", "value": "Queen" }]
            })
        );
    }
}

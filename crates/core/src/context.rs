//! Conversation context handed to the AI collaborator

use serde::{Deserialize, Serialize};

use crate::language::LanguagePair;
use crate::llm_types::Message;

/// Practice topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Grouping such as "daily_life" or "travel"
    #[serde(default)]
    pub category: String,
    /// Opening question the tutor asks when the session starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter: Option<String>,
}

impl TopicInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            starter: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_starter(mut self, starter: impl Into<String>) -> Self {
        self.starter = Some(starter.into());
        self
    }
}

/// A topic resolved for a particular learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTopic {
    pub topic: TopicInfo,
    pub languages: LanguagePair,
}

/// Everything the AI collaborator needs for one turn
///
/// Rebuilt from scratch on every turn; nothing here is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPayload {
    pub session_id: String,
    pub topic: TopicInfo,
    pub languages: LanguagePair,
    /// Prior exchanges, oldest first
    pub history: Vec<Message>,
    /// 1-based index of the turn being processed
    pub turn_index: u32,
}

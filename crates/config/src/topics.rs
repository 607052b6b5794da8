//! Topic catalog
//!
//! Resolves a topic id and a user into the topic details plus the language
//! pair to practice. Target language precedence: the user's override, then the
//! topic's own language, then the configured default.

use std::collections::HashMap;

use lingo_core::{Error, LanguagePair, ResolvedTopic, Result, TopicInfo, TopicResolver};

use crate::settings::{LanguageSettings, Settings, TopicEntry};

/// Config-driven [`TopicResolver`]
#[derive(Debug, Clone)]
pub struct TopicCatalog {
    /// Catalog order is preserved for listing
    topics: Vec<TopicEntry>,
    index: HashMap<String, usize>,
    languages: LanguageSettings,
}

impl TopicCatalog {
    pub fn new(topics: Vec<TopicEntry>, languages: LanguageSettings) -> Self {
        let index = topics
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Self {
            topics,
            index,
            languages,
        }
    }

    /// Catalog from settings, using the built-in topics when none are configured
    pub fn from_settings(settings: &Settings) -> Self {
        let topics = if settings.topics.is_empty() {
            tracing::debug!("No topics configured, using built-in catalog");
            builtin_topics()
        } else {
            settings.topics.clone()
        };
        Self::new(topics, settings.languages.clone())
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    fn languages_for(&self, entry: &TopicEntry, user_id: &str) -> LanguagePair {
        let user = self.languages.user_overrides.get(user_id);
        let target = user
            .map(|o| o.target)
            .or(entry.target_language)
            .unwrap_or(self.languages.default_target);
        let native = user
            .and_then(|o| o.native)
            .unwrap_or(self.languages.default_native);
        LanguagePair::new(target, native)
    }
}

impl TopicResolver for TopicCatalog {
    fn resolve(&self, topic_id: &str, user_id: &str) -> Result<ResolvedTopic> {
        let entry = self
            .index
            .get(topic_id)
            .map(|&i| &self.topics[i])
            .ok_or_else(|| Error::TopicNotFound(topic_id.to_string()))?;

        Ok(ResolvedTopic {
            topic: topic_info(entry),
            languages: self.languages_for(entry, user_id),
        })
    }

    fn topics(&self) -> Vec<TopicInfo> {
        self.topics.iter().map(topic_info).collect()
    }
}

fn topic_info(entry: &TopicEntry) -> TopicInfo {
    let mut info = TopicInfo::new(&entry.id, &entry.name)
        .with_description(&entry.description)
        .with_category(&entry.category);
    if let Some(starter) = &entry.starter {
        info = info.with_starter(starter);
    }
    info
}

fn entry(id: &str, name: &str, category: &str, description: &str, starter: &str) -> TopicEntry {
    TopicEntry {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        starter: Some(starter.to_string()),
        target_language: None,
    }
}

/// Everyday conversation topics
pub fn builtin_topics() -> Vec<TopicEntry> {
    vec![
        entry(
            "daily_routine",
            "Daily Routine",
            "daily_life",
            "Talk about your typical day, from waking up to going to bed.",
            "What time do you usually wake up, and what do you do first?",
        ),
        entry(
            "food",
            "Food & Cooking",
            "daily_life",
            "Favorite dishes, recipes and eating out.",
            "What did you eat yesterday?",
        ),
        entry(
            "travel",
            "Travel",
            "leisure",
            "Past trips, dream destinations and travel plans.",
            "Tell me about the last place you visited.",
        ),
        entry(
            "work",
            "Work & Studies",
            "professional",
            "Your job or studies, colleagues and goals.",
            "What do you do for work or study?",
        ),
        entry(
            "hobbies",
            "Hobbies",
            "leisure",
            "What you like to do in your free time.",
            "What do you like to do on the weekend?",
        ),
        entry(
            "shopping",
            "Shopping",
            "daily_life",
            "Buying clothes, groceries and gifts.",
            "What was the last thing you bought?",
        ),
    ]
}

//! Topic and language resolution

use crate::{ResolvedTopic, Result, TopicInfo};

/// Resolves practice topics and the learner's language pair
pub trait TopicResolver: Send + Sync {
    /// Resolve a topic for a user
    ///
    /// Returns `Error::TopicNotFound` for unknown topic ids.
    fn resolve(&self, topic_id: &str, user_id: &str) -> Result<ResolvedTopic>;

    /// All known topics
    fn topics(&self) -> Vec<TopicInfo>;
}

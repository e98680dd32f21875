//! ID types for quests and authored content.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Stable identifier of a quest, unique across all loaded content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(String);

impl QuestId {
    /// Creates a quest ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the ID is empty (never valid in content).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for QuestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for QuestId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for QuestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QuestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quest_id_display() {
        let id = QuestId::new("main_01");
        assert_eq!(id.to_string(), "main_01");
        assert_eq!(id.as_str(), "main_01");
        assert!(!id.is_empty());
    }

    #[test]
    fn test_quest_id_serializes_as_plain_string() {
        let id = QuestId::from("side_07");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"side_07\"");

        let back: QuestId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_quest_id_ordering_is_lexical() {
        let mut ids = vec![QuestId::new("b"), QuestId::new("a"), QuestId::new("c")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a");
    }
}

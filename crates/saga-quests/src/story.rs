//! Story progression: chapters of main quests and recorded player decisions.
//!
//! The story layer owns only its chapter cursor and choice history. Quest
//! state stays in the [`QuestManager`], which is passed in by the caller
//! along with the player.

use crate::config::SagaConfig;
use crate::content::{check_version, parse_document, ContentError, ContentResult};
use crate::manager::QuestManager;
use crate::player::QuestPlayer;
use crate::save::StoryProgressRecord;
use saga_common::{QuestId, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors raised by story progression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// No decision point with this ID.
    #[error("Unknown decision point: {0}")]
    UnknownDecisionPoint(String),

    /// Decision point does not offer this choice.
    #[error("Decision point '{decision_point}' has no choice '{choice}'")]
    UnknownChoice {
        /// Decision point ID
        decision_point: String,
        /// Requested choice ID
        choice: String,
    },

    /// Chapter cursor is past the last chapter.
    #[error("No more chapters")]
    NoMoreChapters,
}

/// Result type for story operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// One story segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryChapter {
    /// Chapter ID
    pub id: String,
    /// Display title
    pub title: String,
    /// Display description
    #[serde(default)]
    pub description: String,
    /// Quests started with the chapter and required to finish it
    #[serde(default)]
    pub main_quests: Vec<QuestId>,
    /// Optional quests associated with the chapter
    #[serde(default)]
    pub side_quests: Vec<QuestId>,
    /// Decision points reached during the chapter
    #[serde(default)]
    pub decision_points: Vec<String>,
}

/// A single effect of a player decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consequence {
    /// Offer a quest
    UnlockQuest {
        /// Quest ID
        quest_id: QuestId,
    },
    /// Complete an active quest
    CompleteQuest {
        /// Quest ID
        quest_id: QuestId,
    },
    /// Fail an active quest
    FailQuest {
        /// Quest ID
        quest_id: QuestId,
        /// Failure reason
        reason: String,
    },
    /// Give the player items
    GrantItem {
        /// Item ID
        item_id: String,
        /// Quantity
        quantity: u32,
    },
    /// Set faction reputation to an absolute value
    SetReputation {
        /// Faction ID
        faction: String,
        /// Target reputation
        amount: i32,
    },
    /// Move to the next chapter
    AdvanceChapter,
}

/// An authored branching moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryDecisionPoint {
    /// Decision point ID
    pub id: String,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Choice ID to display text
    pub choices: BTreeMap<String, String>,
    /// Choice ID to the effects applied when it is picked
    pub consequences: BTreeMap<String, Vec<Consequence>>,
}

impl StoryDecisionPoint {
    /// Whether the decision point offers a choice.
    #[must_use]
    pub fn has_choice(&self, choice_id: &str) -> bool {
        self.choices.contains_key(choice_id) || self.consequences.contains_key(choice_id)
    }

    /// Effects of a choice. Empty for a choice with no effects.
    #[must_use]
    pub fn consequences_for(&self, choice_id: &str) -> &[Consequence] {
        self.consequences
            .get(choice_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn default_version() -> String {
    SchemaVersion::STORY_CONTENT.to_string()
}

const fn default_quantity() -> u32 {
    1
}

/// An authored consequence record, tagged by `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsequenceDefinition {
    /// Consequence tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Quest ID for quest consequences
    #[serde(default)]
    pub quest_id: Option<String>,
    /// Failure reason for `FAIL_QUEST`
    #[serde(default)]
    pub reason: Option<String>,
    /// Item ID for `GRANT_ITEM`
    #[serde(default)]
    pub item_id: Option<String>,
    /// Quantity for `GRANT_ITEM`
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Faction for `SET_REPUTATION`
    #[serde(default)]
    pub faction: Option<String>,
    /// Target value for `SET_REPUTATION`
    #[serde(default)]
    pub amount: i32,
}

impl ConsequenceDefinition {
    fn require<'a>(&self, value: Option<&'a String>, field: &str) -> ContentResult<&'a str> {
        value
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ContentError::Validation(format!("{} consequence is missing '{field}'", self.kind)))
    }

    /// Builds the typed consequence.
    pub fn build(&self) -> ContentResult<Consequence> {
        let consequence = match self.kind.as_str() {
            "UNLOCK_QUEST" => Consequence::UnlockQuest {
                quest_id: self.require(self.quest_id.as_ref(), "quest_id")?.into(),
            },
            "COMPLETE_QUEST" => Consequence::CompleteQuest {
                quest_id: self.require(self.quest_id.as_ref(), "quest_id")?.into(),
            },
            "FAIL_QUEST" => Consequence::FailQuest {
                quest_id: self.require(self.quest_id.as_ref(), "quest_id")?.into(),
                reason: self.reason.clone().unwrap_or_else(|| "story decision".to_string()),
            },
            "GRANT_ITEM" => Consequence::GrantItem {
                item_id: self.require(self.item_id.as_ref(), "item_id")?.to_string(),
                quantity: self.quantity.max(1),
            },
            "SET_REPUTATION" => Consequence::SetReputation {
                faction: self.require(self.faction.as_ref(), "faction")?.to_string(),
                amount: self.amount,
            },
            "ADVANCE_CHAPTER" => Consequence::AdvanceChapter,
            other => {
                return Err(ContentError::UnknownTag {
                    kind: "consequence",
                    tag: other.to_string(),
                })
            },
        };
        Ok(consequence)
    }
}

/// An authored decision point record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPointDefinition {
    /// Decision point ID
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Display description
    #[serde(default)]
    pub description: String,
    /// Choice ID to display text
    #[serde(default)]
    pub choices: BTreeMap<String, String>,
    /// Choice ID to consequence records
    #[serde(default)]
    pub consequences: BTreeMap<String, Vec<ConsequenceDefinition>>,
}

impl DecisionPointDefinition {
    /// Builds the decision point, dropping consequences that fail to build.
    #[must_use]
    pub fn build(&self) -> StoryDecisionPoint {
        let consequences = self
            .consequences
            .iter()
            .map(|(choice, definitions)| {
                let built = definitions
                    .iter()
                    .filter_map(|definition| match definition.build() {
                        Ok(consequence) => Some(consequence),
                        Err(e) => {
                            error!(
                                "Dropping consequence of choice '{}' at '{}': {}",
                                choice, self.id, e
                            );
                            None
                        },
                    })
                    .collect();
                (choice.clone(), built)
            })
            .collect();

        StoryDecisionPoint {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            choices: self.choices.clone(),
            consequences,
        }
    }
}

/// Story content file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryFile {
    /// File format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Chapters in play order
    #[serde(default)]
    pub chapters: Vec<StoryChapter>,
    /// Decision points
    #[serde(default)]
    pub decision_points: Vec<DecisionPointDefinition>,
}

/// Loaded chapters and decision points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryContent {
    /// Chapters in play order
    pub chapters: Vec<StoryChapter>,
    /// Decision points by ID
    pub decision_points: BTreeMap<String, StoryDecisionPoint>,
}

impl StoryContent {
    /// Builds content from a parsed file.
    ///
    /// Decision points with an empty or repeated ID are dropped.
    #[must_use]
    pub fn from_file(file: StoryFile) -> Self {
        let mut decision_points = BTreeMap::new();
        for definition in &file.decision_points {
            if definition.id.trim().is_empty() {
                error!("Dropping decision point with empty id");
                continue;
            }
            if decision_points.contains_key(&definition.id) {
                warn!("Duplicate decision point '{}', skipping", definition.id);
                continue;
            }
            decision_points.insert(definition.id.clone(), definition.build());
        }

        let chapters: Vec<StoryChapter> = file
            .chapters
            .into_iter()
            .filter(|chapter| {
                let keep = !chapter.id.trim().is_empty();
                if !keep {
                    error!("Dropping chapter with empty id");
                }
                keep
            })
            .collect();

        for chapter in &chapters {
            for decision in &chapter.decision_points {
                if !decision_points.contains_key(decision) {
                    warn!("Chapter '{}' names unknown decision point '{}'", chapter.id, decision);
                }
            }
        }

        Self {
            chapters,
            decision_points,
        }
    }

    /// Loads a story file.
    pub fn load(path: &Path) -> ContentResult<Self> {
        debug!("Loading story file: {:?}", path);
        if !path.exists() {
            return Err(ContentError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let file: StoryFile = parse_document(path, &text)?;
        check_version(&file.version, SchemaVersion::STORY_CONTENT)?;
        let content = Self::from_file(file);
        info!(
            "Loaded {} chapters and {} decision points",
            content.chapters.len(),
            content.decision_points.len()
        );
        Ok(content)
    }
}

/// Walks the chapters and applies the player's decisions.
#[derive(Debug, Clone, Default)]
pub struct StoryProgressionManager {
    content: StoryContent,
    current_chapter_index: usize,
    player_choices: BTreeMap<String, String>,
}

impl StoryProgressionManager {
    /// Creates a manager positioned at the first chapter.
    #[must_use]
    pub fn new(content: StoryContent) -> Self {
        Self {
            content,
            current_chapter_index: 0,
            player_choices: BTreeMap::new(),
        }
    }

    /// Loads the configured story file. A missing or broken file yields an
    /// empty story.
    #[must_use]
    pub fn from_config(config: &SagaConfig) -> Self {
        match StoryContent::load(&config.story_path()) {
            Ok(content) => Self::new(content),
            Err(e) => {
                warn!("Failed to load story content: {}", e);
                Self::default()
            },
        }
    }

    fn reject(err: StoryError) -> StoryError {
        warn!("Story operation rejected: {}", err);
        err
    }

    /// Loaded story content.
    #[must_use]
    pub const fn content(&self) -> &StoryContent {
        &self.content
    }

    /// Index of the current chapter.
    #[must_use]
    pub const fn current_chapter_index(&self) -> usize {
        self.current_chapter_index
    }

    /// The current chapter, if the cursor is in range.
    #[must_use]
    pub fn current_chapter(&self) -> Option<&StoryChapter> {
        self.content.chapters.get(self.current_chapter_index)
    }

    /// Looks up a chapter by ID.
    #[must_use]
    pub fn chapter(&self, id: &str) -> Option<&StoryChapter> {
        self.content.chapters.iter().find(|chapter| chapter.id == id)
    }

    /// Looks up a decision point by ID.
    #[must_use]
    pub fn decision_point(&self, id: &str) -> Option<&StoryDecisionPoint> {
        self.content.decision_points.get(id)
    }

    /// Recorded choice for a decision point.
    #[must_use]
    pub fn choice_for(&self, decision_point_id: &str) -> Option<&str> {
        self.player_choices.get(decision_point_id).map(String::as_str)
    }

    /// Full choice history.
    #[must_use]
    pub const fn player_choices(&self) -> &BTreeMap<String, String> {
        &self.player_choices
    }

    /// Decision points of the current chapter that have no recorded choice.
    #[must_use]
    pub fn undecided_decision_points(&self) -> Vec<&StoryDecisionPoint> {
        let Some(chapter) = self.current_chapter() else {
            return Vec::new();
        };
        chapter
            .decision_points
            .iter()
            .filter(|id| !self.player_choices.contains_key(id.as_str()))
            .filter_map(|id| self.content.decision_points.get(id))
            .collect()
    }

    /// Starts every main quest of the current chapter.
    ///
    /// Quests that cannot start are logged and skipped. Returns how many
    /// started.
    pub fn start_current_chapter(
        &self,
        quests: &mut QuestManager,
        player: &dyn QuestPlayer,
    ) -> StoryResult<usize> {
        let Some(chapter) = self.current_chapter() else {
            return Err(Self::reject(StoryError::NoMoreChapters));
        };
        info!("Starting chapter '{}'", chapter.id);
        let mut started = 0;
        for quest_id in &chapter.main_quests {
            if quests.start_quest(quest_id, player).is_ok() {
                started += 1;
            }
        }
        Ok(started)
    }

    /// Whether every main quest of the current chapter is completed.
    #[must_use]
    pub fn is_current_chapter_completed(&self, quests: &QuestManager) -> bool {
        self.current_chapter().is_some_and(|chapter| {
            chapter
                .main_quests
                .iter()
                .all(|id| quests.is_completed(id))
        })
    }

    /// Moves to the next chapter and starts its main quests.
    ///
    /// The cursor does not move past the last chapter.
    pub fn advance_to_next_chapter(
        &mut self,
        quests: &mut QuestManager,
        player: &dyn QuestPlayer,
    ) -> StoryResult<()> {
        let next = self.current_chapter_index + 1;
        if next >= self.content.chapters.len() {
            return Err(Self::reject(StoryError::NoMoreChapters));
        }
        self.current_chapter_index = next;
        info!("Advanced to chapter {}", next);
        self.start_current_chapter(quests, player)?;
        Ok(())
    }

    /// Records a choice and applies its consequences.
    ///
    /// A repeated decision overwrites the recorded choice and applies only
    /// the new choice's consequences. Consequences that fail are logged and
    /// do not stop the rest.
    pub fn make_choice(
        &mut self,
        decision_point_id: &str,
        choice_id: &str,
        quests: &mut QuestManager,
        player: &mut dyn QuestPlayer,
    ) -> StoryResult<()> {
        let Some(decision) = self.content.decision_points.get(decision_point_id) else {
            return Err(Self::reject(StoryError::UnknownDecisionPoint(
                decision_point_id.to_string(),
            )));
        };
        if !decision.has_choice(choice_id) {
            return Err(Self::reject(StoryError::UnknownChoice {
                decision_point: decision_point_id.to_string(),
                choice: choice_id.to_string(),
            }));
        }
        let consequences = decision.consequences_for(choice_id).to_vec();

        if let Some(previous) = self
            .player_choices
            .insert(decision_point_id.to_string(), choice_id.to_string())
        {
            debug!(
                "Choice at '{}' changed from '{}' to '{}'",
                decision_point_id, previous, choice_id
            );
        }
        info!("Player chose '{}' at '{}'", choice_id, decision_point_id);

        for consequence in &consequences {
            self.apply(consequence, quests, player);
        }
        Ok(())
    }

    fn apply(&mut self, consequence: &Consequence, quests: &mut QuestManager, player: &mut dyn QuestPlayer) {
        debug!("Applying consequence: {:?}", consequence);
        match consequence {
            Consequence::UnlockQuest { quest_id } => {
                let _ = quests.unlock_quest(quest_id);
            },
            Consequence::CompleteQuest { quest_id } => {
                let _ = quests.complete_quest(quest_id, player);
            },
            Consequence::FailQuest { quest_id, reason } => {
                let _ = quests.fail_quest(quest_id, reason);
            },
            Consequence::GrantItem { item_id, quantity } => {
                player.add_item(item_id, *quantity);
            },
            Consequence::SetReputation { faction, amount } => {
                let mut remaining = i64::from(*amount) - i64::from(player.reputation(faction));
                while remaining != 0 {
                    let step = remaining.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                    player.adjust_reputation(faction, step);
                    remaining -= i64::from(step);
                }
            },
            Consequence::AdvanceChapter => {
                let _ = self.advance_to_next_chapter(quests, player);
            },
        }
    }

    /// Captures the chapter cursor and choice history.
    #[must_use]
    pub fn save(&self) -> StoryProgressRecord {
        StoryProgressRecord {
            current_chapter_index: self.current_chapter_index,
            player_choices: self.player_choices.clone(),
        }
    }

    /// Restores the chapter cursor and choice history. No consequences are
    /// re-applied.
    pub fn load(&mut self, record: &StoryProgressRecord) {
        if record.current_chapter_index >= self.content.chapters.len() && !self.content.chapters.is_empty() {
            warn!(
                "Saved chapter index {} is past the last chapter",
                record.current_chapter_index
            );
        }
        for decision in record.player_choices.keys() {
            if !self.content.decision_points.contains_key(decision) {
                warn!("Saved choice for unknown decision point '{}'", decision);
            }
        }
        self.current_chapter_index = record.current_chapter_index;
        self.player_choices = record.player_choices.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::Objective;
    use crate::player::PlayerState;
    use crate::quest::{Quest, QuestState};
    use tempfile::TempDir;

    const STORY_JSON: &str = r#"{
        "version": "1.0.0",
        "chapters": [
            {"id": "ch1", "title": "Arrival", "main_quests": ["M1"], "decision_points": ["fork1"]},
            {"id": "ch2", "title": "The Road", "main_quests": ["M2"]}
        ],
        "decision_points": [
            {
                "id": "fork1",
                "title": "Crossroads",
                "choices": {"left": "Take the forest path", "right": "Take the river path"},
                "consequences": {
                    "left": [
                        {"type": "UNLOCK_QUEST", "quest_id": "Q2"},
                        {"type": "GRANT_ITEM", "item_id": "torch", "quantity": 2},
                        {"type": "TELEPORT", "quest_id": "Q2"}
                    ],
                    "right": [
                        {"type": "SET_REPUTATION", "faction": "river_folk", "amount": 25}
                    ]
                }
            }
        ]
    }"#;

    fn content() -> StoryContent {
        let file: StoryFile = serde_json::from_str(STORY_JSON).expect("story json");
        StoryContent::from_file(file)
    }

    fn quests() -> QuestManager {
        let mut manager = QuestManager::new();
        for id in ["M1", "M2", "Q2"] {
            manager
                .register_quest(
                    Quest::new(id, id, "")
                        .with_objective(Objective::talk_to_npc("talk", "Talk", "guide", None)),
                )
                .expect("register");
        }
        manager
    }

    #[test]
    fn test_content_drops_unknown_consequence() {
        let content = content();
        assert_eq!(content.chapters.len(), 2);
        let fork = &content.decision_points["fork1"];
        assert_eq!(fork.consequences_for("left").len(), 2);
        assert_eq!(
            fork.consequences_for("right"),
            &[Consequence::SetReputation {
                faction: "river_folk".to_string(),
                amount: 25
            }]
        );
    }

    #[test]
    fn test_consequence_validation() {
        let missing = ConsequenceDefinition {
            kind: "UNLOCK_QUEST".to_string(),
            ..ConsequenceDefinition::default()
        };
        assert!(matches!(missing.build(), Err(ContentError::Validation(_))));

        let advance = ConsequenceDefinition {
            kind: "ADVANCE_CHAPTER".to_string(),
            ..ConsequenceDefinition::default()
        };
        assert_eq!(advance.build().expect("advance"), Consequence::AdvanceChapter);
    }

    #[test]
    fn test_fork_choice_overwrites_without_replaying() {
        let mut story = StoryProgressionManager::new(content());
        let mut quests = quests();
        let mut player = PlayerState::new(1);

        story
            .make_choice("fork1", "left", &mut quests, &mut player)
            .expect("left");
        assert_eq!(quests.get_quest("Q2").map(Quest::state), Some(QuestState::Available));
        assert_eq!(player.item_count("torch"), 2);
        assert_eq!(story.choice_for("fork1"), Some("left"));

        story
            .make_choice("fork1", "right", &mut quests, &mut player)
            .expect("right");
        assert_eq!(story.choice_for("fork1"), Some("right"));
        assert_eq!(player.item_count("torch"), 2);
        assert_eq!(player.reputation("river_folk"), 25);
    }

    #[test]
    fn test_unknown_decision_and_choice() {
        let mut story = StoryProgressionManager::new(content());
        let mut quests = quests();
        let mut player = PlayerState::new(1);
        assert_eq!(
            story.make_choice("nowhere", "left", &mut quests, &mut player),
            Err(StoryError::UnknownDecisionPoint("nowhere".to_string()))
        );
        assert!(matches!(
            story.make_choice("fork1", "up", &mut quests, &mut player),
            Err(StoryError::UnknownChoice { .. })
        ));
        assert!(story.player_choices().is_empty());
    }

    #[test]
    fn test_set_reputation_is_absolute() {
        let mut story = StoryProgressionManager::new(content());
        let mut quests = quests();
        let mut player = PlayerState::new(1);
        player.adjust_reputation("river_folk", 40);
        story
            .make_choice("fork1", "right", &mut quests, &mut player)
            .expect("right");
        assert_eq!(player.reputation("river_folk"), 25);
    }

    #[test]
    fn test_set_reputation_spans_full_range() {
        let mut content = content();
        let fork = content.decision_points.get_mut("fork1").expect("fork1");
        fork.consequences.insert(
            "right".to_string(),
            vec![Consequence::SetReputation {
                faction: "river_folk".to_string(),
                amount: i32::MAX,
            }],
        );
        let mut story = StoryProgressionManager::new(content);
        let mut quests = quests();
        let mut player = PlayerState::new(1);
        player.adjust_reputation("river_folk", i32::MIN);

        story
            .make_choice("fork1", "right", &mut quests, &mut player)
            .expect("right");
        assert_eq!(player.reputation("river_folk"), i32::MAX);
    }

    #[test]
    fn test_chapter_flow() {
        let mut story = StoryProgressionManager::new(content());
        let mut quests = quests();
        let mut player = PlayerState::new(1);

        assert_eq!(story.start_current_chapter(&mut quests, &player).expect("start"), 1);
        assert!(quests.is_active("M1"));
        assert!(!story.is_current_chapter_completed(&quests));
        assert_eq!(story.undecided_decision_points().len(), 1);

        quests.on_talk_to_npc("guide", "");
        quests.complete_quest("M1", &mut player).expect("complete");
        assert!(story.is_current_chapter_completed(&quests));

        story
            .advance_to_next_chapter(&mut quests, &player)
            .expect("advance");
        assert_eq!(story.current_chapter().map(|c| c.id.as_str()), Some("ch2"));
        assert!(quests.is_active("M2"));

        assert_eq!(
            story.advance_to_next_chapter(&mut quests, &player),
            Err(StoryError::NoMoreChapters)
        );
        assert_eq!(story.current_chapter_index(), 1);
    }

    #[test]
    fn test_lookup_queries() {
        let story = StoryProgressionManager::new(content());
        assert_eq!(story.chapter("ch2").map(|c| c.title.as_str()), Some("The Road"));
        assert!(story.chapter("ch9").is_none());
        assert!(story.decision_point("fork1").is_some_and(|d| d.has_choice("left")));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut story = StoryProgressionManager::new(content());
        let mut quests = quests();
        let mut player = PlayerState::new(1);
        story
            .make_choice("fork1", "right", &mut quests, &mut player)
            .expect("right");
        story
            .advance_to_next_chapter(&mut quests, &player)
            .expect("advance");

        let record = story.save();
        let mut restored = StoryProgressionManager::new(content());
        restored.load(&record);
        assert_eq!(restored.current_chapter_index(), 1);
        assert_eq!(restored.player_choices(), story.player_choices());
        assert_eq!(restored.save(), record);
    }

    #[test]
    fn test_empty_story() {
        let story = StoryProgressionManager::default();
        let mut quests = quests();
        let player = PlayerState::new(1);
        assert!(story.current_chapter().is_none());
        assert!(!story.is_current_chapter_completed(&quests));
        assert_eq!(
            story.start_current_chapter(&mut quests, &player),
            Err(StoryError::NoMoreChapters)
        );
    }

    #[test]
    fn test_from_config_reads_story_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("story.json"), STORY_JSON).expect("write");
        let story = StoryProgressionManager::from_config(&SagaConfig::with_content_dir(dir.path()));
        assert_eq!(story.content().chapters.len(), 2);

        let missing = StoryProgressionManager::from_config(&SagaConfig::with_content_dir("/nonexistent/saga"));
        assert!(missing.content().chapters.is_empty());
    }
}

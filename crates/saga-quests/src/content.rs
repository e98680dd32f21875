//! Authored quest definitions and their conversion into runtime quests.
//!
//! Objectives and rewards are authored as flat records carrying a string
//! `type` tag. Conversion dispatches on the tag. A bad entry is logged and
//! dropped; it never aborts the surrounding quest or file.

use crate::objective::Objective;
use crate::player::{Creature, CreatureType, VariantType};
use crate::quest::{Quest, QuestDialogue};
use crate::reward::QuestReward;
use crate::world::{DayPhase, ExploreGate, Weather};
use saga_common::{AreaBounds, SchemaVersion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

/// Errors raised while reading authored content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// File not found.
    #[error("Content file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON.
    #[error("Failed to parse content JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse RON.
    #[error("Failed to parse content RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Content written for an unreadable schema version.
    #[error("Unsupported content version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version this build reads
        expected: SchemaVersion,
        /// Version declared by the file
        found: String,
    },

    /// Unrecognized objective, reward, or consequence tag.
    #[error("Unknown {kind} type '{tag}'")]
    UnknownTag {
        /// What was being built
        kind: &'static str,
        /// Offending tag
        tag: String,
    },

    /// Validation error.
    #[error("Content validation error: {0}")]
    Validation(String),
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Parses a document as RON when the path ends in `.ron`, JSON otherwise.
pub fn parse_document<T: DeserializeOwned>(path: &Path, text: &str) -> ContentResult<T> {
    if path.extension().is_some_and(|ext| ext == "ron") {
        Ok(ron::from_str(text)?)
    } else {
        Ok(serde_json::from_str(text)?)
    }
}

/// Checks a declared file version against the version this build reads.
pub fn check_version(declared: &str, supported: SchemaVersion) -> ContentResult<()> {
    let unsupported = || ContentError::UnsupportedVersion {
        expected: supported,
        found: declared.to_string(),
    };
    let version: SchemaVersion = declared.parse().map_err(|_| unsupported())?;
    if supported.can_read(&version) {
        Ok(())
    } else {
        Err(unsupported())
    }
}

fn default_version() -> String {
    SchemaVersion::QUEST_CONTENT.to_string()
}

const fn default_count() -> u32 {
    1
}

const fn default_min_level() -> u32 {
    1
}

fn required<'a>(value: Option<&'a str>, field: &str, owner: &str) -> ContentResult<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ContentError::Validation(format!("{owner} is missing '{field}'")))
}

fn parse_field<T: std::str::FromStr<Err = String>>(value: Option<&str>) -> ContentResult<Option<T>> {
    value.map(str::parse::<T>).transpose().map_err(ContentError::Validation)
}

/// An authored objective record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDefinition {
    /// Objective ID, unique within the quest
    pub id: String,
    /// Type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Description shown in the quest log
    #[serde(default)]
    pub description: String,
    /// Does not block quest completion
    #[serde(default)]
    pub optional: bool,
    /// Required count (kills, captures, items)
    #[serde(default = "default_count")]
    pub count: u32,
    /// Talk target
    #[serde(default)]
    pub npc_id: Option<String>,
    /// Specific dialogue to finish
    #[serde(default)]
    pub dialogue_id: Option<String>,
    /// Explore target
    #[serde(default)]
    pub area_id: Option<String>,
    /// Explore rectangle
    #[serde(default)]
    pub bounds: Option<AreaBounds>,
    /// Seconds the player must stay in the area
    #[serde(default)]
    pub min_dwell: Option<f32>,
    /// "DAY" or "NIGHT" gate
    #[serde(default)]
    pub time_of_day: Option<String>,
    /// Weather gate
    #[serde(default)]
    pub weather: Option<String>,
    /// Species filter
    #[serde(default)]
    pub creature_id: Option<String>,
    /// Creature family filter
    #[serde(default)]
    pub creature_type: Option<String>,
    /// Variant filter
    #[serde(default)]
    pub variant: Option<String>,
    /// Item to collect
    #[serde(default)]
    pub item_id: Option<String>,
    /// Remove collected items on completion
    #[serde(default)]
    pub consume: bool,
}

impl ObjectiveDefinition {
    /// Builds the runtime objective by dispatching on the type tag.
    pub fn build(&self) -> ContentResult<Objective> {
        let owner = format!("objective '{}'", self.id);
        if self.id.is_empty() {
            return Err(ContentError::Validation("objective has empty id".to_string()));
        }
        let objective = match self.kind.as_str() {
            "TALK_TO_NPC" => Objective::talk_to_npc(
                &self.id,
                &self.description,
                required(self.npc_id.as_deref(), "npc_id", &owner)?,
                self.dialogue_id.clone(),
            ),
            "EXPLORE_AREA" => {
                let area_id = required(self.area_id.as_deref(), "area_id", &owner)?;
                let bounds = self
                    .bounds
                    .ok_or_else(|| ContentError::Validation(format!("{owner} is missing 'bounds'")))?;
                let gate = ExploreGate {
                    phase: parse_field::<DayPhase>(self.time_of_day.as_deref())?,
                    weather: parse_field::<Weather>(self.weather.as_deref())?,
                };
                let mut objective = Objective::explore_area(&self.id, &self.description, area_id, bounds)
                    .with_gate(gate);
                if let Some(dwell) = self.min_dwell {
                    objective = objective.with_min_dwell(dwell);
                }
                objective
            },
            "DEFEAT_CREATURES" => {
                let mut objective = Objective::defeat_creatures(&self.id, &self.description, self.count);
                if let Some(id) = &self.creature_id {
                    objective = objective.with_creature_id(id);
                }
                if let Some(ty) = parse_field::<CreatureType>(self.creature_type.as_deref())? {
                    objective = objective.with_creature_type(ty);
                }
                objective
            },
            "CAPTURE_VARIANTS" => {
                let mut objective = Objective::capture_variants(&self.id, &self.description, self.count);
                if let Some(id) = &self.creature_id {
                    objective = objective.with_creature_id(id);
                }
                if let Some(variant) = parse_field::<VariantType>(self.variant.as_deref())? {
                    objective = objective.with_variant(variant);
                }
                objective
            },
            "COLLECT_ITEMS" => Objective::collect_items(
                &self.id,
                &self.description,
                required(self.item_id.as_deref(), "item_id", &owner)?,
                self.count,
                self.consume,
            ),
            other => {
                return Err(ContentError::UnknownTag {
                    kind: "objective",
                    tag: other.to_string(),
                })
            },
        };
        Ok(objective.optional(self.optional))
    }
}

/// An authored reward record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDefinition {
    /// Type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Experience, money, or reputation amount
    #[serde(default)]
    pub amount: i64,
    /// Item or creature ID
    #[serde(default)]
    pub id: Option<String>,
    /// Item or creature display name
    #[serde(default)]
    pub name: Option<String>,
    /// Item quantity
    #[serde(default = "default_count")]
    pub quantity: u32,
    /// Reputation faction
    #[serde(default)]
    pub faction: Option<String>,
    /// Creature family
    #[serde(default)]
    pub creature_type: Option<String>,
    /// Creature variant
    #[serde(default)]
    pub variant: Option<String>,
}

impl RewardDefinition {
    fn unsigned_amount(&self) -> ContentResult<u32> {
        u32::try_from(self.amount).map_err(|_| {
            ContentError::Validation(format!("{} reward amount {} out of range", self.kind, self.amount))
        })
    }

    /// Builds the runtime reward by dispatching on the type tag.
    pub fn build(&self) -> ContentResult<QuestReward> {
        let owner = format!("{} reward", self.kind);
        match self.kind.as_str() {
            "EXPERIENCE" => Ok(QuestReward::experience(self.unsigned_amount()?)),
            "MONEY" => Ok(QuestReward::money(self.unsigned_amount()?)),
            "ITEM" => {
                let id = required(self.id.as_deref(), "id", &owner)?;
                let name = self.name.as_deref().unwrap_or(id);
                Ok(QuestReward::item(id, name, self.quantity.max(1)))
            },
            "REPUTATION" => {
                let faction = required(self.faction.as_deref(), "faction", &owner)?;
                let amount = i32::try_from(self.amount).map_err(|_| {
                    ContentError::Validation(format!("reputation amount {} out of range", self.amount))
                })?;
                Ok(QuestReward::reputation(faction, amount))
            },
            "CREATURE" => {
                let id = required(self.id.as_deref(), "id", &owner)?;
                let creature_type = parse_field::<CreatureType>(self.creature_type.as_deref())?
                    .ok_or_else(|| ContentError::Validation(format!("{owner} is missing 'creature_type'")))?;
                let variant = parse_field::<VariantType>(self.variant.as_deref())?.unwrap_or_default();
                let name = self.name.as_deref().unwrap_or(id);
                Ok(QuestReward::creature(
                    Creature::new(id, name, creature_type).with_variant(variant),
                ))
            },
            other => Err(ContentError::UnknownTag {
                kind: "reward",
                tag: other.to_string(),
            }),
        }
    }
}

/// An authored quest record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestDefinition {
    /// Quest ID
    pub id: String,
    /// Display title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Minimum player level
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    /// Main story quest
    #[serde(default)]
    pub main_quest: bool,
    /// Required faction
    #[serde(default)]
    pub faction: Option<String>,
    /// Start without player action once startable
    #[serde(default)]
    pub auto_start: bool,
    /// Time limit in seconds
    #[serde(default)]
    pub time_limit: Option<f32>,
    /// Quests that must be completed first
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Quests offered on completion
    #[serde(default)]
    pub unlocks: Vec<String>,
    /// NPC lines
    #[serde(default)]
    pub dialogue: QuestDialogue,
    /// Objectives in order
    #[serde(default)]
    pub objectives: Vec<ObjectiveDefinition>,
    /// Rewards
    #[serde(default)]
    pub rewards: Vec<RewardDefinition>,
}

impl QuestDefinition {
    /// Builds the runtime quest.
    ///
    /// Objectives and rewards that fail to build are logged and skipped.
    pub fn build(&self) -> ContentResult<Quest> {
        if self.id.trim().is_empty() {
            return Err(ContentError::Validation("quest has empty id".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(ContentError::Validation(format!("quest '{}' has empty title", self.id)));
        }

        let mut quest = Quest::new(self.id.as_str(), &self.title, &self.description)
            .with_min_level(self.min_level)
            .main_quest(self.main_quest)
            .auto_start(self.auto_start)
            .with_dialogue(self.dialogue.clone());
        if let Some(faction) = &self.faction {
            quest = quest.with_faction(faction);
        }
        if let Some(limit) = self.time_limit {
            quest = quest.with_time_limit(limit);
        }
        for prerequisite in &self.prerequisites {
            quest = quest.with_prerequisite(prerequisite.as_str());
        }
        for unlock in &self.unlocks {
            quest = quest.with_unlock(unlock.as_str());
        }

        for definition in &self.objectives {
            match definition.build() {
                Ok(objective) => quest = quest.with_objective(objective),
                Err(e) => error!("Dropping objective '{}' of quest '{}': {}", definition.id, self.id, e),
            }
        }
        for definition in &self.rewards {
            match definition.build() {
                Ok(reward) => quest = quest.with_reward(reward),
                Err(e) => error!("Dropping reward of quest '{}': {}", self.id, e),
            }
        }

        Ok(quest)
    }
}

/// A collection of quests from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Quests in this file.
    #[serde(default)]
    pub quests: Vec<QuestDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ObjectiveKind;
    use crate::reward::RewardKind;

    fn objective(kind: &str) -> ObjectiveDefinition {
        ObjectiveDefinition {
            id: "o1".to_string(),
            kind: kind.to_string(),
            description: "Do it".to_string(),
            count: 3,
            ..ObjectiveDefinition::default()
        }
    }

    #[test]
    fn test_objective_dispatch() {
        let mut talk = objective("TALK_TO_NPC");
        talk.npc_id = Some("elder".to_string());
        assert_eq!(talk.build().expect("talk").kind().tag(), "TALK_TO_NPC");

        let mut defeat = objective("DEFEAT_CREATURES");
        defeat.creature_type = Some("undead".to_string());
        let built = defeat.build().expect("defeat");
        assert_eq!(built.required(), 3);
        assert!(matches!(
            built.kind(),
            ObjectiveKind::DefeatCreatures {
                creature_type: Some(CreatureType::Undead),
                ..
            }
        ));

        let mut collect = objective("COLLECT_ITEMS");
        collect.item_id = Some("herb".to_string());
        collect.consume = true;
        assert!(matches!(
            collect.build().expect("collect").kind(),
            ObjectiveKind::CollectItems { consume: true, .. }
        ));
    }

    #[test]
    fn test_explore_gate_parsing() {
        let mut explore = objective("EXPLORE_AREA");
        explore.area_id = Some("marsh".to_string());
        explore.bounds = Some(AreaBounds::new(0.0, 0.0, 5.0, 5.0));
        explore.time_of_day = Some("night".to_string());
        explore.weather = Some("FOG".to_string());
        let built = explore.build().expect("explore");
        let gate = built.exploration_gate().expect("gated");
        assert_eq!(gate.phase, Some(DayPhase::Night));
        assert_eq!(gate.weather, Some(Weather::Fog));
    }

    #[test]
    fn test_objective_errors() {
        assert!(matches!(
            objective("DANCE").build(),
            Err(ContentError::UnknownTag { kind: "objective", .. })
        ));
        assert!(matches!(
            objective("TALK_TO_NPC").build(),
            Err(ContentError::Validation(_))
        ));

        let mut capture = objective("CAPTURE_VARIANTS");
        capture.variant = Some("sparkly".to_string());
        assert!(matches!(capture.build(), Err(ContentError::Validation(_))));
    }

    #[test]
    fn test_reward_dispatch() {
        let xp = RewardDefinition {
            kind: "EXPERIENCE".to_string(),
            amount: 150,
            ..RewardDefinition::default()
        };
        assert_eq!(xp.build().expect("xp").kind(), &RewardKind::Experience(150));

        let rep = RewardDefinition {
            kind: "REPUTATION".to_string(),
            amount: -20,
            faction: Some("thieves".to_string()),
            ..RewardDefinition::default()
        };
        assert_eq!(rep.build().expect("rep").description(), "-20 reputation with thieves");

        let negative_money = RewardDefinition {
            kind: "MONEY".to_string(),
            amount: -1,
            ..RewardDefinition::default()
        };
        assert!(negative_money.build().is_err());

        let unknown = RewardDefinition {
            kind: "HUGS".to_string(),
            ..RewardDefinition::default()
        };
        assert!(matches!(unknown.build(), Err(ContentError::UnknownTag { .. })));
    }

    #[test]
    fn test_quest_drops_bad_entries() {
        let json = r#"{
            "id": "q1",
            "title": "First Steps",
            "min_level": 2,
            "unlocks": ["q2"],
            "objectives": [
                {"id": "talk", "type": "TALK_TO_NPC", "npc_id": "elder"},
                {"id": "bad", "type": "JUGGLE"}
            ],
            "rewards": [
                {"type": "MONEY", "amount": 10},
                {"type": "CREATURE", "id": "imp", "creature_type": "fiend"}
            ]
        }"#;
        let definition: QuestDefinition = serde_json::from_str(json).expect("parse");
        let quest = definition.build().expect("build");
        assert_eq!(quest.min_level(), 2);
        assert_eq!(quest.objectives().len(), 1);
        assert_eq!(quest.rewards().len(), 1);
        assert_eq!(quest.unlocks()[0].as_str(), "q2");
    }

    #[test]
    fn test_quest_requires_id_and_title() {
        let definition = QuestDefinition {
            id: "q".to_string(),
            ..QuestDefinition::default()
        };
        assert!(definition.build().is_err());
    }

    #[test]
    fn test_version_check() {
        assert!(check_version("1.2", SchemaVersion::QUEST_CONTENT).is_ok());
        assert!(check_version("2.0.0", SchemaVersion::QUEST_CONTENT).is_err());
        assert!(check_version("latest", SchemaVersion::QUEST_CONTENT).is_err());
    }

    #[test]
    fn test_parse_ron_document() {
        let text = r#"(version: "1.0.0", quests: [(id: "r1", title: "Ron Quest")])"#;
        let file: QuestFile = parse_document(Path::new("quests.ron"), text).expect("ron");
        assert_eq!(file.quests[0].id, "r1");
        assert_eq!(file.quests[0].min_level, 1);
    }
}

//! Save records for quest and story progress, plus save slot storage.
//!
//! Only active quests are written in full. Finished quests are stored by ID
//! and rebuilt from their definitions on load.

use crate::objective::{Objective, ObjectiveState};
use crate::quest::{Quest, QuestState, QuestStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use saga_common::{QuestId, SagaError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Current quest save format version.
///
/// Version 1 records carry no `status` on quest entries.
pub const QUEST_SAVE_VERSION: u32 = 2;

/// Current session save format version.
pub const SESSION_SAVE_VERSION: u32 = 1;

/// Errors that can occur during quest persistence.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Version mismatch.
    #[error("Incompatible save version: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version.
        expected: u32,
        /// Found version.
        found: u32,
    },

    /// Corrupted data.
    #[error("Corrupted save data: {0}")]
    Corrupted(String),

    /// Slot does not exist.
    #[error("Save slot not found: {0}")]
    SlotNotFound(String),

    /// Slot name unusable as a key.
    #[error("Invalid slot name: {0}")]
    InvalidSlotName(String),

    /// Storage failure.
    #[error(transparent)]
    Common(#[from] SagaError),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        Self::Common(SagaError::Io(e))
    }
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Saved progress of one objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSave {
    /// Objective ID
    pub id: String,
    /// State
    pub state: ObjectiveState,
    /// Current progress
    pub current: u32,
    /// Requirement
    pub required: u32,
    /// Seconds spent inside an explore area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_area: Option<f32>,
}

impl ObjectiveSave {
    /// Captures an objective.
    #[must_use]
    pub fn capture(objective: &Objective) -> Self {
        Self {
            id: objective.id().to_string(),
            state: objective.state(),
            current: objective.current(),
            required: objective.required(),
            time_in_area: objective.time_in_area(),
        }
    }
}

/// Full resumable state of an active quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestStateSave {
    /// Quest ID
    pub id: QuestId,
    /// Quest state
    pub state: QuestState,
    /// Bookkeeping status, absent in version 1 saves
    #[serde(default)]
    pub status: Option<QuestStatus>,
    /// Seconds elapsed under a time limit
    #[serde(default)]
    pub elapsed: f32,
    /// Time limit in seconds
    #[serde(default)]
    pub time_limit: Option<f32>,
    /// Completion time
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure reason
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Per-objective progress
    #[serde(default)]
    pub objectives: Vec<ObjectiveSave>,
}

impl QuestStateSave {
    /// Captures a quest.
    #[must_use]
    pub fn capture(quest: &Quest) -> Self {
        Self {
            id: quest.id().clone(),
            state: quest.state(),
            status: Some(quest.status()),
            elapsed: quest.elapsed(),
            time_limit: quest.time_limit(),
            completed_at: quest.completed_at(),
            failure_reason: quest.failure_reason().map(str::to_string),
            objectives: quest.objectives().iter().map(ObjectiveSave::capture).collect(),
        }
    }

    /// Saved status, or the one derived from the state when missing.
    #[must_use]
    pub fn resolved_status(&self) -> QuestStatus {
        self.status.unwrap_or_else(|| QuestStatus::from_state(self.state))
    }

    /// Writes the saved state onto a copy of the quest definition.
    ///
    /// Objectives are matched by ID. Saved objectives the definition no
    /// longer has are ignored.
    pub fn apply_to(&self, quest: &mut Quest) {
        quest.restore_runtime(
            self.state,
            self.resolved_status(),
            self.elapsed,
            self.time_limit,
            self.completed_at,
            self.failure_reason.clone(),
        );
        for saved in &self.objectives {
            match quest.objective_mut(&saved.id) {
                Some(objective) => {
                    objective.restore(saved.state, saved.current, saved.required, saved.time_in_area);
                },
                None => warn!(
                    "Saved objective '{}' no longer exists in quest '{}'",
                    saved.id, self.id
                ),
            }
        }
    }
}

const fn legacy_version() -> u32 {
    1
}

/// Quest manager save record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestSaveRecord {
    /// Format version
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Full state of every active quest
    #[serde(default)]
    pub active_quests: Vec<QuestStateSave>,
    /// Completed quest IDs
    #[serde(default)]
    pub completed_quest_ids: Vec<QuestId>,
    /// Failed quest IDs
    #[serde(default)]
    pub failed_quest_ids: Vec<QuestId>,
    /// Abandoned quest IDs
    #[serde(default)]
    pub abandoned_quest_ids: Vec<QuestId>,
    /// Offered but not accepted quest IDs
    #[serde(default)]
    pub unlocked_quest_ids: Vec<QuestId>,
}

impl Default for QuestSaveRecord {
    fn default() -> Self {
        Self {
            version: QUEST_SAVE_VERSION,
            active_quests: Vec::new(),
            completed_quest_ids: Vec::new(),
            failed_quest_ids: Vec::new(),
            abandoned_quest_ids: Vec::new(),
            unlocked_quest_ids: Vec::new(),
        }
    }
}

impl QuestSaveRecord {
    /// Migrates an older record to the current version.
    pub fn migrate(mut self) -> SaveResult<Self> {
        if self.version == QUEST_SAVE_VERSION {
            return Ok(self);
        }

        info!(
            "Migrating quest save from v{} to v{}",
            self.version, QUEST_SAVE_VERSION
        );

        if self.version == 1 {
            for quest in &mut self.active_quests {
                quest.status = Some(quest.resolved_status());
            }
            self.version = 2;
        }

        if self.version != QUEST_SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: QUEST_SAVE_VERSION,
                found: self.version,
            });
        }

        Ok(self)
    }

    /// Rejects records listing the same quest more than once.
    pub fn validate(&self) -> SaveResult<()> {
        let mut seen = HashSet::new();
        let ids = self
            .active_quests
            .iter()
            .map(|q| &q.id)
            .chain(&self.completed_quest_ids)
            .chain(&self.failed_quest_ids)
            .chain(&self.abandoned_quest_ids)
            .chain(&self.unlocked_quest_ids);
        for id in ids {
            if !seen.insert(id) {
                return Err(SaveError::Corrupted(format!("quest '{id}' listed twice")));
            }
        }
        Ok(())
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> SaveResult<String> {
        serde_json::to_string(self).map_err(|e| SaveError::Serialization(e.to_string()))
    }

    /// Deserializes from JSON, migrating older versions.
    pub fn from_json(json: &str) -> SaveResult<Self> {
        let data: Self =
            serde_json::from_str(json).map_err(|e| SaveError::Serialization(e.to_string()))?;
        let data = data.migrate()?;
        data.validate()?;
        Ok(data)
    }
}

/// Story progression save record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryProgressRecord {
    /// Index of the current chapter
    pub current_chapter_index: usize,
    /// Decision point ID to choice ID
    #[serde(default)]
    pub player_choices: BTreeMap<String, String>,
}

/// Everything persisted for one save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSave {
    /// Format version
    pub version: u32,
    /// When the save was written
    pub saved_at: DateTime<Utc>,
    /// Quest manager state
    pub quests: QuestSaveRecord,
    /// Story progression state
    pub story: StoryProgressRecord,
}

impl SessionSave {
    /// Bundles quest and story records, stamped with the current time.
    #[must_use]
    pub fn new(quests: QuestSaveRecord, story: StoryProgressRecord) -> Self {
        Self {
            version: SESSION_SAVE_VERSION,
            saved_at: Utc::now(),
            quests,
            story,
        }
    }

    /// Migrates an older session save to the current version.
    pub fn migrate(mut self) -> SaveResult<Self> {
        if self.version != SESSION_SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SESSION_SAVE_VERSION,
                found: self.version,
            });
        }
        self.quests = self.quests.migrate()?;
        Ok(self)
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> SaveResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Serialization(e.to_string()))
    }

    /// Deserializes from JSON, migrating older versions.
    pub fn from_json(json: &str) -> SaveResult<Self> {
        let data: Self =
            serde_json::from_str(json).map_err(|e| SaveError::Serialization(e.to_string()))?;
        let data = data.migrate()?;
        data.quests.validate()?;
        Ok(data)
    }

    /// Writes this save to a slot.
    pub fn write_to(&self, store: &dyn SaveStore, slot: &str) -> SaveResult<()> {
        store.write(slot, &self.to_json()?)
    }

    /// Reads a save from a slot.
    pub fn read_from(store: &dyn SaveStore, slot: &str) -> SaveResult<Self> {
        Self::from_json(&store.read(slot)?)
    }
}

/// Opaque blob storage, one blob per save slot.
pub trait SaveStore: Send + Sync {
    /// Reads a slot.
    fn read(&self, slot: &str) -> SaveResult<String>;

    /// Writes a slot, replacing any previous content.
    fn write(&self, slot: &str, blob: &str) -> SaveResult<()>;

    /// Deletes a slot.
    fn delete(&self, slot: &str) -> SaveResult<()>;

    /// Whether a slot exists.
    fn exists(&self, slot: &str) -> bool;

    /// Names of all slots, sorted.
    fn list_slots(&self) -> SaveResult<Vec<String>>;
}

fn validate_slot_name(slot: &str) -> SaveResult<()> {
    if slot.is_empty() {
        return Err(SaveError::InvalidSlotName("Empty slot name".to_string()));
    }

    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '.'];
    for c in invalid_chars {
        if slot.contains(c) {
            return Err(SaveError::InvalidSlotName(format!(
                "Invalid character '{c}' in slot name"
            )));
        }
    }

    Ok(())
}

/// One JSON file per slot in a directory.
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    save_dir: PathBuf,
}

impl FileSaveStore {
    /// Creates a store rooted at a directory. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(save_dir: impl AsRef<Path>) -> Self {
        Self {
            save_dir: save_dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the save directory.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.save_dir.join(format!("{slot}.json"))
    }

    fn temp_path(&self, slot: &str) -> PathBuf {
        self.save_dir.join(format!("{slot}.tmp"))
    }
}

impl SaveStore for FileSaveStore {
    fn read(&self, slot: &str) -> SaveResult<String> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(SaveError::SlotNotFound(slot.to_string()));
        }
        let blob = fs::read_to_string(&path)?;
        debug!("Read {} bytes from slot {}", blob.len(), slot);
        Ok(blob)
    }

    fn write(&self, slot: &str, blob: &str) -> SaveResult<()> {
        validate_slot_name(slot)?;
        fs::create_dir_all(&self.save_dir)?;

        let temp_path = self.temp_path(slot);
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            writer.write_all(blob.as_bytes())?;
            writer.flush()?;
        }
        if let Err(e) = fs::rename(&temp_path, self.slot_path(slot)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        info!("Saved game to slot: {}", slot);
        Ok(())
    }

    fn delete(&self, slot: &str) -> SaveResult<()> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(SaveError::SlotNotFound(slot.to_string()));
        }
        fs::remove_file(path)?;
        debug!("Deleted slot {}", slot);
        Ok(())
    }

    fn exists(&self, slot: &str) -> bool {
        validate_slot_name(slot).is_ok() && self.slot_path(slot).exists()
    }

    fn list_slots(&self) -> SaveResult<Vec<String>> {
        if !self.save_dir.exists() {
            return Ok(Vec::new());
        }
        let mut slots: Vec<String> = fs::read_dir(&self.save_dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        slots.sort();
        Ok(slots)
    }
}

/// In-memory store for tests and tools.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySaveStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemorySaveStore {
    fn read(&self, slot: &str) -> SaveResult<String> {
        self.slots
            .lock()
            .get(slot)
            .cloned()
            .ok_or_else(|| SaveError::SlotNotFound(slot.to_string()))
    }

    fn write(&self, slot: &str, blob: &str) -> SaveResult<()> {
        validate_slot_name(slot)?;
        self.slots.lock().insert(slot.to_string(), blob.to_string());
        Ok(())
    }

    fn delete(&self, slot: &str) -> SaveResult<()> {
        self.slots
            .lock()
            .remove(slot)
            .map(|_| ())
            .ok_or_else(|| SaveError::SlotNotFound(slot.to_string()))
    }

    fn exists(&self, slot: &str) -> bool {
        self.slots.lock().contains_key(slot)
    }

    fn list_slots(&self) -> SaveResult<Vec<String>> {
        let mut slots: Vec<String> = self.slots.lock().keys().cloned().collect();
        slots.sort();
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerState;
    use tempfile::TempDir;

    fn sample_record() -> QuestSaveRecord {
        let player = PlayerState::new(1);
        let mut quest = Quest::new("hunt", "Hunt", "")
            .with_objective(Objective::defeat_creatures("wolves", "Wolves", 3))
            .with_time_limit(60.0);
        quest.start(&player).expect("start");
        QuestSaveRecord {
            active_quests: vec![QuestStateSave::capture(&quest)],
            completed_quest_ids: vec![QuestId::new("intro")],
            ..QuestSaveRecord::default()
        }
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = sample_record();
        let json = record.to_json().expect("serialize");
        let loaded = QuestSaveRecord::from_json(&json).expect("deserialize");
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_v1_record_gets_status_from_state() {
        let json = r#"{
            "version": 1,
            "active_quests": [{"id": "hunt", "state": "InProgress"}],
            "completed_quest_ids": ["intro"]
        }"#;
        let record = QuestSaveRecord::from_json(json).expect("migrate");
        assert_eq!(record.version, QUEST_SAVE_VERSION);
        assert_eq!(record.active_quests[0].status, Some(QuestStatus::Active));
    }

    #[test]
    fn test_missing_version_treated_as_v1() {
        let record = QuestSaveRecord::from_json(r#"{"active_quests": []}"#).expect("migrate");
        assert_eq!(record.version, QUEST_SAVE_VERSION);
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{"version": 99}"#;
        assert!(matches!(
            QuestSaveRecord::from_json(json),
            Err(SaveError::VersionMismatch { found: 99, .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut record = sample_record();
        record.failed_quest_ids.push(QuestId::new("intro"));
        assert!(matches!(record.validate(), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_apply_restores_progress() {
        let player = PlayerState::new(1);
        let definition = Quest::new("hunt", "Hunt", "")
            .with_objective(Objective::defeat_creatures("wolves", "Wolves", 3));
        let mut running = definition.clone();
        running.start(&player).expect("start");
        running
            .objective_mut("wolves")
            .expect("objective")
            .increment_amount(2);

        let saved = QuestStateSave::capture(&running);
        let mut restored = definition;
        saved.apply_to(&mut restored);
        assert_eq!(restored, running);
    }

    #[test]
    fn test_session_save_through_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileSaveStore::new(temp_dir.path().join("saves"));

        let mut story = StoryProgressRecord::default();
        story.current_chapter_index = 2;
        story.player_choices.insert("fork1".to_string(), "left".to_string());
        let session = SessionSave::new(sample_record(), story);

        session.write_to(&store, "slot1").expect("write");
        assert!(store.exists("slot1"));
        assert_eq!(store.list_slots().expect("list"), vec!["slot1".to_string()]);

        let loaded = SessionSave::read_from(&store, "slot1").expect("read");
        assert_eq!(loaded, session);

        store.delete("slot1").expect("delete");
        assert!(matches!(store.read("slot1"), Err(SaveError::SlotNotFound(_))));
    }

    #[test]
    fn test_slot_names_validated() {
        let store = MemorySaveStore::new();
        assert!(matches!(
            store.write("../escape", "{}"),
            Err(SaveError::InvalidSlotName(_))
        ));
        assert!(matches!(store.write("", "{}"), Err(SaveError::InvalidSlotName(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySaveStore::new();
        store.write("b", "2").expect("write");
        store.write("a", "1").expect("write");
        assert_eq!(store.read("a").expect("read"), "1");
        assert_eq!(store.list_slots().expect("list"), vec!["a", "b"]);
        store.delete("a").expect("delete");
        assert!(!store.exists("a"));
    }
}

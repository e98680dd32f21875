//! Quest manager: partitions quests by lifecycle and routes game events.
//!
//! Every known quest lives in exactly one of five partitions (available,
//! active, completed, failed, abandoned). Moving a quest always removes it
//! from its source partition before inserting it into the destination.
//!
//! The player is never owned here. Operations that read or change the
//! player take it as an argument.

use crate::config::SagaConfig;
use crate::events::{QuestEvent, QuestEventSink};
use crate::fallback::fallback_quests;
use crate::loader::QuestLoader;
use crate::player::{Creature, QuestPlayer};
use crate::quest::{ObjectiveChange, Quest, QuestError, QuestResult, QuestState, QuestSummary};
use crate::save::{QuestSaveRecord, QuestStateSave};
use crate::world::WorldConditions;
use saga_common::QuestId;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// The partition a quest currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestLocation {
    /// Loaded or offered, not started
    Available,
    /// In progress
    Active,
    /// Finished successfully
    Completed,
    /// Finished unsuccessfully
    Failed,
    /// Dropped by the player
    Abandoned,
}

impl QuestLocation {
    /// All partitions.
    pub const ALL: [Self; 5] = [
        Self::Available,
        Self::Active,
        Self::Completed,
        Self::Failed,
        Self::Abandoned,
    ];
}

impl fmt::Display for QuestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Available => "available",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// Owns every quest of a game session.
#[derive(Default)]
pub struct QuestManager {
    definitions: BTreeMap<QuestId, Quest>,
    available: BTreeMap<QuestId, Quest>,
    active: BTreeMap<QuestId, Quest>,
    completed: BTreeMap<QuestId, Quest>,
    failed: BTreeMap<QuestId, Quest>,
    abandoned: BTreeMap<QuestId, Quest>,
    sinks: Vec<Box<dyn QuestEventSink>>,
}

impl fmt::Debug for QuestManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestManager")
            .field("available", &self.available.len())
            .field("active", &self.active.len())
            .field("completed", &self.completed.len())
            .field("failed", &self.failed.len())
            .field("abandoned", &self.abandoned.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl QuestManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event listener.
    pub fn add_sink(&mut self, sink: impl QuestEventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    fn emit(&self, event: QuestEvent) {
        debug!("Quest event: {:?}", event);
        for sink in &self.sinks {
            sink.handle(&event);
        }
    }

    fn emit_changes(&self, quest_id: &QuestId, changes: Vec<ObjectiveChange>) {
        for change in changes {
            let event = if change.completed {
                QuestEvent::ObjectiveCompleted {
                    quest_id: quest_id.clone(),
                    objective_id: change.objective_id,
                }
            } else {
                QuestEvent::ObjectiveProgressed {
                    quest_id: quest_id.clone(),
                    objective_id: change.objective_id,
                    current: change.current,
                    required: change.required,
                }
            };
            self.emit(event);
        }
    }

    fn partition(&self, location: QuestLocation) -> &BTreeMap<QuestId, Quest> {
        match location {
            QuestLocation::Available => &self.available,
            QuestLocation::Active => &self.active,
            QuestLocation::Completed => &self.completed,
            QuestLocation::Failed => &self.failed,
            QuestLocation::Abandoned => &self.abandoned,
        }
    }

    fn partition_mut(&mut self, location: QuestLocation) -> &mut BTreeMap<QuestId, Quest> {
        match location {
            QuestLocation::Available => &mut self.available,
            QuestLocation::Active => &mut self.active,
            QuestLocation::Completed => &mut self.completed,
            QuestLocation::Failed => &mut self.failed,
            QuestLocation::Abandoned => &mut self.abandoned,
        }
    }

    fn reject(err: QuestError) -> QuestError {
        warn!("Quest operation rejected: {}", err);
        err
    }

    /// Adds a quest definition and places a fresh copy in "available".
    pub fn register_quest(&mut self, mut quest: Quest) -> QuestResult<()> {
        if self.definitions.contains_key(quest.id()) {
            return Err(Self::reject(QuestError::Duplicate(quest.id().clone())));
        }
        quest.reset();
        let id = quest.id().clone();
        self.definitions.insert(id.clone(), quest.clone());
        self.available.insert(id, quest);
        Ok(())
    }

    /// Loads quests from every configured source.
    ///
    /// Installs the built-in quests when no source yields a quest and the
    /// configuration allows it. Quests already registered do not count. Returns the number of quests registered.
    pub fn load_quests(&mut self, config: &SagaConfig) -> usize {
        let mut loader = QuestLoader::new(config);
        let quests = loader.load_all();
        let loaded = quests.len();
        let mut registered = 0;
        for quest in quests {
            if self.register_quest(quest).is_ok() {
                registered += 1;
            }
        }

        if loaded == 0 && config.allow_fallback {
            warn!("No quest content could be loaded, installing fallback quests");
            registered = self.install_fallback();
        }
        info!("Quest manager holds {} quests", self.definitions.len());
        registered
    }

    /// Registers the built-in quests. Returns how many were new.
    pub fn install_fallback(&mut self) -> usize {
        fallback_quests()
            .into_iter()
            .filter(|quest| self.register_quest(quest.clone()).is_ok())
            .count()
    }

    /// Partition holding a quest.
    #[must_use]
    pub fn quest_location(&self, id: &str) -> Option<QuestLocation> {
        QuestLocation::ALL
            .into_iter()
            .find(|location| self.partition(*location).contains_key(id))
    }

    /// Looks up a quest in whichever partition holds it.
    #[must_use]
    pub fn get_quest(&self, id: &str) -> Option<&Quest> {
        self.quest_location(id)
            .and_then(|location| self.partition(location).get(id))
    }

    /// Pristine definition of a quest as loaded.
    #[must_use]
    pub fn definition(&self, id: &str) -> Option<&Quest> {
        self.definitions.get(id)
    }

    /// Number of known quests.
    #[must_use]
    pub fn quest_count(&self) -> usize {
        self.definitions.len()
    }

    /// Quests in a partition, in ID order.
    pub fn quests_in(&self, location: QuestLocation) -> impl Iterator<Item = &Quest> {
        self.partition(location).values()
    }

    /// IDs in a partition, in ID order.
    #[must_use]
    pub fn quest_ids(&self, location: QuestLocation) -> Vec<QuestId> {
        self.partition(location).keys().cloned().collect()
    }

    /// Number of quests in a partition.
    #[must_use]
    pub fn count(&self, location: QuestLocation) -> usize {
        self.partition(location).len()
    }

    /// Whether a quest is waiting to be started.
    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        self.available.contains_key(id)
    }

    /// Whether a quest is in progress.
    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    /// Whether a quest has been completed.
    #[must_use]
    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains_key(id)
    }

    /// Whether a quest has failed.
    #[must_use]
    pub fn is_failed(&self, id: &str) -> bool {
        self.failed.contains_key(id)
    }

    /// Whether a quest was abandoned.
    #[must_use]
    pub fn is_abandoned(&self, id: &str) -> bool {
        self.abandoned.contains_key(id)
    }

    /// UI data for every active quest.
    #[must_use]
    pub fn active_summaries(&self) -> Vec<QuestSummary> {
        self.active.values().map(Quest::summary).collect()
    }

    fn ensure_available(&self, id: &str) -> QuestResult<&Quest> {
        if let Some(quest) = self.available.get(id) {
            return Ok(quest);
        }
        match self.get_quest(id) {
            Some(quest) => Err(QuestError::WrongPartition {
                id: quest.id().clone(),
                state: quest.state(),
            }),
            None => Err(QuestError::NotFound(QuestId::new(id))),
        }
    }

    fn check_requirements(quest: &Quest, player: &dyn QuestPlayer) -> QuestResult<()> {
        if player.level() < quest.min_level() {
            return Err(QuestError::LevelTooLow {
                id: quest.id().clone(),
                required: quest.min_level(),
                actual: player.level(),
            });
        }
        if let Some(faction) = quest.faction() {
            if !player.is_faction_member(faction) {
                return Err(QuestError::FactionRequired {
                    id: quest.id().clone(),
                    faction: faction.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Explains why a quest cannot be started right now.
    pub fn check_can_start(&self, id: &str, player: &dyn QuestPlayer) -> QuestResult<()> {
        let quest = self.ensure_available(id)?;
        Self::check_requirements(quest, player)?;
        if quest
            .prerequisites()
            .iter()
            .any(|prerequisite| !self.completed.contains_key(prerequisite))
        {
            return Err(QuestError::PrerequisitesNotMet(quest.id().clone()));
        }
        Ok(())
    }

    /// Whether a quest is available, the player meets its level and faction
    /// requirements, and every prerequisite is completed.
    #[must_use]
    pub fn can_start_quest(&self, id: &str, player: &dyn QuestPlayer) -> bool {
        self.check_can_start(id, player).is_ok()
    }

    /// Starts an available quest.
    ///
    /// Prerequisites are not checked here so story progression can start
    /// quests directly; [`Self::can_start_quest`] checks them.
    pub fn start_quest(&mut self, id: &str, player: &dyn QuestPlayer) -> QuestResult<()> {
        let checked = self
            .ensure_available(id)
            .and_then(|quest| Self::check_requirements(quest, player));
        if let Err(e) = checked {
            return Err(Self::reject(e));
        }

        let Some(mut quest) = self.available.remove(id) else {
            return Err(Self::reject(QuestError::NotFound(QuestId::new(id))));
        };
        if let Err(e) = quest.start(player) {
            self.available.insert(quest.id().clone(), quest);
            return Err(Self::reject(e));
        }

        let quest_id = quest.id().clone();
        self.active.insert(quest_id.clone(), quest);
        self.emit(QuestEvent::Started { quest_id });
        Ok(())
    }

    fn take_active(&mut self, id: &str) -> QuestResult<Quest> {
        if let Some(quest) = self.active.remove(id) {
            return Ok(quest);
        }
        Err(Self::reject(match self.get_quest(id) {
            Some(quest) => QuestError::WrongPartition {
                id: quest.id().clone(),
                state: quest.state(),
            },
            None => QuestError::NotFound(QuestId::new(id)),
        }))
    }

    /// Completes an active quest, pays its rewards once, and starts the
    /// quests it unlocks when they are startable.
    pub fn complete_quest(&mut self, id: &str, player: &mut dyn QuestPlayer) -> QuestResult<()> {
        let mut quest = self.take_active(id)?;
        if let Err(e) = quest.complete() {
            self.active.insert(quest.id().clone(), quest);
            return Err(Self::reject(e));
        }
        self.finish_completed(quest, player);
        Ok(())
    }

    fn finish_completed(&mut self, quest: Quest, player: &mut dyn QuestPlayer) {
        let quest_id = quest.id().clone();
        let unlocks = quest.unlocks().to_vec();
        let rewards = quest.rewards().to_vec();
        self.completed.insert(quest_id.clone(), quest);
        self.emit(QuestEvent::Completed {
            quest_id: quest_id.clone(),
        });

        for reward in rewards {
            reward.apply(player);
            self.emit(QuestEvent::RewardGranted {
                quest_id: quest_id.clone(),
                description: reward.description().to_string(),
            });
        }

        for unlocked in unlocks {
            if !self.available.contains_key(&unlocked) {
                debug!("Unlock target '{}' is not available, skipping", unlocked);
                continue;
            }
            let _ = self.unlock_quest(&unlocked);
            if self.can_start_quest(&unlocked, player) {
                let _ = self.start_quest(&unlocked, player);
            }
        }
    }

    fn finish_failed(&mut self, quest: Quest) {
        let quest_id = quest.id().clone();
        let reason = quest.failure_reason().unwrap_or_default().to_string();
        self.failed.insert(quest_id.clone(), quest);
        self.emit(QuestEvent::Failed { quest_id, reason });
    }

    /// Fails an active quest.
    pub fn fail_quest(&mut self, id: &str, reason: &str) -> QuestResult<()> {
        let mut quest = self.take_active(id)?;
        if let Err(e) = quest.fail(reason) {
            self.active.insert(quest.id().clone(), quest);
            return Err(Self::reject(e));
        }
        self.finish_failed(quest);
        Ok(())
    }

    /// Abandons an active quest.
    pub fn abandon_quest(&mut self, id: &str) -> QuestResult<()> {
        let mut quest = self.take_active(id)?;
        if let Err(e) = quest.abandon() {
            self.active.insert(quest.id().clone(), quest);
            return Err(Self::reject(e));
        }
        let quest_id = quest.id().clone();
        self.abandoned.insert(quest_id.clone(), quest);
        self.emit(QuestEvent::Abandoned { quest_id });
        Ok(())
    }

    /// Resets a quest wherever it is and returns it to "available".
    pub fn reset_quest(&mut self, id: &str) -> QuestResult<()> {
        let Some(location) = self.quest_location(id) else {
            return Err(Self::reject(QuestError::NotFound(QuestId::new(id))));
        };
        let Some(mut quest) = self.partition_mut(location).remove(id) else {
            return Err(Self::reject(QuestError::NotFound(QuestId::new(id))));
        };
        quest.reset();
        let quest_id = quest.id().clone();
        self.available.insert(quest_id.clone(), quest);
        self.emit(QuestEvent::Reset { quest_id });
        Ok(())
    }

    /// Offers a quest that is waiting in "available".
    ///
    /// Unlocking an already offered quest succeeds without a new event.
    pub fn unlock_quest(&mut self, id: &str) -> QuestResult<()> {
        if let Err(e) = self.ensure_available(id) {
            return Err(Self::reject(e));
        }
        let Some(quest) = self.available.get_mut(id) else {
            return Err(Self::reject(QuestError::NotFound(QuestId::new(id))));
        };
        if quest.state() == QuestState::Available {
            return Ok(());
        }
        quest.make_available().map_err(Self::reject)?;
        let quest_id = quest.id().clone();
        info!("Quest '{}' is now available", quest_id);
        self.emit(QuestEvent::Available { quest_id });
        Ok(())
    }

    /// Per-frame tick.
    ///
    /// Ticks active quests, starts available auto-start quests, then
    /// advances gated exploration whose conditions hold. Completion cascades
    /// finish before this returns.
    pub fn update(&mut self, dt: f32, player: &mut dyn QuestPlayer, world: &WorldConditions) {
        let active_ids: Vec<QuestId> = self.active.keys().cloned().collect();
        for id in &active_ids {
            let Some(quest) = self.active.get_mut(id) else {
                continue;
            };
            let tick = quest.update(dt, player);
            self.emit_changes(id, tick.changes);
            match tick.outcome {
                Some(QuestState::Completed) => {
                    if let Some(quest) = self.active.remove(id) {
                        self.finish_completed(quest, player);
                    }
                },
                Some(QuestState::Failed) => {
                    if let Some(quest) = self.active.remove(id) {
                        self.finish_failed(quest);
                    }
                },
                _ => {},
            }
        }

        let auto_start: Vec<QuestId> = self
            .available
            .values()
            .filter(|quest| quest.is_auto_start())
            .map(|quest| quest.id().clone())
            .collect();
        for id in auto_start {
            if self.can_start_quest(&id, player) {
                let _ = self.start_quest(&id, player);
            }
        }

        let active_ids: Vec<QuestId> = self.active.keys().cloned().collect();
        for id in &active_ids {
            let Some(quest) = self.active.get_mut(id) else {
                continue;
            };
            let changes = quest.advance_gated_exploration(dt, player, |gate| world.satisfies(gate));
            if !changes.iter().any(|change| change.completed) {
                self.emit_changes(id, changes);
                continue;
            }
            let outcome = quest.try_auto_complete();
            self.emit_changes(id, changes);
            if outcome == Some(QuestState::Completed) {
                if let Some(quest) = self.active.remove(id) {
                    self.finish_completed(quest, player);
                }
            }
        }
    }

    fn broadcast(&mut self, mut hook: impl FnMut(&mut Quest) -> Vec<ObjectiveChange>) {
        let mut all = Vec::new();
        for (id, quest) in &mut self.active {
            let changes = hook(quest);
            if !changes.is_empty() {
                all.push((id.clone(), changes));
            }
        }
        for (id, changes) in all {
            self.emit_changes(&id, changes);
        }
    }

    /// A creature was defeated.
    pub fn on_creature_defeated(&mut self, creature: &Creature) {
        debug!("Creature defeated: {}", creature.id);
        self.broadcast(|quest| quest.on_creature_defeated(creature));
    }

    /// A creature was captured.
    pub fn on_variant_captured(&mut self, creature: &Creature) {
        debug!("Creature captured: {} ({})", creature.id, creature.variant);
        self.broadcast(|quest| quest.on_creature_captured(creature));
    }

    /// Items entered the player's inventory.
    ///
    /// Collect objectives re-read the held quantity, so `count` is only
    /// logged.
    pub fn on_item_added(&mut self, item_id: &str, count: u32, player: &mut dyn QuestPlayer) {
        debug!("Item added: {} x{}", item_id, count);
        self.broadcast(|quest| quest.on_item_added(item_id, player));
    }

    /// An NPC conversation finished.
    pub fn on_talk_to_npc(&mut self, npc_id: &str, dialogue_id: &str) {
        debug!("Dialogue finished: {} / {}", npc_id, dialogue_id);
        self.broadcast(|quest| quest.on_talk(npc_id, dialogue_id));
    }

    /// Captures the resumable state of every partition.
    #[must_use]
    pub fn save(&self) -> QuestSaveRecord {
        QuestSaveRecord {
            active_quests: self.active.values().map(QuestStateSave::capture).collect(),
            completed_quest_ids: self.quest_ids(QuestLocation::Completed),
            failed_quest_ids: self.quest_ids(QuestLocation::Failed),
            abandoned_quest_ids: self.quest_ids(QuestLocation::Abandoned),
            unlocked_quest_ids: self
                .available
                .values()
                .filter(|quest| quest.state() == QuestState::Available)
                .map(|quest| quest.id().clone())
                .collect(),
            ..QuestSaveRecord::default()
        }
    }

    /// Restores partitions from a save record.
    ///
    /// Every partition is rebuilt from the loaded definitions; quests the
    /// record does not mention return to "available". Unknown IDs are
    /// logged and skipped.
    pub fn load(&mut self, record: &QuestSaveRecord) {
        self.available.clear();
        self.active.clear();
        self.completed.clear();
        self.failed.clear();
        self.abandoned.clear();

        let mut restored = 0;
        for saved in &record.active_quests {
            let Some(mut quest) = self.definitions.get(&saved.id).cloned() else {
                warn!("Saved quest '{}' is unknown, skipping", saved.id);
                continue;
            };
            saved.apply_to(&mut quest);
            self.active.insert(saved.id.clone(), quest);
            restored += 1;
        }

        let finished = [
            (&record.completed_quest_ids, QuestState::Completed, QuestLocation::Completed),
            (&record.failed_quest_ids, QuestState::Failed, QuestLocation::Failed),
            (&record.abandoned_quest_ids, QuestState::Abandoned, QuestLocation::Abandoned),
            (&record.unlocked_quest_ids, QuestState::Available, QuestLocation::Available),
        ];
        for (ids, state, location) in finished {
            for id in ids {
                if self.quest_location(id).is_some() {
                    warn!("Saved quest '{}' listed more than once, skipping", id);
                    continue;
                }
                let Some(mut quest) = self.definitions.get(id).cloned() else {
                    warn!("Saved quest '{}' is unknown, skipping", id);
                    continue;
                };
                quest.stamp_state(state);
                self.partition_mut(location).insert(id.clone(), quest);
                restored += 1;
            }
        }

        let untouched: Vec<Quest> = self
            .definitions
            .values()
            .filter(|quest| self.quest_location(quest.id().as_str()).is_none())
            .cloned()
            .collect();
        for quest in untouched {
            self.available.insert(quest.id().clone(), quest);
        }

        info!("Restored {} quests from save", restored);
    }
}

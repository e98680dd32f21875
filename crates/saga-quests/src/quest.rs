//! Quests: ordered objectives, rewards, and a top-level state machine.
//!
//! A quest never knows which manager partition holds it. It reports what
//! happened through return values and the manager reacts.

use crate::objective::{Objective, ObjectiveState};
use crate::player::{Creature, QuestPlayer};
use crate::reward::QuestReward;
use crate::world::ExploreGate;
use chrono::{DateTime, Utc};
use saga_common::QuestId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Failure reason recorded when a timed quest runs out.
pub const TIME_EXPIRED: &str = "time expired";

/// Top-level quest state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestState {
    /// Loaded but not offered
    #[default]
    NotStarted,
    /// Offered to the player, not yet accepted
    Available,
    /// Accepted and running
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished unsuccessfully
    Failed,
    /// Dropped by the player
    Abandoned,
}

impl fmt::Display for QuestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Available => "available",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// Save-game bookkeeping status kept next to [`QuestState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Not visible to the player
    #[default]
    Locked,
    /// Visible in the quest offer list
    Unlocked,
    /// Shown in the active journal
    Active,
    /// Shown as completed
    Completed,
    /// Shown as failed
    Failed,
    /// Shown as abandoned
    Abandoned,
}

impl QuestStatus {
    /// Mapping table used whenever a status has to be derived from a state,
    /// including saves written before the status field existed.
    #[must_use]
    pub const fn from_state(state: QuestState) -> Self {
        match state {
            QuestState::NotStarted => Self::Locked,
            QuestState::Available => Self::Unlocked,
            QuestState::InProgress => Self::Active,
            QuestState::Completed => Self::Completed,
            QuestState::Failed => Self::Failed,
            QuestState::Abandoned => Self::Abandoned,
        }
    }
}

/// Error types for quest operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestError {
    /// Quest not found
    #[error("Quest not found: {0}")]
    NotFound(QuestId),
    /// Quest ID registered twice
    #[error("Duplicate quest ID: {0}")]
    Duplicate(QuestId),
    /// Quest is held by a partition other than the one the operation needs
    #[error("Quest {id} is already {state}")]
    WrongPartition {
        /// Quest ID
        id: QuestId,
        /// State of the quest where it was found
        state: QuestState,
    },
    /// Transition not allowed from the current state
    #[error("Cannot {action} quest {id} while it is {state}")]
    InvalidTransition {
        /// Quest ID
        id: QuestId,
        /// Attempted transition
        action: &'static str,
        /// Current state
        state: QuestState,
    },
    /// Player level too low
    #[error("Quest {id} requires level {required}, player is level {actual}")]
    LevelTooLow {
        /// Quest ID
        id: QuestId,
        /// Minimum level
        required: u32,
        /// Player level
        actual: u32,
    },
    /// Player not in the quest's faction
    #[error("Quest {id} requires membership in {faction}")]
    FactionRequired {
        /// Quest ID
        id: QuestId,
        /// Required faction
        faction: String,
    },
    /// Prerequisites not met
    #[error("Prerequisites not met for quest: {0}")]
    PrerequisitesNotMet(QuestId),
    /// Quest objectives not complete
    #[error("Quest objectives not complete: {0}")]
    ObjectivesIncomplete(QuestId),
}

/// Result type for quest operations.
pub type QuestResult<T> = Result<T, QuestError>;

/// Lines an NPC speaks at quest milestones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDialogue {
    /// Spoken when the quest starts
    pub start: String,
    /// Spoken when the quest completes
    pub end: String,
    /// Spoken when the quest fails
    pub fail: String,
}

/// Progress change of one objective, reported back to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveChange {
    /// Objective ID
    pub objective_id: String,
    /// Progress after the change
    pub current: u32,
    /// Requirement
    pub required: u32,
    /// Whether this change completed the objective
    pub completed: bool,
}

/// Result of one quest tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestTick {
    /// Objectives whose progress moved during the tick
    pub changes: Vec<ObjectiveChange>,
    /// Terminal state reached during the tick, if any
    pub outcome: Option<QuestState>,
}

/// A player-facing quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    id: QuestId,
    title: String,
    description: String,
    min_level: u32,
    main_quest: bool,
    faction: Option<String>,
    auto_start: bool,
    objectives: Vec<Objective>,
    rewards: Vec<QuestReward>,
    state: QuestState,
    status: QuestStatus,
    prerequisites: Vec<QuestId>,
    unlocks: Vec<QuestId>,
    dialogue: QuestDialogue,
    time_limit: Option<f32>,
    elapsed: f32,
    completed_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
}

impl Quest {
    /// Creates a new quest with no objectives.
    #[must_use]
    pub fn new(id: impl Into<QuestId>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            min_level: 1,
            main_quest: false,
            faction: None,
            auto_start: false,
            objectives: Vec::new(),
            rewards: Vec::new(),
            state: QuestState::NotStarted,
            status: QuestStatus::Locked,
            prerequisites: Vec::new(),
            unlocks: Vec::new(),
            dialogue: QuestDialogue::default(),
            time_limit: None,
            elapsed: 0.0,
            completed_at: None,
            failure_reason: None,
        }
    }

    /// Adds an objective.
    #[must_use]
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Adds a reward.
    #[must_use]
    pub fn with_reward(mut self, reward: QuestReward) -> Self {
        self.rewards.push(reward);
        self
    }

    /// Adds a prerequisite quest.
    #[must_use]
    pub fn with_prerequisite(mut self, quest_id: impl Into<QuestId>) -> Self {
        self.prerequisites.push(quest_id.into());
        self
    }

    /// Adds a quest unlocked when this one completes.
    #[must_use]
    pub fn with_unlock(mut self, quest_id: impl Into<QuestId>) -> Self {
        self.unlocks.push(quest_id.into());
        self
    }

    /// Sets the minimum player level.
    #[must_use]
    pub const fn with_min_level(mut self, level: u32) -> Self {
        self.min_level = level;
        self
    }

    /// Marks this as a main-story quest.
    #[must_use]
    pub const fn main_quest(mut self, main: bool) -> Self {
        self.main_quest = main;
        self
    }

    /// Restricts the quest to members of a faction.
    #[must_use]
    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = Some(faction.into());
        self
    }

    /// Lets the manager start the quest on its own once startable.
    #[must_use]
    pub const fn auto_start(mut self, auto: bool) -> Self {
        self.auto_start = auto;
        self
    }

    /// Sets a time limit in seconds.
    #[must_use]
    pub fn with_time_limit(mut self, seconds: f32) -> Self {
        self.time_limit = (seconds > 0.0).then_some(seconds);
        self
    }

    /// Sets NPC dialogue lines.
    #[must_use]
    pub fn with_dialogue(mut self, dialogue: QuestDialogue) -> Self {
        self.dialogue = dialogue;
        self
    }

    /// Quest ID.
    #[must_use]
    pub const fn id(&self) -> &QuestId {
        &self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Minimum player level.
    #[must_use]
    pub const fn min_level(&self) -> u32 {
        self.min_level
    }

    /// Whether this is a main-story quest.
    #[must_use]
    pub const fn is_main_quest(&self) -> bool {
        self.main_quest
    }

    /// Required faction, if any.
    #[must_use]
    pub fn faction(&self) -> Option<&str> {
        self.faction.as_deref()
    }

    /// Whether the quest is restricted to a faction.
    #[must_use]
    pub const fn is_faction_specific(&self) -> bool {
        self.faction.is_some()
    }

    /// Whether the manager may start the quest without player action.
    #[must_use]
    pub const fn is_auto_start(&self) -> bool {
        self.auto_start
    }

    /// Objectives in authored order.
    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Looks up an objective by ID.
    #[must_use]
    pub fn objective(&self, id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id() == id)
    }

    /// Mutable objective lookup, for direct manipulation by tools.
    pub fn objective_mut(&mut self, id: &str) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| o.id() == id)
    }

    /// Rewards.
    #[must_use]
    pub fn rewards(&self) -> &[QuestReward] {
        &self.rewards
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> QuestState {
        self.state
    }

    /// Save bookkeeping status.
    #[must_use]
    pub const fn status(&self) -> QuestStatus {
        self.status
    }

    /// Quests that must be completed first.
    #[must_use]
    pub fn prerequisites(&self) -> &[QuestId] {
        &self.prerequisites
    }

    /// Quests offered when this one completes.
    #[must_use]
    pub fn unlocks(&self) -> &[QuestId] {
        &self.unlocks
    }

    /// NPC dialogue lines.
    #[must_use]
    pub const fn dialogue(&self) -> &QuestDialogue {
        &self.dialogue
    }

    /// Time limit in seconds, if any.
    #[must_use]
    pub const fn time_limit(&self) -> Option<f32> {
        self.time_limit
    }

    /// Seconds spent in progress under a time limit.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds left before a timed quest fails.
    #[must_use]
    pub fn time_remaining(&self) -> Option<f32> {
        self.time_limit.map(|limit| (limit - self.elapsed).max(0.0))
    }

    /// When the quest was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Why the quest failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Whether every required objective is completed.
    ///
    /// Optional objectives never block completion.
    #[must_use]
    pub fn are_all_objectives_completed(&self) -> bool {
        self.objectives
            .iter()
            .filter(|o| !o.is_optional())
            .all(Objective::is_completed)
    }

    /// Unweighted mean of objective progress. Zero with no objectives.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.objectives.is_empty() {
            return 0.0;
        }
        let total: f32 = self.objectives.iter().map(Objective::progress).sum();
        total / self.objectives.len() as f32
    }

    fn set_state(&mut self, state: QuestState) {
        self.state = state;
        self.status = QuestStatus::from_state(state);
    }

    fn invalid(&self, action: &'static str) -> QuestError {
        QuestError::InvalidTransition {
            id: self.id.clone(),
            action,
            state: self.state,
        }
    }

    /// Marks a not-started quest as offered.
    pub fn make_available(&mut self) -> QuestResult<()> {
        match self.state {
            QuestState::NotStarted => {
                self.set_state(QuestState::Available);
                Ok(())
            },
            QuestState::Available => Ok(()),
            _ => Err(self.invalid("unlock")),
        }
    }

    /// Starts the quest and all its objectives.
    pub fn start(&mut self, player: &dyn QuestPlayer) -> QuestResult<()> {
        if !matches!(self.state, QuestState::NotStarted | QuestState::Available) {
            return Err(self.invalid("start"));
        }
        if player.level() < self.min_level {
            return Err(QuestError::LevelTooLow {
                id: self.id.clone(),
                required: self.min_level,
                actual: player.level(),
            });
        }
        self.set_state(QuestState::InProgress);
        self.elapsed = 0.0;
        for objective in &mut self.objectives {
            objective.start();
        }
        info!("Quest '{}' started", self.id);
        Ok(())
    }

    /// Completes the quest. Requires every objective done.
    ///
    /// Rewards are not applied here.
    pub fn complete(&mut self) -> QuestResult<()> {
        if self.state != QuestState::InProgress {
            return Err(self.invalid("complete"));
        }
        if !self.are_all_objectives_completed() {
            return Err(QuestError::ObjectivesIncomplete(self.id.clone()));
        }
        self.set_state(QuestState::Completed);
        self.completed_at = Some(Utc::now());
        info!("Quest '{}' completed", self.id);
        Ok(())
    }

    /// Fails the quest with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> QuestResult<()> {
        if self.state != QuestState::InProgress {
            return Err(self.invalid("fail"));
        }
        let reason = reason.into();
        info!("Quest '{}' failed: {}", self.id, reason);
        self.failure_reason = Some(reason);
        self.set_state(QuestState::Failed);
        Ok(())
    }

    /// Abandons the quest.
    pub fn abandon(&mut self) -> QuestResult<()> {
        if self.state != QuestState::InProgress {
            return Err(self.invalid("abandon"));
        }
        self.set_state(QuestState::Abandoned);
        info!("Quest '{}' abandoned", self.id);
        Ok(())
    }

    /// Returns the quest to `NotStarted` and resets every objective.
    pub fn reset(&mut self) {
        self.set_state(QuestState::NotStarted);
        self.elapsed = 0.0;
        self.completed_at = None;
        self.failure_reason = None;
        for objective in &mut self.objectives {
            objective.reset();
        }
        debug!("Quest '{}' reset", self.id);
    }

    /// Per-frame tick.
    ///
    /// The time limit is checked before objectives: a quest whose limit is
    /// exceeded fails even if its objectives finished on the same frame.
    pub fn update(&mut self, dt: f32, player: &mut dyn QuestPlayer) -> QuestTick {
        let mut tick = QuestTick::default();
        if self.state != QuestState::InProgress {
            return tick;
        }

        if let Some(limit) = self.time_limit {
            self.elapsed += dt;
            if self.elapsed > limit {
                if self.fail(TIME_EXPIRED).is_ok() {
                    tick.outcome = Some(QuestState::Failed);
                }
                return tick;
            }
        }

        tick.changes = self.dispatch(|objective| objective.update(dt, player));
        tick.outcome = self.try_auto_complete();
        tick
    }

    /// Completes the quest if it is in progress and every objective is done.
    pub fn try_auto_complete(&mut self) -> Option<QuestState> {
        if self.state == QuestState::InProgress && self.are_all_objectives_completed() {
            self.complete().ok().map(|()| QuestState::Completed)
        } else {
            None
        }
    }

    /// Routes an NPC dialogue event to talk objectives.
    pub fn on_talk(&mut self, npc_id: &str, dialogue_id: &str) -> Vec<ObjectiveChange> {
        self.dispatch(|objective| objective.on_talk(npc_id, dialogue_id))
    }

    /// Routes a creature defeat to defeat objectives.
    pub fn on_creature_defeated(&mut self, creature: &Creature) -> Vec<ObjectiveChange> {
        self.dispatch(|objective| objective.on_creature_defeated(creature))
    }

    /// Routes a creature capture to capture objectives.
    pub fn on_creature_captured(&mut self, creature: &Creature) -> Vec<ObjectiveChange> {
        self.dispatch(|objective| objective.on_creature_captured(creature))
    }

    /// Routes an inventory change to collect objectives.
    pub fn on_item_added(&mut self, item_id: &str, player: &mut dyn QuestPlayer) -> Vec<ObjectiveChange> {
        self.dispatch(|objective| objective.on_item_added(item_id, player))
    }

    /// Advances gated exploration objectives whose gate the caller has
    /// already checked against the current world conditions.
    pub fn advance_gated_exploration(
        &mut self,
        dt: f32,
        player: &mut dyn QuestPlayer,
        gate_open: impl Fn(&ExploreGate) -> bool,
    ) -> Vec<ObjectiveChange> {
        self.dispatch(|objective| {
            let open = objective.exploration_gate().is_some_and(|gate| gate_open(gate));
            open && objective.advance_exploration(dt, player)
        })
    }

    fn dispatch(&mut self, mut handler: impl FnMut(&mut Objective) -> bool) -> Vec<ObjectiveChange> {
        let mut changes = Vec::new();
        if self.state != QuestState::InProgress {
            return changes;
        }
        for objective in &mut self.objectives {
            if objective.state() != ObjectiveState::InProgress {
                continue;
            }
            let before = objective.current();
            let completed = handler(objective);
            if completed || objective.current() != before {
                changes.push(ObjectiveChange {
                    objective_id: objective.id().to_string(),
                    current: objective.current(),
                    required: objective.required(),
                    completed,
                });
            }
        }
        changes
    }

    /// Overwrites runtime fields from saved data.
    pub(crate) fn restore_runtime(
        &mut self,
        state: QuestState,
        status: QuestStatus,
        elapsed: f32,
        time_limit: Option<f32>,
        completed_at: Option<DateTime<Utc>>,
        failure_reason: Option<String>,
    ) {
        self.state = state;
        self.status = status;
        self.elapsed = elapsed;
        self.time_limit = time_limit;
        self.completed_at = completed_at;
        self.failure_reason = failure_reason;
    }

    /// Re-stamps a pristine definition for ID-only save entries.
    ///
    /// Completed quests get every objective marked complete.
    pub(crate) fn stamp_state(&mut self, state: QuestState) {
        self.set_state(state);
        if state == QuestState::Completed {
            for objective in &mut self.objectives {
                let required = objective.required();
                let dwell = objective.time_in_area();
                objective.restore(ObjectiveState::Completed, required, required, dwell);
            }
        }
    }

    /// Builds display data for quest log UIs.
    #[must_use]
    pub fn summary(&self) -> QuestSummary {
        QuestSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            state: self.state,
            progress: self.progress(),
            time_remaining: self.time_remaining(),
            objectives: self
                .objectives
                .iter()
                .map(|o| ObjectiveSummary {
                    description: o.description().to_string(),
                    current: o.current(),
                    required: o.required(),
                    optional: o.is_optional(),
                    complete: o.is_completed(),
                })
                .collect(),
            rewards: self.rewards.iter().map(|r| r.description().to_string()).collect(),
        }
    }
}

/// Quest data formatted for UI display.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestSummary {
    /// Quest ID
    pub id: QuestId,
    /// Quest title
    pub title: String,
    /// Quest description
    pub description: String,
    /// Current state
    pub state: QuestState,
    /// Overall progress ratio
    pub progress: f32,
    /// Seconds left on a timed quest
    pub time_remaining: Option<f32>,
    /// Objective status list
    pub objectives: Vec<ObjectiveSummary>,
    /// Reward descriptions
    pub rewards: Vec<String>,
}

/// Objective data formatted for UI display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveSummary {
    /// Objective description
    pub description: String,
    /// Current progress
    pub current: u32,
    /// Required for completion
    pub required: u32,
    /// Whether the objective is optional
    pub optional: bool,
    /// Whether objective is complete
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{CreatureType, PlayerState};

    fn hunt_quest() -> Quest {
        Quest::new("hunt", "The Hunt", "Thin the wolf pack")
            .with_objective(
                Objective::defeat_creatures("wolves", "Defeat 2 wolves", 2)
                    .with_creature_type(CreatureType::Beast),
            )
            .with_reward(QuestReward::experience(100))
    }

    fn wolf() -> Creature {
        Creature::new("wolf", "Wolf", CreatureType::Beast)
    }

    #[test]
    fn test_quest_builder() {
        let quest = Quest::new("q1", "Test Quest", "A test quest")
            .with_objective(Objective::defeat_creatures("a", "A", 5))
            .with_objective(Objective::collect_items("b", "B", "herb", 3, false))
            .with_reward(QuestReward::experience(100))
            .with_reward(QuestReward::money(50))
            .with_prerequisite("q0")
            .with_unlock("q2")
            .with_min_level(4)
            .with_faction("rangers")
            .main_quest(true);

        assert_eq!(quest.id().as_str(), "q1");
        assert_eq!(quest.title(), "Test Quest");
        assert_eq!(quest.objectives().len(), 2);
        assert_eq!(quest.rewards().len(), 2);
        assert_eq!(quest.prerequisites().len(), 1);
        assert_eq!(quest.unlocks().len(), 1);
        assert_eq!(quest.min_level(), 4);
        assert!(quest.is_faction_specific());
        assert!(quest.is_main_quest());
        assert_eq!(quest.state(), QuestState::NotStarted);
        assert_eq!(quest.status(), QuestStatus::Locked);
    }

    #[test]
    fn test_start_requires_level() {
        let mut quest = hunt_quest().with_min_level(5);
        let low = PlayerState::new(3);
        assert!(matches!(quest.start(&low), Err(QuestError::LevelTooLow { .. })));
        assert_eq!(quest.state(), QuestState::NotStarted);

        let high = PlayerState::new(5);
        quest.start(&high).expect("start should succeed");
        assert_eq!(quest.state(), QuestState::InProgress);
        assert_eq!(quest.status(), QuestStatus::Active);
        assert!(quest.objectives()[0].is_in_progress());
    }

    #[test]
    fn test_start_only_from_not_started_or_available() {
        let player = PlayerState::new(1);
        let mut quest = hunt_quest();
        quest.make_available().expect("unlock");
        quest.start(&player).expect("start from available");
        assert!(matches!(
            quest.start(&player),
            Err(QuestError::InvalidTransition { action: "start", .. })
        ));
    }

    #[test]
    fn test_complete_requires_objectives() {
        let player = PlayerState::new(1);
        let mut quest = hunt_quest();
        quest.start(&player).expect("start");
        assert_eq!(
            quest.complete(),
            Err(QuestError::ObjectivesIncomplete(QuestId::new("hunt")))
        );

        quest.on_creature_defeated(&wolf());
        quest.on_creature_defeated(&wolf());
        quest.complete().expect("complete");
        assert!(quest.completed_at().is_some());

        assert!(quest.complete().is_err());
    }

    #[test]
    fn test_update_auto_completes() {
        let mut player = PlayerState::new(1);
        let mut quest = hunt_quest();
        quest.start(&player).expect("start");

        let changes = quest.on_creature_defeated(&wolf());
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].completed);

        let changes = quest.on_creature_defeated(&wolf());
        assert!(changes[0].completed);
        assert!(quest.are_all_objectives_completed());
        assert_eq!(quest.state(), QuestState::InProgress);

        let tick = quest.update(0.016, &mut player);
        assert_eq!(tick.outcome, Some(QuestState::Completed));
        assert_eq!(quest.state(), QuestState::Completed);
    }

    #[test]
    fn test_update_completes_held_items_and_area_in_one_tick() {
        use saga_common::{AreaBounds, Position};

        let mut player = PlayerState::new(1);
        let mut quest = Quest::new("supply", "Supply Run", "")
            .with_objective(Objective::collect_items("herbs", "Bring 3 herbs", "herb", 3, true))
            .with_objective(Objective::explore_area(
                "camp",
                "Reach the camp",
                "camp",
                AreaBounds::new(20.0, 20.0, 10.0, 10.0),
            ));
        quest.start(&player).expect("start");

        player.add_item("herb", 2);
        let tick = quest.update(0.1, &mut player);
        assert_eq!(tick.outcome, None);
        assert_eq!(tick.changes.len(), 1);
        assert_eq!(tick.changes[0].current, 2);

        player.add_item("herb", 1);
        player.set_position(Position::new(25.0, 25.0));
        let tick = quest.update(0.1, &mut player);
        assert_eq!(tick.changes.len(), 2);
        assert!(tick.changes.iter().all(|change| change.completed));
        assert_eq!(tick.outcome, Some(QuestState::Completed));
        assert_eq!(player.item_count("herb"), 0);
        assert!(player.has_discovered_area("camp"));
    }

    #[test]
    fn test_time_limit_fails_before_objectives() {
        let mut player = PlayerState::new(1);
        player.add_item("herb", 1);
        let mut quest = Quest::new("timed", "Timed", "Hurry")
            .with_objective(Objective::collect_items("c", "Collect", "herb", 1, false))
            .with_time_limit(10.0);
        quest.start(&player).expect("start");

        let tick = quest.update(11.0, &mut player);
        assert_eq!(tick.outcome, Some(QuestState::Failed));
        assert_eq!(quest.state(), QuestState::Failed);
        assert_eq!(quest.failure_reason(), Some(TIME_EXPIRED));
        assert!(!quest.objectives()[0].is_completed());
    }

    #[test]
    fn test_time_limit_not_exceeded_at_boundary() {
        let mut player = PlayerState::new(1);
        let mut quest = hunt_quest().with_time_limit(10.0);
        quest.start(&player).expect("start");
        quest.update(10.0, &mut player);
        assert_eq!(quest.state(), QuestState::InProgress);
        assert_eq!(quest.time_remaining(), Some(0.0));
    }

    #[test]
    fn test_fail_and_abandon_only_in_progress() {
        let player = PlayerState::new(1);
        let mut quest = hunt_quest();
        assert!(quest.fail("nope").is_err());
        assert!(quest.abandon().is_err());

        quest.start(&player).expect("start");
        quest.abandon().expect("abandon");
        assert_eq!(quest.state(), QuestState::Abandoned);
        assert!(quest.fail("late").is_err());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut player = PlayerState::new(1);
        let mut quest = hunt_quest().with_time_limit(5.0);
        quest.start(&player).expect("start");
        quest.on_creature_defeated(&wolf());
        quest.update(6.0, &mut player);
        assert_eq!(quest.state(), QuestState::Failed);

        quest.reset();
        assert_eq!(quest.state(), QuestState::NotStarted);
        assert_eq!(quest.elapsed(), 0.0);
        assert!(quest.failure_reason().is_none());
        assert_eq!(quest.objectives()[0].current(), 0);
        assert_eq!(quest.objectives()[0].state(), ObjectiveState::NotStarted);
    }

    #[test]
    fn test_progress_average() {
        let player = PlayerState::new(1);
        assert_eq!(Quest::new("empty", "Empty", "").progress(), 0.0);

        let mut quest = Quest::new("two", "Two", "")
            .with_objective(Objective::defeat_creatures("a", "A", 2))
            .with_objective(Objective::defeat_creatures("b", "B", 4).with_creature_id("bear"));
        quest.start(&player).expect("start");
        quest.on_creature_defeated(&wolf());
        // a: 1/2, b: 0/4
        assert!((quest.progress() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_optional_objective_does_not_block() {
        let mut player = PlayerState::new(1);
        let mut quest = Quest::new("opt", "Optional", "")
            .with_objective(Objective::defeat_creatures("main", "Main", 1))
            .with_objective(Objective::talk_to_npc("bonus", "Bonus", "bard", None).optional(true));
        quest.start(&player).expect("start");
        quest.on_creature_defeated(&wolf());
        assert_eq!(quest.update(0.1, &mut player).outcome, Some(QuestState::Completed));
    }

    #[test]
    fn test_clone_is_independent() {
        let player = PlayerState::new(1);
        let original = hunt_quest();
        let mut copy = original.clone();
        copy.start(&player).expect("start");
        copy.on_creature_defeated(&wolf());

        assert_eq!(original.state(), QuestState::NotStarted);
        assert_eq!(original.objectives()[0].current(), 0);
        assert_eq!(copy.objectives()[0].current(), 1);
        assert_eq!(original.rewards(), copy.rewards());
    }

    #[test]
    fn test_events_ignored_unless_in_progress() {
        let mut quest = hunt_quest();
        assert!(quest.on_creature_defeated(&wolf()).is_empty());
        assert_eq!(quest.objectives()[0].current(), 0);
    }

    #[test]
    fn test_status_mapping_table() {
        assert_eq!(QuestStatus::from_state(QuestState::NotStarted), QuestStatus::Locked);
        assert_eq!(QuestStatus::from_state(QuestState::Available), QuestStatus::Unlocked);
        assert_eq!(QuestStatus::from_state(QuestState::InProgress), QuestStatus::Active);
        assert_eq!(QuestStatus::from_state(QuestState::Abandoned), QuestStatus::Abandoned);
    }

    #[test]
    fn test_summary() {
        let quest = hunt_quest();
        let summary = quest.summary();
        assert_eq!(summary.title, "The Hunt");
        assert_eq!(summary.objectives.len(), 1);
        assert_eq!(summary.objectives[0].required, 2);
        assert_eq!(summary.rewards, vec!["100 XP".to_string()]);
    }
}

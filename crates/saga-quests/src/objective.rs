//! Quest objectives: trackable units of progress.
//!
//! Every objective shares one small state machine and a `current/required`
//! progress pair. The [`ObjectiveKind`] decides which game events move it
//! forward. Events that do not match, or that arrive while the objective is
//! not in progress, are ignored and report `false`.

use crate::player::{Creature, CreatureType, QuestPlayer, VariantType};
use crate::world::ExploreGate;
use saga_common::AreaBounds;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle state of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectiveState {
    /// Not yet started
    #[default]
    NotStarted,
    /// Accepting progress
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished unsuccessfully
    Failed,
}

impl ObjectiveState {
    /// Whether the objective can no longer change without a reset.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// What an objective reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    /// Finish a conversation with an NPC
    TalkToNpc {
        /// NPC to talk to
        npc_id: String,
        /// Specific dialogue that must be completed, if any
        dialogue_id: Option<String>,
    },
    /// Defeat a number of creatures
    DefeatCreatures {
        /// Only this species counts, if set
        creature_id: Option<String>,
        /// Only this family counts, if set
        creature_type: Option<CreatureType>,
    },
    /// Capture a number of creatures of a variant
    CaptureVariants {
        /// Only this species counts, if set
        creature_id: Option<String>,
        /// Only this variant counts, if set
        variant: Option<VariantType>,
    },
    /// Hold a quantity of an item
    CollectItems {
        /// Item to hold
        item_id: String,
        /// Remove the items from the player on completion
        consume: bool,
    },
    /// Enter (and optionally stay in) an area
    ExploreArea {
        /// Area identifier, recorded as discovered on completion
        area_id: String,
        /// Area rectangle
        bounds: AreaBounds,
        /// Seconds the player must spend inside, if any
        min_dwell: Option<f32>,
        /// Time and weather requirements, evaluated by the manager
        gate: ExploreGate,
        /// Seconds spent inside so far
        time_in_area: f32,
    },
}

impl ObjectiveKind {
    /// Content tag of this kind.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::TalkToNpc { .. } => "TALK_TO_NPC",
            Self::DefeatCreatures { .. } => "DEFEAT_CREATURES",
            Self::CaptureVariants { .. } => "CAPTURE_VARIANTS",
            Self::CollectItems { .. } => "COLLECT_ITEMS",
            Self::ExploreArea { .. } => "EXPLORE_AREA",
        }
    }
}

/// A single trackable goal within a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    id: String,
    description: String,
    state: ObjectiveState,
    current: u32,
    required: u32,
    optional: bool,
    kind: ObjectiveKind,
}

impl Objective {
    fn with_kind(
        id: impl Into<String>,
        description: impl Into<String>,
        required: u32,
        kind: ObjectiveKind,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            state: ObjectiveState::NotStarted,
            current: 0,
            required: required.max(1),
            optional: false,
            kind,
        }
    }

    /// Creates a talk-to-NPC objective.
    #[must_use]
    pub fn talk_to_npc(
        id: impl Into<String>,
        description: impl Into<String>,
        npc_id: impl Into<String>,
        dialogue_id: Option<String>,
    ) -> Self {
        Self::with_kind(
            id,
            description,
            1,
            ObjectiveKind::TalkToNpc {
                npc_id: npc_id.into(),
                dialogue_id,
            },
        )
    }

    /// Creates a defeat-creatures objective matching any creature.
    ///
    /// Narrow it with [`Self::with_creature_id`] or [`Self::with_creature_type`].
    #[must_use]
    pub fn defeat_creatures(id: impl Into<String>, description: impl Into<String>, count: u32) -> Self {
        Self::with_kind(
            id,
            description,
            count,
            ObjectiveKind::DefeatCreatures {
                creature_id: None,
                creature_type: None,
            },
        )
    }

    /// Creates a capture-variants objective matching any creature.
    ///
    /// Narrow it with [`Self::with_creature_id`] or [`Self::with_variant`].
    #[must_use]
    pub fn capture_variants(id: impl Into<String>, description: impl Into<String>, count: u32) -> Self {
        Self::with_kind(
            id,
            description,
            count,
            ObjectiveKind::CaptureVariants {
                creature_id: None,
                variant: None,
            },
        )
    }

    /// Creates a collect-items objective.
    #[must_use]
    pub fn collect_items(
        id: impl Into<String>,
        description: impl Into<String>,
        item_id: impl Into<String>,
        quantity: u32,
        consume: bool,
    ) -> Self {
        Self::with_kind(
            id,
            description,
            quantity,
            ObjectiveKind::CollectItems {
                item_id: item_id.into(),
                consume,
            },
        )
    }

    /// Creates an explore-area objective.
    #[must_use]
    pub fn explore_area(
        id: impl Into<String>,
        description: impl Into<String>,
        area_id: impl Into<String>,
        bounds: AreaBounds,
    ) -> Self {
        Self::with_kind(
            id,
            description,
            1,
            ObjectiveKind::ExploreArea {
                area_id: area_id.into(),
                bounds,
                min_dwell: None,
                gate: ExploreGate::NONE,
                time_in_area: 0.0,
            },
        )
    }

    /// Restricts a defeat or capture objective to one species.
    #[must_use]
    pub fn with_creature_id(mut self, id: impl Into<String>) -> Self {
        match &mut self.kind {
            ObjectiveKind::DefeatCreatures { creature_id, .. }
            | ObjectiveKind::CaptureVariants { creature_id, .. } => *creature_id = Some(id.into()),
            _ => {},
        }
        self
    }

    /// Restricts a defeat objective to one creature family.
    #[must_use]
    pub fn with_creature_type(mut self, ty: CreatureType) -> Self {
        if let ObjectiveKind::DefeatCreatures { creature_type, .. } = &mut self.kind {
            *creature_type = Some(ty);
        }
        self
    }

    /// Restricts a capture objective to one variant.
    #[must_use]
    pub fn with_variant(mut self, v: VariantType) -> Self {
        if let ObjectiveKind::CaptureVariants { variant, .. } = &mut self.kind {
            *variant = Some(v);
        }
        self
    }

    /// Requires the player to stay inside an explore area for `seconds`.
    #[must_use]
    pub fn with_min_dwell(mut self, seconds: f32) -> Self {
        if let ObjectiveKind::ExploreArea { min_dwell, .. } = &mut self.kind {
            *min_dwell = (seconds > 0.0).then_some(seconds);
        }
        self
    }

    /// Gates an explore objective on time of day and/or weather.
    #[must_use]
    pub fn with_gate(mut self, new_gate: ExploreGate) -> Self {
        if let ObjectiveKind::ExploreArea { gate, .. } = &mut self.kind {
            *gate = new_gate;
        }
        self
    }

    /// Marks the objective optional.
    #[must_use]
    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Objective ID, unique within its quest.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ObjectiveState {
        self.state
    }

    /// Current progress count.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Required progress count.
    #[must_use]
    pub const fn required(&self) -> u32 {
        self.required
    }

    /// Whether the objective is optional.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Variant-specific data.
    #[must_use]
    pub const fn kind(&self) -> &ObjectiveKind {
        &self.kind
    }

    /// Whether the objective is in progress.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.state == ObjectiveState::InProgress
    }

    /// Whether the objective is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == ObjectiveState::Completed
    }

    /// Progress ratio in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        match self.state {
            ObjectiveState::Completed => 1.0,
            ObjectiveState::Failed => 0.0,
            ObjectiveState::NotStarted | ObjectiveState::InProgress => {
                (self.current as f32 / self.required as f32).clamp(0.0, 1.0)
            },
        }
    }

    /// Starts the objective. Only valid from `NotStarted`.
    pub fn start(&mut self) -> bool {
        if self.state != ObjectiveState::NotStarted {
            return false;
        }
        self.state = ObjectiveState::InProgress;
        true
    }

    /// Completes the objective. Only valid from `InProgress`.
    pub fn complete(&mut self) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        self.current = self.required;
        self.state = ObjectiveState::Completed;
        debug!("Objective '{}' completed", self.id);
        true
    }

    /// Fails the objective. Only valid from `InProgress`.
    pub fn fail(&mut self) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        self.state = ObjectiveState::Failed;
        true
    }

    /// Returns to `NotStarted` with zero progress.
    pub fn reset(&mut self) {
        self.state = ObjectiveState::NotStarted;
        self.current = 0;
        if let ObjectiveKind::ExploreArea { time_in_area, .. } = &mut self.kind {
            *time_in_area = 0.0;
        }
    }

    /// Adds progress, clamped to the requirement.
    ///
    /// Returns true if this call completed the objective.
    pub fn increment_amount(&mut self, amount: u32) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        self.current = self.current.saturating_add(amount).min(self.required);
        if self.current >= self.required {
            return self.complete();
        }
        false
    }

    /// Per-frame tick.
    ///
    /// Collect objectives re-read the held quantity. Ungated explore
    /// objectives test the player's position. Returns true on completion.
    pub fn update(&mut self, dt: f32, player: &mut dyn QuestPlayer) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        match &self.kind {
            ObjectiveKind::CollectItems { .. } => self.sync_held_items(player),
            ObjectiveKind::ExploreArea { gate, .. } if !gate.is_gated() => {
                self.advance_exploration(dt, player)
            },
            _ => false,
        }
    }

    /// NPC dialogue finished. Returns true on completion.
    pub fn on_talk(&mut self, npc: &str, dialogue: &str) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        let ObjectiveKind::TalkToNpc {
            npc_id,
            dialogue_id,
        } = &self.kind
        else {
            return false;
        };
        if npc_id != npc {
            return false;
        }
        if dialogue_id.as_deref().is_some_and(|d| d != dialogue) {
            return false;
        }
        self.complete()
    }

    /// Creature defeated. Returns true on completion.
    pub fn on_creature_defeated(&mut self, creature: &Creature) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        let ObjectiveKind::DefeatCreatures {
            creature_id,
            creature_type,
        } = &self.kind
        else {
            return false;
        };
        if creature_id.as_deref().is_some_and(|id| id != creature.id) {
            return false;
        }
        if creature_type.is_some_and(|t| t != creature.creature_type) {
            return false;
        }
        self.increment_amount(1)
    }

    /// Creature captured. Returns true on completion.
    pub fn on_creature_captured(&mut self, creature: &Creature) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        let ObjectiveKind::CaptureVariants {
            creature_id,
            variant,
        } = &self.kind
        else {
            return false;
        };
        if creature_id.as_deref().is_some_and(|id| id != creature.id) {
            return false;
        }
        if variant.is_some_and(|v| v != creature.variant) {
            return false;
        }
        self.increment_amount(1)
    }

    /// An item entered the player's inventory. Returns true on completion.
    pub fn on_item_added(&mut self, item: &str, player: &mut dyn QuestPlayer) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        match &self.kind {
            ObjectiveKind::CollectItems { item_id, .. } if item_id == item => {
                self.sync_held_items(player)
            },
            _ => false,
        }
    }

    /// Time and weather requirements of a gated explore objective.
    ///
    /// `None` for every other objective, including ungated explore ones.
    #[must_use]
    pub fn exploration_gate(&self) -> Option<&ExploreGate> {
        match &self.kind {
            ObjectiveKind::ExploreArea { gate, .. } if gate.is_gated() => Some(gate),
            _ => None,
        }
    }

    /// Tests the player's position against the target area and accumulates
    /// dwell time. Returns true on completion.
    pub fn advance_exploration(&mut self, dt: f32, player: &mut dyn QuestPlayer) -> bool {
        if self.state != ObjectiveState::InProgress {
            return false;
        }
        let ObjectiveKind::ExploreArea {
            area_id,
            bounds,
            min_dwell,
            time_in_area,
            ..
        } = &mut self.kind
        else {
            return false;
        };
        if !bounds.contains(player.position()) {
            return false;
        }
        if let Some(needed) = *min_dwell {
            *time_in_area += dt;
            if *time_in_area < needed {
                return false;
            }
        }
        let area = area_id.clone();
        let completed = self.complete();
        if completed {
            player.add_discovered_area(&area);
        }
        completed
    }

    /// Seconds spent inside the target area, for explore objectives.
    #[must_use]
    pub fn time_in_area(&self) -> Option<f32> {
        match &self.kind {
            ObjectiveKind::ExploreArea { time_in_area, .. } => Some(*time_in_area),
            _ => None,
        }
    }

    /// Overwrites mutable progress from saved data.
    pub fn restore(&mut self, state: ObjectiveState, current: u32, required: u32, dwell: Option<f32>) {
        self.required = required.max(1);
        self.current = current.min(self.required);
        self.state = state;
        if state == ObjectiveState::Completed {
            self.current = self.required;
        }
        if let (ObjectiveKind::ExploreArea { time_in_area, .. }, Some(saved)) = (&mut self.kind, dwell) {
            *time_in_area = saved;
        }
    }

    fn sync_held_items(&mut self, player: &mut dyn QuestPlayer) -> bool {
        let ObjectiveKind::CollectItems { item_id, consume } = &self.kind else {
            return false;
        };
        let held = player.item_count(item_id);
        self.current = held.min(self.required);
        if self.current < self.required {
            return false;
        }
        if *consume && !player.remove_item(item_id, self.required) {
            return false;
        }
        self.complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerState;
    use crate::world::{DayPhase, Weather};
    use proptest::prelude::*;
    use saga_common::Position;

    fn started(mut objective: Objective) -> Objective {
        assert!(objective.start());
        objective
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut obj = Objective::defeat_creatures("o1", "Defeat", 3);
        assert!(!obj.complete());
        assert!(!obj.fail());
        assert!(obj.start());
        assert!(!obj.start());
        assert!(obj.fail());
        assert_eq!(obj.state(), ObjectiveState::Failed);
        assert!(!obj.complete());

        obj.reset();
        assert_eq!(obj.state(), ObjectiveState::NotStarted);
        assert_eq!(obj.current(), 0);
    }

    #[test]
    fn test_increment_clamps_and_completes() {
        let mut obj = started(Objective::defeat_creatures("o1", "Defeat", 3));
        assert!(!obj.increment_amount(2));
        assert_eq!(obj.current(), 2);
        assert!(obj.increment_amount(5));
        assert_eq!(obj.current(), 3);
        assert!(obj.is_completed());
        assert!(!obj.increment_amount(1));
    }

    #[test]
    fn test_progress_by_state() {
        let mut obj = started(Objective::defeat_creatures("o1", "Defeat", 4));
        obj.increment_amount(1);
        assert!((obj.progress() - 0.25).abs() < f32::EPSILON);
        obj.fail();
        assert_eq!(obj.progress(), 0.0);

        let mut done = started(Objective::defeat_creatures("o2", "Defeat", 4));
        done.complete();
        assert_eq!(done.progress(), 1.0);
        assert_eq!(done.current(), 4);
    }

    #[test]
    fn test_zero_requirement_is_raised_to_one() {
        let obj = Objective::defeat_creatures("o1", "Defeat", 0);
        assert_eq!(obj.required(), 1);
    }

    #[test]
    fn test_talk_matches_npc_and_dialogue() {
        let mut obj = started(Objective::talk_to_npc(
            "t",
            "Talk",
            "elder",
            Some("greeting".to_string()),
        ));
        assert!(!obj.on_talk("smith", "greeting"));
        assert!(!obj.on_talk("elder", "farewell"));
        assert!(obj.on_talk("elder", "greeting"));
        assert!(obj.is_completed());
    }

    #[test]
    fn test_talk_without_dialogue_requirement() {
        let mut obj = started(Objective::talk_to_npc("t", "Talk", "elder", None));
        assert!(obj.on_talk("elder", "anything"));
    }

    #[test]
    fn test_talk_ignored_when_not_started() {
        let mut obj = Objective::talk_to_npc("t", "Talk", "elder", None);
        assert!(!obj.on_talk("elder", "anything"));
        assert_eq!(obj.state(), ObjectiveState::NotStarted);
    }

    #[test]
    fn test_defeat_filters() {
        let mut obj = started(
            Objective::defeat_creatures("d", "Defeat", 2).with_creature_type(CreatureType::Undead),
        );
        let wolf = Creature::new("wolf", "Wolf", CreatureType::Beast);
        let ghoul = Creature::new("ghoul", "Ghoul", CreatureType::Undead);

        assert!(!obj.on_creature_defeated(&wolf));
        assert_eq!(obj.current(), 0);
        assert!(!obj.on_creature_defeated(&ghoul));
        assert!(obj.on_creature_defeated(&ghoul));
    }

    #[test]
    fn test_defeat_by_species() {
        let mut obj = started(Objective::defeat_creatures("d", "Defeat", 1).with_creature_id("ghoul"));
        assert!(!obj.on_creature_defeated(&Creature::new("zombie", "Zombie", CreatureType::Undead)));
        assert!(obj.on_creature_defeated(&Creature::new("ghoul", "Ghoul", CreatureType::Undead)));
    }

    #[test]
    fn test_capture_filters_variant() {
        let mut obj = started(
            Objective::capture_variants("c", "Capture", 1).with_variant(VariantType::Shiny),
        );
        let plain = Creature::new("fox", "Fox", CreatureType::Beast);
        let shiny = plain.clone().with_variant(VariantType::Shiny);

        assert!(!obj.on_creature_captured(&plain));
        assert!(!obj.on_creature_defeated(&shiny));
        assert!(obj.on_creature_captured(&shiny));
    }

    #[test]
    fn test_collect_reads_held_quantity() {
        let mut player = PlayerState::new(1);
        let mut obj = started(Objective::collect_items("c", "Collect", "herb", 3, false));

        player.add_item("herb", 2);
        assert!(!obj.update(0.1, &mut player));
        assert_eq!(obj.current(), 2);

        player.remove_item("herb", 1);
        assert!(!obj.update(0.1, &mut player));
        assert_eq!(obj.current(), 1);

        player.add_item("herb", 5);
        assert!(obj.on_item_added("herb", &mut player));
        assert_eq!(player.item_count("herb"), 6);
    }

    #[test]
    fn test_collect_consumes_on_completion() {
        let mut player = PlayerState::new(1);
        player.add_item("ore", 5);
        let mut obj = started(Objective::collect_items("c", "Collect", "ore", 3, true));

        assert!(obj.update(0.0, &mut player));
        assert_eq!(player.item_count("ore"), 2);
    }

    #[test]
    fn test_collect_ignores_other_items() {
        let mut player = PlayerState::new(1);
        player.add_item("ore", 5);
        let mut obj = started(Objective::collect_items("c", "Collect", "ore", 3, false));
        assert!(!obj.on_item_added("herb", &mut player));
        assert_eq!(obj.current(), 0);
    }

    #[test]
    fn test_explore_immediate_entry() {
        let mut player = PlayerState::new(1);
        let mut obj = started(Objective::explore_area(
            "e",
            "Explore",
            "grove",
            AreaBounds::new(0.0, 0.0, 10.0, 10.0),
        ));

        player.set_position(Position::new(20.0, 20.0));
        assert!(!obj.update(1.0, &mut player));

        player.set_position(Position::new(5.0, 5.0));
        assert!(obj.update(1.0, &mut player));
        assert!(player.has_discovered_area("grove"));
    }

    #[test]
    fn test_explore_dwell_time() {
        let mut player = PlayerState::new(1);
        player.set_position(Position::new(5.0, 5.0));
        let mut obj = started(
            Objective::explore_area("e", "Explore", "grove", AreaBounds::new(0.0, 0.0, 10.0, 10.0))
                .with_min_dwell(3.0),
        );

        assert!(!obj.update(1.0, &mut player));
        assert!(!obj.update(1.5, &mut player));
        assert_eq!(obj.time_in_area(), Some(2.5));
        assert!(obj.update(0.5, &mut player));
    }

    #[test]
    fn test_gated_explore_skips_plain_update() {
        let mut player = PlayerState::new(1);
        player.set_position(Position::new(5.0, 5.0));
        let gate = ExploreGate {
            phase: Some(DayPhase::Night),
            weather: Some(Weather::Fog),
        };
        let mut obj = started(
            Objective::explore_area("e", "Explore", "marsh", AreaBounds::new(0.0, 0.0, 10.0, 10.0))
                .with_gate(gate),
        );

        assert_eq!(obj.exploration_gate(), Some(&gate));
        assert!(!obj.update(1.0, &mut player));
        assert!(obj.advance_exploration(1.0, &mut player));
    }

    #[test]
    fn test_restore_keeps_invariants() {
        let mut obj = Objective::defeat_creatures("d", "Defeat", 5);
        obj.restore(ObjectiveState::InProgress, 9, 5, None);
        assert_eq!(obj.current(), 5);

        obj.restore(ObjectiveState::Completed, 1, 5, None);
        assert_eq!(obj.current(), 5);
    }

    proptest! {
        #[test]
        fn progress_stays_in_unit_range(required in 1u32..50, steps in proptest::collection::vec(0u32..20, 0..10)) {
            let mut obj = Objective::defeat_creatures("p", "Prop", required);
            obj.start();
            for step in steps {
                obj.increment_amount(step);
                prop_assert!(obj.current() <= obj.required());
                let p = obj.progress();
                prop_assert!((0.0..=1.0).contains(&p));
                prop_assert_eq!(p == 1.0, obj.is_completed());
            }
        }
    }
}

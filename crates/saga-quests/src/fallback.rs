//! Built-in quests installed when no content source could be loaded.

use crate::objective::Objective;
use crate::player::{CreatureType, VariantType};
use crate::quest::{Quest, QuestDialogue};
use crate::reward::QuestReward;
use crate::world::{DayPhase, ExploreGate};
use saga_common::AreaBounds;

/// ID of the first fallback quest.
pub const FIRST_STEPS: &str = "fallback_first_steps";

/// Hand-authored example quests forming a short chain.
#[must_use]
pub fn fallback_quests() -> Vec<Quest> {
    vec![
        Quest::new(
            FIRST_STEPS,
            "First Steps",
            "Speak with the village elder about the trouble in the woods.",
        )
        .main_quest(true)
        .with_objective(Objective::talk_to_npc(
            "talk_elder",
            "Talk to the village elder",
            "village_elder",
            None,
        ))
        .with_reward(QuestReward::experience(50))
        .with_unlock("fallback_wolf_hunt")
        .with_unlock("fallback_herbalist")
        .with_dialogue(QuestDialogue {
            start: "The woods have grown restless. Come see me.".to_string(),
            end: "Good, you came. Listen closely.".to_string(),
            fail: String::new(),
        }),
        Quest::new(
            "fallback_wolf_hunt",
            "Wolves at the Gate",
            "Drive back the wolves that prowl the village edge.",
        )
        .main_quest(true)
        .with_prerequisite(FIRST_STEPS)
        .with_objective(
            Objective::defeat_creatures("defeat_wolves", "Defeat 3 wolves", 3)
                .with_creature_id("forest_wolf"),
        )
        .with_reward(QuestReward::experience(150))
        .with_reward(QuestReward::money(40))
        .with_unlock("fallback_night_marsh"),
        Quest::new(
            "fallback_herbalist",
            "The Herbalist's Request",
            "Gather healing herbs for the village herbalist.",
        )
        .with_prerequisite(FIRST_STEPS)
        .with_objective(Objective::collect_items(
            "collect_herbs",
            "Collect 5 healing herbs",
            "healing_herb",
            5,
            true,
        ))
        .with_objective(
            Objective::capture_variants("capture_shiny", "Capture a shiny creature", 1)
                .with_variant(VariantType::Shiny)
                .optional(true),
        )
        .with_reward(QuestReward::item("health_potion", "Health Potion", 3))
        .with_reward(QuestReward::reputation("villagers", 10)),
        Quest::new(
            "fallback_night_marsh",
            "Lights in the Marsh",
            "Investigate the marsh after dark and deal with what you find.",
        )
        .main_quest(true)
        .with_min_level(3)
        .with_prerequisite("fallback_wolf_hunt")
        .with_objective(
            Objective::explore_area(
                "explore_marsh",
                "Search the marsh at night",
                "whispering_marsh",
                AreaBounds::new(400.0, 200.0, 120.0, 80.0),
            )
            .with_min_dwell(5.0)
            .with_gate(ExploreGate {
                phase: Some(DayPhase::Night),
                weather: None,
            }),
        )
        .with_objective(
            Objective::defeat_creatures("banish_spirits", "Banish 2 marsh spirits", 2)
                .with_creature_type(CreatureType::Spirit),
        )
        .with_reward(QuestReward::experience(300))
        .with_time_limit(600.0),
    ]
}

//! # Saga Quests
//!
//! Quest and story progression for Saga.
//!
//! This crate provides:
//! - Objectives (talk, explore, defeat, collect, capture) and rewards
//! - Quests with a lifecycle state machine and optional time limits
//! - The quest manager, which partitions quests and routes game events
//! - Story chapters and decision points with typed consequences
//! - Content loading from JSON/RON with a built-in fallback set
//! - Save records, migration, and save slot stores
//! - Quest event sinks for UI and logging

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod content;
pub mod events;
pub mod fallback;
pub mod loader;
pub mod manager;
pub mod objective;
pub mod player;
pub mod quest;
pub mod reward;
pub mod save;
pub mod story;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::content::*;
    pub use crate::events::*;
    pub use crate::fallback::*;
    pub use crate::loader::*;
    pub use crate::manager::*;
    pub use crate::objective::*;
    pub use crate::player::*;
    pub use crate::quest::*;
    pub use crate::reward::*;
    pub use crate::save::*;
    pub use crate::story::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_round_trip_through_memory_store() {
        let mut quests = QuestManager::new();
        quests.install_fallback();
        let mut story = StoryProgressionManager::default();
        let mut player = PlayerState::new(1);

        quests.start_quest(FIRST_STEPS, &player).expect("start");
        quests.on_talk_to_npc("village_elder", "greeting");
        quests.update(0.1, &mut player, &WorldConditions::default());
        assert!(quests.is_completed(FIRST_STEPS));
        assert!(quests.is_active("fallback_wolf_hunt"));
        assert!(quests.is_active("fallback_herbalist"));

        let store = MemorySaveStore::new();
        SessionSave::new(quests.save(), story.save())
            .write_to(&store, "auto")
            .expect("write");

        let session = SessionSave::read_from(&store, "auto").expect("read");
        let mut restored = QuestManager::new();
        restored.install_fallback();
        restored.load(&session.quests);
        story.load(&session.story);

        for location in QuestLocation::ALL {
            assert_eq!(restored.quest_ids(location), quests.quest_ids(location));
        }
        assert!(restored
            .get_quest(FIRST_STEPS)
            .is_some_and(Quest::are_all_objectives_completed));
    }
}

//! Quest rewards.

use crate::player::{Creature, QuestPlayer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a reward pays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    /// Experience points
    Experience(u32),
    /// Currency
    Money(u32),
    /// Inventory item
    Item {
        /// Item ID
        id: String,
        /// Display name
        name: String,
        /// Quantity granted
        quantity: u32,
    },
    /// A captured creature joins the player
    Creature(Creature),
    /// Faction standing change
    Reputation {
        /// Faction name
        faction: String,
        /// Reputation change (can be negative)
        amount: i32,
    },
}

/// An immutable payout granted when a quest completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestReward {
    kind: RewardKind,
    description: String,
}

impl QuestReward {
    fn from_kind(kind: RewardKind) -> Self {
        let description = describe(&kind);
        Self { kind, description }
    }

    /// Creates an experience reward.
    #[must_use]
    pub fn experience(amount: u32) -> Self {
        Self::from_kind(RewardKind::Experience(amount))
    }

    /// Creates a currency reward.
    #[must_use]
    pub fn money(amount: u32) -> Self {
        Self::from_kind(RewardKind::Money(amount))
    }

    /// Creates an item reward.
    #[must_use]
    pub fn item(id: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self::from_kind(RewardKind::Item {
            id: id.into(),
            name: name.into(),
            quantity,
        })
    }

    /// Creates a creature reward.
    #[must_use]
    pub fn creature(creature: Creature) -> Self {
        Self::from_kind(RewardKind::Creature(creature))
    }

    /// Creates a reputation reward.
    #[must_use]
    pub fn reputation(faction: impl Into<String>, amount: i32) -> Self {
        Self::from_kind(RewardKind::Reputation {
            faction: faction.into(),
            amount,
        })
    }

    /// What the reward pays out.
    #[must_use]
    pub const fn kind(&self) -> &RewardKind {
        &self.kind
    }

    /// Display text, computed at construction.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Pays the reward out to the player.
    ///
    /// The caller guarantees this runs once per quest completion.
    pub fn apply(&self, player: &mut dyn QuestPlayer) {
        debug!("Applying reward: {}", self.description);
        match &self.kind {
            RewardKind::Experience(amount) => player.add_experience(*amount),
            RewardKind::Money(amount) => player.add_money(*amount),
            RewardKind::Item { id, quantity, .. } => player.add_item(id, *quantity),
            RewardKind::Creature(creature) => player.add_captured_creature(creature.clone()),
            RewardKind::Reputation { faction, amount } => player.adjust_reputation(faction, *amount),
        }
    }
}

fn describe(kind: &RewardKind) -> String {
    match kind {
        RewardKind::Experience(amount) => format!("{amount} XP"),
        RewardKind::Money(amount) => format!("{amount} gold"),
        RewardKind::Item { name, quantity, .. } => {
            if *quantity == 1 {
                name.clone()
            } else {
                format!("{quantity}x {name}")
            }
        },
        RewardKind::Creature(creature) => format!("Creature: {}", creature.name),
        RewardKind::Reputation { faction, amount } => {
            format!("{amount:+} reputation with {faction}")
        },
    }
}

//! Player-facing collaborator contract and creature descriptors.
//!
//! The quest systems never own the player. Every operation that needs to
//! read or change player state receives a `QuestPlayer` from the caller.

use saga_common::Position;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Broad family a creature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureType {
    /// Animals and monsters of the wild
    Beast,
    /// Walking dead
    Undead,
    /// Fire, water, earth, and air spirits
    Elemental,
    /// Bandits, soldiers, cultists
    Humanoid,
    /// Winged reptiles
    Dragon,
    /// Golems and automata
    Construct,
    /// Giant insects
    Insect,
    /// Ghosts and fey
    Spirit,
}

impl CreatureType {
    /// All creature types in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Beast,
        Self::Undead,
        Self::Elemental,
        Self::Humanoid,
        Self::Dragon,
        Self::Construct,
        Self::Insect,
        Self::Spirit,
    ];

    /// Returns the content tag for this type.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Beast => "BEAST",
            Self::Undead => "UNDEAD",
            Self::Elemental => "ELEMENTAL",
            Self::Humanoid => "HUMANOID",
            Self::Dragon => "DRAGON",
            Self::Construct => "CONSTRUCT",
            Self::Insect => "INSECT",
            Self::Spirit => "SPIRIT",
        }
    }
}

impl fmt::Display for CreatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CreatureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.tag() == upper)
            .ok_or_else(|| format!("unknown creature type '{s}'"))
    }
}

/// Rarity variant of a creature, the target of capture objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VariantType {
    /// Ordinary specimen
    #[default]
    Normal,
    /// Alternate coloring
    Shiny,
    /// Stronger, larger specimen
    Alpha,
    /// Tainted by dark magic
    Corrupted,
    /// Extremely rare, old bloodline
    Ancient,
}

impl VariantType {
    /// All variant types in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Shiny,
        Self::Alpha,
        Self::Corrupted,
        Self::Ancient,
    ];

    /// Returns the content tag for this variant.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Shiny => "SHINY",
            Self::Alpha => "ALPHA",
            Self::Corrupted => "CORRUPTED",
            Self::Ancient => "ANCIENT",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for VariantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.tag() == upper)
            .ok_or_else(|| format!("unknown variant type '{s}'"))
    }
}

/// A creature instance as reported by combat and capture events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Creature {
    /// Species identifier (e.g. "forest_wolf")
    pub id: String,
    /// Display name
    pub name: String,
    /// Creature family
    pub creature_type: CreatureType,
    /// Rarity variant
    pub variant: VariantType,
    /// Creature level
    pub level: u32,
}

impl Creature {
    /// Creates a normal-variant creature.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, creature_type: CreatureType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            creature_type,
            variant: VariantType::Normal,
            level: 1,
        }
    }

    /// Sets the variant.
    #[must_use]
    pub const fn with_variant(mut self, variant: VariantType) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the level.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// Everything the quest systems need from the player.
pub trait QuestPlayer {
    /// Current character level.
    fn level(&self) -> u32;

    /// Grants experience points.
    fn add_experience(&mut self, amount: u32);

    /// Grants currency.
    fn add_money(&mut self, amount: u32);

    /// Adds items to the inventory.
    fn add_item(&mut self, item_id: &str, quantity: u32);

    /// Removes items from the inventory. Returns false when not enough are held.
    fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool;

    /// Quantity of an item currently held.
    fn item_count(&self, item_id: &str) -> u32;

    /// Whether the player belongs to a faction.
    fn is_faction_member(&self, faction: &str) -> bool;

    /// Current reputation with a faction.
    fn reputation(&self, faction: &str) -> i32;

    /// Adjusts reputation with a faction by a signed delta.
    fn adjust_reputation(&mut self, faction: &str, delta: i32);

    /// Creatures captured so far.
    fn captured_creatures(&self) -> &[Creature];

    /// Records a captured creature.
    fn add_captured_creature(&mut self, creature: Creature);

    /// Records an area as discovered.
    fn add_discovered_area(&mut self, area_id: &str);

    /// Whether an area has been discovered.
    fn has_discovered_area(&self, area_id: &str) -> bool;

    /// Current world position.
    fn position(&self) -> Position;
}

/// Plain in-memory player used by tools and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Character level
    pub level: u32,
    /// Accumulated experience
    pub experience: u64,
    /// Currency held
    pub money: u64,
    /// Items by ID
    pub items: HashMap<String, u32>,
    /// Faction memberships
    pub factions: HashSet<String>,
    /// Reputation per faction
    pub reputation: HashMap<String, i32>,
    /// Captured creatures
    pub captured: Vec<Creature>,
    /// Discovered area IDs
    pub discovered_areas: HashSet<String>,
    /// World position
    pub position: Position,
}

impl PlayerState {
    /// Creates a player at the given level.
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Adds a faction membership.
    #[must_use]
    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.factions.insert(faction.into());
        self
    }

    /// Moves the player.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl QuestPlayer for PlayerState {
    fn level(&self) -> u32 {
        self.level
    }

    fn add_experience(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(u64::from(amount));
    }

    fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(u64::from(amount));
    }

    fn add_item(&mut self, item_id: &str, quantity: u32) {
        let count = self.items.entry(item_id.to_string()).or_insert(0);
        *count = count.saturating_add(quantity);
    }

    fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        let current = self.item_count(item_id);
        if current < quantity {
            return false;
        }
        if current == quantity {
            self.items.remove(item_id);
        } else {
            self.items.insert(item_id.to_string(), current - quantity);
        }
        true
    }

    fn item_count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    fn is_faction_member(&self, faction: &str) -> bool {
        self.factions.contains(faction)
    }

    fn reputation(&self, faction: &str) -> i32 {
        self.reputation.get(faction).copied().unwrap_or(0)
    }

    fn adjust_reputation(&mut self, faction: &str, delta: i32) {
        let value = self.reputation.entry(faction.to_string()).or_insert(0);
        *value = value.saturating_add(delta);
    }

    fn captured_creatures(&self) -> &[Creature] {
        &self.captured
    }

    fn add_captured_creature(&mut self, creature: Creature) {
        self.captured.push(creature);
    }

    fn add_discovered_area(&mut self, area_id: &str) {
        self.discovered_areas.insert(area_id.to_string());
    }

    fn has_discovered_area(&self, area_id: &str) -> bool {
        self.discovered_areas.contains(area_id)
    }

    fn position(&self) -> Position {
        self.position
    }
}

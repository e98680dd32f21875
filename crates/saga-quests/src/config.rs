//! Content and save locations.
//!
//! Configuration is loaded from a TOML file. Missing or invalid files fall
//! back to defaults so a fresh checkout always starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "saga.toml";

const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_GENERAL: &str = "quests.json";
const DEFAULT_MAIN_STORY: &str = "main_story.json";
const DEFAULT_SIDE: &str = "side_quests.json";
const DEFAULT_FACTION_DIR: &str = "factions";
const DEFAULT_STORY: &str = "story.json";
const DEFAULT_SAVE_DIR: &str = "saves";

/// Where quest content, story content, and saves live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SagaConfig {
    /// Root directory of all authored content
    pub content_dir: PathBuf,
    /// General quest file, relative to the content directory
    pub general_quests: String,
    /// Main story quest file
    pub main_story_quests: String,
    /// Side quest file
    pub side_quests: String,
    /// Directory of per-faction quest files
    pub faction_dir: String,
    /// Story chapter and decision point file
    pub story_file: String,
    /// Directory holding one file per save slot
    pub save_dir: PathBuf,
    /// Install the built-in quests when no content source loads
    pub allow_fallback: bool,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            general_quests: DEFAULT_GENERAL.to_string(),
            main_story_quests: DEFAULT_MAIN_STORY.to_string(),
            side_quests: DEFAULT_SIDE.to_string(),
            faction_dir: DEFAULT_FACTION_DIR.to_string(),
            story_file: DEFAULT_STORY.to_string(),
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            allow_fallback: true,
        }
    }
}

impl SagaConfig {
    /// Creates a default configuration rooted at a content directory.
    #[must_use]
    pub fn with_content_dir(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replaces blank names with their defaults.
    pub fn validate(&mut self) {
        fn fill(value: &mut String, default: &str) {
            if value.trim().is_empty() {
                *value = default.to_string();
            }
        }
        fill(&mut self.general_quests, DEFAULT_GENERAL);
        fill(&mut self.main_story_quests, DEFAULT_MAIN_STORY);
        fill(&mut self.side_quests, DEFAULT_SIDE);
        fill(&mut self.faction_dir, DEFAULT_FACTION_DIR);
        fill(&mut self.story_file, DEFAULT_STORY);
        if self.content_dir.as_os_str().is_empty() {
            self.content_dir = PathBuf::from(DEFAULT_CONTENT_DIR);
        }
        if self.save_dir.as_os_str().is_empty() {
            self.save_dir = PathBuf::from(DEFAULT_SAVE_DIR);
        }
    }

    /// Path of the general quest file.
    #[must_use]
    pub fn general_path(&self) -> PathBuf {
        self.content_dir.join(&self.general_quests)
    }

    /// Path of the main story quest file.
    #[must_use]
    pub fn main_story_path(&self) -> PathBuf {
        self.content_dir.join(&self.main_story_quests)
    }

    /// Path of the side quest file.
    #[must_use]
    pub fn side_path(&self) -> PathBuf {
        self.content_dir.join(&self.side_quests)
    }

    /// Path of the faction quest directory.
    #[must_use]
    pub fn faction_path(&self) -> PathBuf {
        self.content_dir.join(&self.faction_dir)
    }

    /// Path of the story content file.
    #[must_use]
    pub fn story_path(&self) -> PathBuf {
        self.content_dir.join(&self.story_file)
    }
}

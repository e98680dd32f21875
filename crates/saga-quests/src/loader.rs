//! Quest content loading from the four configured sources.
//!
//! Each source is loaded independently: a missing or malformed source is
//! logged and skipped, never aborting the others.

use crate::config::SagaConfig;
use crate::content::{check_version, parse_document, ContentError, ContentResult, QuestFile};
use crate::quest::Quest;
use saga_common::SchemaVersion;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One of the independent quest content sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestSource {
    /// General quests
    General,
    /// Main story quests, always flagged as main quests
    MainStory,
    /// Side quests
    Side,
    /// One file per faction, quests default to that faction
    Faction,
}

impl QuestSource {
    /// All sources in load order.
    pub const ALL: [Self; 4] = [Self::General, Self::MainStory, Self::Side, Self::Faction];
}

impl fmt::Display for QuestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::General => "general",
            Self::MainStory => "main story",
            Self::Side => "side",
            Self::Faction => "faction",
        };
        f.write_str(name)
    }
}

/// Statistics for the quest loader.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuestLoaderStats {
    /// Sources that loaded without error.
    pub sources_loaded: u32,
    /// Sources that failed as a whole.
    pub sources_failed: u32,
    /// Number of files loaded.
    pub files_loaded: u32,
    /// Number of quests loaded.
    pub quests_loaded: u32,
    /// Quests rejected by validation or as duplicates.
    pub validation_errors: u32,
}

/// Reads quest files named by a [`SagaConfig`].
#[derive(Debug)]
pub struct QuestLoader {
    config: SagaConfig,
    seen: HashSet<String>,
    stats: QuestLoaderStats,
}

impl QuestLoader {
    /// Creates a loader for the given configuration.
    #[must_use]
    pub fn new(config: &SagaConfig) -> Self {
        info!("Initializing quest loader at: {:?}", config.content_dir);
        Self {
            config: config.clone(),
            seen: HashSet::new(),
            stats: QuestLoaderStats::default(),
        }
    }

    /// Returns loader statistics.
    #[must_use]
    pub const fn stats(&self) -> &QuestLoaderStats {
        &self.stats
    }

    /// Loads every source, skipping the ones that fail.
    pub fn load_all(&mut self) -> Vec<Quest> {
        let mut quests = Vec::new();
        for source in QuestSource::ALL {
            match self.load_source(source) {
                Ok(mut loaded) => {
                    self.stats.sources_loaded += 1;
                    debug!("Loaded {} quests from {} source", loaded.len(), source);
                    quests.append(&mut loaded);
                },
                Err(e) => {
                    warn!("Failed to load {} quest source: {}", source, e);
                    self.stats.sources_failed += 1;
                },
            }
        }

        info!(
            "Loaded {} quests from {} files ({} sources failed)",
            self.stats.quests_loaded, self.stats.files_loaded, self.stats.sources_failed
        );
        quests
    }

    /// Loads a single source.
    pub fn load_source(&mut self, source: QuestSource) -> ContentResult<Vec<Quest>> {
        match source {
            QuestSource::General => self.load_file(&self.config.general_path(), false, None),
            QuestSource::MainStory => self.load_file(&self.config.main_story_path(), true, None),
            QuestSource::Side => self.load_file(&self.config.side_path(), false, None),
            QuestSource::Faction => self.load_faction_dir(&self.config.faction_path()),
        }
    }

    fn load_faction_dir(&mut self, dir: &Path) -> ContentResult<Vec<Quest>> {
        if !dir.is_dir() {
            return Err(ContentError::NotFound(dir.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json" || ext == "ron"))
            .collect();
        paths.sort();

        let mut quests = Vec::new();
        for path in paths {
            let faction = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
            match self.load_file(&path, false, faction.as_deref()) {
                Ok(mut loaded) => quests.append(&mut loaded),
                Err(e) => {
                    warn!("Failed to load faction quest file {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                },
            }
        }
        Ok(quests)
    }

    /// Loads quests from a single file.
    ///
    /// `main_story` forces the main-quest flag. `faction` fills in the
    /// faction of quests that do not name one.
    pub fn load_file(
        &mut self,
        path: &Path,
        main_story: bool,
        faction: Option<&str>,
    ) -> ContentResult<Vec<Quest>> {
        debug!("Loading quest file: {:?}", path);
        if !path.exists() {
            return Err(ContentError::NotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path)?;
        let file: QuestFile = parse_document(path, &text)?;
        check_version(&file.version, SchemaVersion::QUEST_CONTENT)?;

        let mut quests = Vec::new();
        for mut definition in file.quests {
            if self.seen.contains(&definition.id) {
                warn!("Duplicate quest ID '{}' in {:?}, skipping", definition.id, path);
                self.stats.validation_errors += 1;
                continue;
            }
            if main_story {
                definition.main_quest = true;
            }
            if definition.faction.is_none() {
                definition.faction = faction.map(str::to_string);
            }
            match definition.build() {
                Ok(quest) => {
                    self.seen.insert(definition.id);
                    quests.push(quest);
                },
                Err(e) => {
                    warn!("Invalid quest in {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                },
            }
        }

        self.stats.files_loaded += 1;
        self.stats.quests_loaded += quests.len() as u32;
        debug!("Loaded {} quests from {:?}", quests.len(), path);
        Ok(quests)
    }
}

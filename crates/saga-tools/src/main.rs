//! # Saga
//!
//! Command line tool for quest content authors.
//!
//! Commands:
//! - `init` - write a default `saga.toml`
//! - `validate` - load every content source and report broken references
//! - `status [--slot <name>]` - print quest partitions, optionally from a save
//! - `slots` - list save slots

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use saga_quests::config::CONFIG_FILE;
use saga_quests::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "saga")]
#[command(about = "Validate and inspect Saga quest content and saves")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Load every content source and report problems
    Validate,
    /// Print quest partitions
    Status {
        /// Save slot to restore first
        #[arg(short, long)]
        slot: Option<String>,
    },
    /// List save slots
    Slots,
}

fn init_logging(verbose: u8) -> Result<()> {
    let directive = match verbose {
        0 => "saga=info",
        1 => "saga=debug",
        _ => "saga=trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if matches!(cli.command, Commands::Init) {
        if cli.config.exists() {
            bail!("{} already exists", cli.config.display());
        }
        SagaConfig::default()
            .save_to(&cli.config)
            .with_context(|| format!("writing {}", cli.config.display()))?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }

    let mut config = SagaConfig::load_from(&cli.config);
    config.validate();

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Validate => validate(&config),
        Commands::Status { slot } => status(&config, slot.as_deref()),
        Commands::Slots => {
            let store = FileSaveStore::new(&config.save_dir);
            for slot in store.list_slots()? {
                println!("{slot}");
            }
            Ok(())
        },
    }
}

fn validate(config: &SagaConfig) -> Result<()> {
    let mut loader = QuestLoader::new(config);
    let quests = loader.load_all();
    let stats = loader.stats().clone();
    println!(
        "Quests: {} loaded from {} files ({} sources ok, {} failed, {} rejected)",
        stats.quests_loaded,
        stats.files_loaded,
        stats.sources_loaded,
        stats.sources_failed,
        stats.validation_errors
    );

    let mut problems = report::dangling_links(&quests);
    match StoryContent::load(&config.story_path()) {
        Ok(story) => {
            println!(
                "Story: {} chapters, {} decision points",
                story.chapters.len(),
                story.decision_points.len()
            );
            problems.extend(report::story_problems(&story, &quests));
        },
        Err(e) => warn!("Story content not checked: {}", e),
    }

    for problem in &problems {
        println!("  - {problem}");
    }
    if stats.validation_errors > 0 || !problems.is_empty() {
        bail!(
            "{} rejected quests, {} broken references",
            stats.validation_errors,
            problems.len()
        );
    }
    info!("Content is valid");
    Ok(())
}

fn status(config: &SagaConfig, slot: Option<&str>) -> Result<()> {
    let mut quests = QuestManager::new();
    quests.load_quests(config);
    let mut story = StoryProgressionManager::from_config(config);

    if let Some(slot) = slot {
        let store = FileSaveStore::new(&config.save_dir);
        let session = SessionSave::read_from(&store, slot)
            .with_context(|| format!("reading save slot '{slot}'"))?;
        quests.load(&session.quests);
        story.load(&session.story);
        println!("Restored slot '{}' saved at {}", slot, session.saved_at);
    }

    print!("{}", report::partition_summary(&quests));
    if let Some(chapter) = story.current_chapter() {
        println!("Chapter {}: {}", story.current_chapter_index() + 1, chapter.title);
        for decision in story.undecided_decision_points() {
            println!("  pending decision: {}", decision.title);
        }
    }
    Ok(())
}

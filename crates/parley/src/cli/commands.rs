//! CLI argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Parley - talk to language-model villagers from a terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Drive the NPC chat extension from a console session", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Local override file layered over the engine settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON file standing in for the engine's mod config
    #[arg(long)]
    pub mod_config: Option<PathBuf>,

    /// Mod id to resolve settings for
    #[arg(long, default_value = parley::DEFAULT_MOD_ID)]
    pub mod_id: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

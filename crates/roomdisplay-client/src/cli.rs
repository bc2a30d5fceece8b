//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

/// roomdisplay - Who has the room, and until when
#[derive(Debug, Parser)]
#[command(name = "roomdisplay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ROOMDISPLAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub status: StatusArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by one-shot status and the watch loop.
#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// iCal feed URL (overrides [feed] url)
    #[arg(long, global = true, conflicts_with = "file")]
    pub url: Option<String>,

    /// Read the feed from a local .ics file instead of fetching it
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Name shown in the header (overrides [display] space_name)
    #[arg(long, global = true)]
    pub space_name: Option<String>,

    /// Reference instant, RFC 3339 (default: now)
    #[arg(long, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the feed and re-render the status until interrupted
    Watch {
        /// Seconds between polls (overrides poll_interval_secs)
        #[arg(long, short)]
        interval: Option<u64>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

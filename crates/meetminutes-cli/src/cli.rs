//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// meetminutes - archive W3C Community Group meeting artifacts
#[derive(Debug, Parser)]
#[command(name = "meetminutes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETMINUTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log as JSON (for unattended cron runs)
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Locate, archive, summarize, and email meeting artifacts
    Archive {
        /// Meeting name or Meet code; all configured meetings when omitted
        #[arg(long, short)]
        meeting: Option<String>,

        /// Meeting date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<NaiveDate>,

        /// Send the minutes email to this address instead of the
        /// meeting's configured one
        #[arg(long)]
        email: Option<String>,
    },

    /// Run the interactive Google authorization flow
    Auth {
        /// Re-authorize even when cached credentials exist
        #[arg(long, short)]
        force: bool,
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

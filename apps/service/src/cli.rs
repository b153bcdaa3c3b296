use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uptrack::monitoring::types::DEFAULT_INTERVAL_MINUTES;
use uptrack::monitoring::{Status, TargetId};

#[derive(Debug, Parser)]
#[command(author, version, about = "uptrack - uptime monitoring engine")]
pub struct Cli {
    /// Path to the TOML configuration file. Defaults to $XDG_CONFIG_HOME/uptrack/config.toml.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the scheduler until interrupted (default)
    Run,
    /// Probe a URL once and print its status
    Check { url: String },
    /// Manage monitored targets
    Target {
        #[command(subcommand)]
        action: TargetCommand,
    },
    /// Print the up/down history of a target, newest first
    History { id: TargetId },
    /// Print availability stats of a target
    Stats { id: TargetId },
    /// Print the live status of a target
    Status { id: TargetId },
    /// Print raw samples of a target, newest first
    Log { id: TargetId },
    /// Record a status reported by a private target
    Telemetry { id: TargetId, status: Status },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Subcommand)]
pub enum TargetCommand {
    /// Register a new target
    Add {
        url: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        usage: String,
        /// Polling interval in minutes
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES)]
        interval: u32,
        /// Exclude the target from scheduled polling
        #[arg(long)]
        private: bool,
    },
    /// List targets with their live status and stats
    List,
    /// Change attributes of a target
    Update {
        id: TargetId,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        usage: Option<String>,
        #[arg(long)]
        interval: Option<u32>,
        #[arg(long)]
        private: Option<bool>,
    },
    /// Delete a target and its samples
    Remove { id: TargetId },
}

//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use hydra_domain::TaskPriority;
use std::path::PathBuf;

/// Multi-agent task orchestration with consensus voting
#[derive(Parser, Debug)]
#[command(name = "hydra", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Explicit config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip config files and use built-in defaults
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write logs to daily-rotated files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dispatch a task through the consensus pipeline
    Run(RunArgs),
    /// Inspect or restore checkpoints
    Checkpoints {
        #[command(subcommand)]
        command: CheckpointsCommand,
    },
    /// Show configuration information
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read the task from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["title", "description"])]
    pub file: Option<PathBuf>,

    /// Task id; generated when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Task title
    #[arg(long, required_unless_present = "file")]
    pub title: Option<String>,

    /// Task description
    #[arg(long, required_unless_present = "file")]
    pub description: Option<String>,

    /// Task priority
    #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
    pub priority: PriorityArg,

    /// Assign a specific role, bypassing the router
    #[arg(long)]
    pub role: Option<String>,

    /// Requirement line; repeatable
    #[arg(long = "requirement")]
    pub requirements: Vec<String>,

    /// Refine the winning candidate after consensus
    #[arg(long)]
    pub refine: bool,

    /// Write a checkpoint after the run
    #[arg(long)]
    pub checkpoint: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<PriorityArg> for TaskPriority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => TaskPriority::Low,
            PriorityArg::Medium => TaskPriority::Medium,
            PriorityArg::High => TaskPriority::High,
            PriorityArg::Critical => TaskPriority::Critical,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CheckpointsCommand {
    /// List checkpoints on disk
    List,
    /// Restore task state from a checkpoint (latest when no id is given)
    Restore {
        /// Checkpoint id, e.g. 20260314_150926
        id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show which config files are in effect
    Sources,
}

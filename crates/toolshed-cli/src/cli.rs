//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Toolshed - route tasks to LLMs and keep credentials rotated
#[derive(Parser, Debug)]
#[command(name = "toolshed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to toolshed.toml
    #[arg(short, long, global = true, env = "TOOLSHED_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Classify a task and run it on the model for its category
    ///
    /// Examples:
    ///   toolshed route "write a haiku about rust"
    ///   toolshed route --json summarize this changelog
    Route {
        /// Task description
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run a task on a specific model, skipping classification
    Exec {
        /// Model id (see `toolshed models`)
        model: String,

        /// Task description
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show which model a task would be routed to
    Classify {
        /// Task description
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List registered models
    Models {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Include deprecated models
        #[arg(long)]
        all: bool,
    },

    /// Credential rotation
    Rotation {
        /// Rotation action to perform
        #[command(subcommand)]
        action: RotationAction,
    },

    /// Run the MCP server on stdio
    Mcp,

    /// Generate shell completions
    ///
    /// Examples:
    ///   toolshed completions bash > ~/.local/share/bash-completion/completions/toolshed
    ///   toolshed completions zsh > ~/.zfunc/_toolshed
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Rotation subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RotationAction {
    /// Show rotation status for every service
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Rotate every automated service that is due and report manual ones
    Check {
        /// Rotate automated services even if they are not due
        #[arg(long)]
        force: bool,
    },

    /// Rotate one service now, or print its checklist if it is manual
    Rotate {
        /// Service name
        service: String,

        /// Rotate even if the policy has not expired
        #[arg(long)]
        force: bool,
    },

    /// Show the rotation audit log
    History {
        /// Only show entries for this service
        #[arg(short, long)]
        service: Option<String>,

        /// Maximum number of entries
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print the manual rotation checklist for a service
    Guide {
        /// Service name
        service: String,
    },

    /// Record that a service was rotated by hand
    Record {
        /// Service name
        service: String,

        /// Free-form note stored in the audit log
        #[arg(short, long)]
        details: Option<String>,
    },

    /// Check that the stored credential still works
    Test {
        /// Service name
        service: String,
    },

    /// Change how often a service is rotated
    Schedule {
        /// Service name
        service: String,

        /// Rotation period in days
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Stop tracking the service
        #[arg(long)]
        disable: bool,
    },
}

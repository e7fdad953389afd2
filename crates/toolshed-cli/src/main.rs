//! Toolshed CLI
//!
//! Routes tasks to local and commercial LLMs, manages credential rotation
//! and hosts the MCP server.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries command output and MCP traffic, so logs go to stderr
    if cli.verbose {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
        tracing::debug!("Verbose mode enabled");
    } else if matches!(cli.command, Some(Commands::Mcp)) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolshed=info")),
            )
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    }

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.config),
        None => {
            println!("{} LLM routing and credential rotation", "toolshed".green().bold());
            println!();
            println!("Run {} for available commands.", "toolshed --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config: Option<std::path::PathBuf>) -> Result<()> {
    match cmd {
        Commands::Models { json, all } => commands::run_models(json, all),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "toolshed", &mut std::io::stdout());
            Ok(())
        }
        Commands::Route { task, json } => {
            let settings = commands::load_settings(config)?;
            commands::run_route(&settings, &task, json)
        }
        Commands::Exec { model, task, json } => {
            let settings = commands::load_settings(config)?;
            commands::run_exec(&settings, &model, &task, json)
        }
        Commands::Classify { task, json } => {
            let settings = commands::load_settings(config)?;
            commands::run_classify(&settings, &task, json)
        }
        Commands::Rotation { action } => {
            let settings = commands::load_settings(config)?;
            commands::run_rotation(&settings, action)
        }
        Commands::Mcp => commands::run_mcp(commands::load_settings(config)?),
    }
}

//! CLI module for Metis
//!
//! Provides commands:
//! - `serve`: start the HTTP server
//! - `run`: one-shot planning run from the terminal
//! - `agents`: list the registered agents

use clap::{Parser, Subcommand};

pub mod run;

/// Metis planning service CLI
#[derive(Parser, Debug)]
#[command(name = "metis")]
#[command(about = "Multi-agent project planning service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Run the planning agents once and print the result JSON
    Run(run::RunArgs),
    /// List available agents
    Agents,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Run(args)) => run::run(args).await,
        Some(Commands::Agents) => {
            let registry = metis_core::AgentRegistry::standard();
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

//! `stackctl` - deploy and tear down Docker stacks with output-validated
//! transitions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stack_orchestration::{Progress, Stack};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "stackctl")]
#[command(about = "Deploy and tear down Docker stacks with output-validated transitions")]
#[command(version)]
struct Cli {
    /// Service-definition files, in the order passed to `docker stack deploy`
    #[arg(
        short = 'c',
        long = "compose-file",
        global = true,
        default_value = "docker-compose.yml"
    )]
    compose_files: Vec<PathBuf>,

    /// Stack name (a random token is generated when omitted)
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Map a friendly component name to a declared service (friendly=service)
    #[arg(long, global = true, value_parser = parse_alias)]
    alias: Vec<(String, String)>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the stack and wait until every service is running
    Deploy,

    /// Tear the stack down and wait until every service is gone
    Rm,

    /// Report whether every service of the stack is currently running
    Status,

    /// Print raw logs for one component
    Logs {
        /// Component name (friendly or as declared in the definition files)
        component: String,

        /// Keep streaming as new log lines arrive
        #[arg(short, long)]
        follow: bool,
    },
}

fn parse_alias(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((friendly, service)) if !friendly.is_empty() && !service.is_empty() => {
            Ok((friendly.to_string(), service.to_string()))
        }
        _ => Err(format!("expected friendly=service, got '{value}'")),
    }
}

fn build_stack(cli: &Cli) -> Result<Stack> {
    let mut builder = Stack::builder(cli.compose_files.iter().cloned());
    if let Some(name) = &cli.name {
        builder = builder.name(name);
    }
    for (friendly, service) in &cli.alias {
        builder = builder.alias(friendly, service);
    }
    if cli.quiet {
        builder = builder.progress(Progress::Quiet);
    }
    builder
        .build()
        .context("failed to load stack definition files")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    smol::block_on(async {
        let cli = Cli::parse();
        let stack = build_stack(&cli)?;

        match cli.command {
            Commands::Deploy => commands::deploy::run(&stack).await,
            Commands::Rm => commands::rm::run(&stack).await,
            Commands::Status => commands::status::run(&stack).await,
            Commands::Logs { component, follow } => {
                commands::logs::run(&stack, &component, follow).await
            }
        }
    })
}

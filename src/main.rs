//! Governor - request governance for AI recipe generation
//!
//! Validates configuration, simulates requests through the pipeline and
//! reports component health.

#![allow(missing_docs)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use governance_gateway::utils::logging::init_tracing;
use governance_gateway::{Config, GenerationRequest, Governor};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "governor", version, about = "AI generation governance pipeline")]
struct Cli {
    /// YAML configuration file; environment overrides apply on top
    #[arg(short, long, env = "GOVERNOR_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the configuration and print the effective settings
    Validate,
    /// Run requests through the pipeline using local synthesis only
    Simulate {
        /// Prompt sent to the pipeline
        prompt: String,
        #[arg(long, default_value = "demo-tenant")]
        tenant: String,
        #[arg(long, default_value = "recipe")]
        feature: String,
        /// Number of identical requests to send
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Print a health report for a freshly built pipeline
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_ref())
        .await
        .context("failed to load configuration")?;
    init_tracing(config.logging()).context("failed to initialise logging")?;

    match cli.command {
        Command::Validate => {
            info!("Configuration is valid");
            print!("{}", config.to_yaml()?);
        }
        Command::Simulate {
            prompt,
            tenant,
            feature,
            count,
        } => {
            let governor = Governor::builder(config).build()?;
            let shutdown = CancellationToken::new();
            let workers = governor.start(shutdown.clone());

            for _ in 0..count {
                let request = GenerationRequest::new(&tenant, &feature, &prompt);
                match governor.process(request, &shutdown).await {
                    Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                    Err(e) if e.is_denied() => eprintln!("Denied: {}", e),
                    Err(e) => return Err(e.into()),
                }
            }

            println!("{}", serde_json::to_string_pretty(&governor.stats())?);
            shutdown.cancel();
            futures::future::join_all(workers).await;
        }
        Command::Health => {
            let governor = Governor::builder(config).build()?;
            println!("{}", serde_json::to_string_pretty(&governor.health_check())?);
        }
    }

    Ok(())
}

//! Remedy CLI Application
//!
//! Command-line interface for the remedy incident engine.

mod args;
mod cli;
mod renderer;

use std::time::Duration;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use remedy_core::{diagnosis::AppProfile, params::ListIncidents, RemedyBuilder};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        ingest_secret,
        ollama_url,
        model,
        runbook_dir,
        app_name,
        app_stack,
        app_components,
        action_latency_ms,
        command,
    } = Args::parse();

    let remedy = RemedyBuilder::new()
        .with_database_path(database_file)
        .with_ingest_secret(ingest_secret)
        .with_ollama(ollama_url, model)
        .with_runbook_dir(runbook_dir)
        .with_app_profile(AppProfile {
            name: app_name,
            stack: app_stack,
            components: app_components,
        })
        .with_action_latency(Duration::from_millis(action_latency_ms))
        .build()
        .await
        .context("Failed to initialize remedy")?;

    let cli = Cli::new(remedy, TerminalRenderer::new(!no_color));

    info!("Remedy started");

    match command {
        Some(Incident { command }) => cli.handle_incident_command(command).await,
        Some(Diagnose(args)) => cli.diagnose(&args.into()).await,
        Some(Remediate(args)) => cli.remediate(args).await,
        None => cli.list_incidents(&ListIncidents::default()).await,
    }
}

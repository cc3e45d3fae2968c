use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{DiagnoseArgs, IncidentCommands, RemediateArgs};

/// Incident lifecycle, diagnosis and remediation tool
///
/// Remedy records incidents reported by monitoring systems, asks a local
/// Ollama model for a root cause grounded in past incidents and runbooks,
/// and executes the proposed remediation steps with visible progress.
#[derive(Parser)]
#[command(version, about, name = "remedy")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/remedy/remedy.db
    #[arg(long, global = true, env = "REMEDY_DATABASE_FILE")]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Secret that `incident ingest --token` must match
    #[arg(long, global = true, env = "REMEDY_INGEST_SECRET", hide_env_values = true)]
    pub ingest_secret: Option<String>,

    /// Base URL of the local Ollama server (127.0.0.1 only)
    #[arg(
        long,
        global = true,
        env = "REMEDY_OLLAMA_URL",
        default_value = "http://127.0.0.1:11434"
    )]
    pub ollama_url: String,

    /// Ollama model used for diagnosis
    #[arg(long, global = true, env = "REMEDY_MODEL", default_value = "llama3.1")]
    pub model: String,

    /// Directory of markdown runbooks used as diagnosis context
    #[arg(long, global = true, env = "REMEDY_RUNBOOK_DIR")]
    pub runbook_dir: Option<PathBuf>,

    /// Name of the application the incidents belong to
    #[arg(long, global = true, env = "REMEDY_APP_NAME", default_value = "application")]
    pub app_name: String,

    /// Technology stack of the application
    #[arg(long, global = true, env = "REMEDY_APP_STACK", default_value = "unspecified")]
    pub app_stack: String,

    /// Application components as a comma-separated list
    #[arg(
        long,
        global = true,
        env = "REMEDY_APP_COMPONENTS",
        value_delimiter = ','
    )]
    pub app_components: Vec<String>,

    /// Simulated latency of each remediation action, in milliseconds
    #[arg(
        long,
        global = true,
        env = "REMEDY_ACTION_LATENCY_MS",
        default_value_t = 500
    )]
    pub action_latency_ms: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Remedy CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage incidents
    #[command(alias = "i")]
    Incident {
        #[command(subcommand)]
        command: IncidentCommands,
    },
    /// Diagnose an incident with the configured model
    #[command(alias = "d")]
    Diagnose(DiagnoseArgs),
    /// Execute the remediation steps of an incident's latest diagnosis
    #[command(alias = "r")]
    Remediate(RemediateArgs),
}

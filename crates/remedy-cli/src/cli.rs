//! Command-line argument wrappers and command handlers.
//!
//! Argument structs carry the clap derives and convert into the core
//! parameter types with `From`, so `remedy-core` stays free of CLI
//! concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Remedy
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use log::warn;
use remedy_core::{
    models::{Severity, StatusKind},
    params::{Id, IncidentSubmission, ListIncidents},
    RemediationProgress, Remedy,
};
use tokio_util::sync::CancellationToken;

use crate::renderer::TerminalRenderer;

/// Report a new incident
#[derive(Args)]
pub struct IngestArgs {
    /// Short summary of the incident
    pub title: String,
    #[arg(short, long, help = "Free-form details of what was observed")]
    pub description: String,
    #[arg(short, long, help = "System that reported the incident")]
    pub source: String,
    #[arg(
        long,
        help = "Severity (critical, high, medium, low, info); unknown values mean medium"
    )]
    pub severity: Option<String>,
    #[arg(long, help = "Ingestion token, required when a secret is configured")]
    pub token: Option<String>,
}

impl From<&IngestArgs> for IncidentSubmission {
    fn from(val: &IngestArgs) -> Self {
        IncidentSubmission {
            source: val.source.clone(),
            title: val.title.clone(),
            description: val.description.clone(),
            severity: val.severity.clone(),
        }
    }
}

/// List incidents, newest first
#[derive(Args)]
pub struct ListIncidentsArgs {
    #[arg(long, help = "Only incidents with this severity")]
    pub severity: Option<Severity>,
    #[arg(long, help = "Only incidents in this state (open, ack, diagnosed, resolved)")]
    pub status: Option<StatusKind>,
    #[arg(long, help = "Only incidents reported by this source")]
    pub source: Option<String>,
    #[arg(long, help = "Only incidents whose title contains this text")]
    pub title: Option<String>,
    #[arg(long, default_value_t = 50, help = "Maximum number of incidents to show")]
    pub limit: u32,
    #[arg(long, default_value_t = 0, help = "Number of incidents to skip")]
    pub offset: u32,
}

impl From<ListIncidentsArgs> for ListIncidents {
    fn from(val: ListIncidentsArgs) -> Self {
        ListIncidents {
            severity: val.severity,
            status: val.status,
            source: val.source,
            title_contains: val.title,
            limit: val.limit,
            offset: val.offset,
        }
    }
}

/// Identify a single incident
#[derive(Args)]
pub struct IncidentIdArgs {
    #[arg(help = "Unique identifier of the incident")]
    pub id: u64,
}

impl From<IncidentIdArgs> for Id {
    fn from(val: IncidentIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Diagnose an incident
#[derive(Args)]
pub struct DiagnoseArgs {
    #[arg(help = "Unique identifier of the incident to diagnose")]
    pub id: u64,
}

impl From<DiagnoseArgs> for Id {
    fn from(val: DiagnoseArgs) -> Self {
        Id { id: val.id }
    }
}

/// Remediate an incident
#[derive(Args)]
pub struct RemediateArgs {
    #[arg(help = "Unique identifier of the incident to remediate")]
    pub id: u64,
    #[arg(long, help = "Run only this step (for example step-2) instead of the whole plan")]
    pub step: Option<String>,
}

#[derive(Subcommand)]
pub enum IncidentCommands {
    /// Report a new incident
    #[command(alias = "new")]
    Ingest(IngestArgs),
    /// List incidents
    #[command(alias = "ls")]
    List(ListIncidentsArgs),
    /// Show an incident and its latest diagnosis
    Show(IncidentIdArgs),
    /// Acknowledge an incident
    #[command(alias = "ack")]
    Acknowledge(IncidentIdArgs),
    /// Resolve an incident
    Resolve(IncidentIdArgs),
}

/// Runs commands against the engine and renders their output.
pub struct Cli {
    remedy: Remedy,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(remedy: Remedy, renderer: TerminalRenderer) -> Self {
        Self { remedy, renderer }
    }

    pub async fn handle_incident_command(&self, command: IncidentCommands) -> Result<()> {
        match command {
            IncidentCommands::Ingest(args) => self.ingest(&args).await,
            IncidentCommands::List(args) => self.list_incidents(&args.into()).await,
            IncidentCommands::Show(args) => self.show_incident(&args.into()).await,
            IncidentCommands::Acknowledge(args) => {
                let change = self.remedy.acknowledge(&args.into()).await?;
                self.renderer.render(&change.to_string())
            }
            IncidentCommands::Resolve(args) => {
                let change = self.remedy.resolve(&args.into()).await?;
                self.renderer.render(&change.to_string())
            }
        }
    }

    async fn ingest(&self, args: &IngestArgs) -> Result<()> {
        let outcome = self
            .remedy
            .ingest(args.token.as_deref(), &args.into())
            .await?;
        self.renderer.render(&outcome.to_string())
    }

    pub async fn list_incidents(&self, params: &ListIncidents) -> Result<()> {
        let incidents = self
            .remedy
            .list_incidents(params)
            .await
            .context("Failed to list incidents")?;
        self.renderer.render(&incidents.to_string())
    }

    async fn show_incident(&self, params: &Id) -> Result<()> {
        let incident = self
            .remedy
            .get_incident(params)
            .await?
            .ok_or_else(|| anyhow!("Incident with ID {} not found", params.id))?;
        self.renderer.render(&incident.to_string())?;

        if let Some(diagnosis) = self.remedy.latest_diagnosis(params).await? {
            self.renderer.render("\n")?;
            self.renderer.render(&diagnosis.to_string())?;
        }
        Ok(())
    }

    pub async fn diagnose(&self, params: &Id) -> Result<()> {
        let stored = self.remedy.diagnose(params).await?;
        self.renderer.render(&stored.to_string())
    }

    pub async fn remediate(&self, args: RemediateArgs) -> Result<()> {
        let params = Id { id: args.id };
        let cancel = CancellationToken::new();

        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping before the next remediation step");
                    cancel.cancel();
                }
            })
        };

        let result = match args.step {
            Some(step_id) => self.remediate_step(&params, &step_id, &cancel).await,
            None => self
                .remedy
                .remediate(&params, &cancel)
                .await
                .map_err(Into::into),
        };
        interrupt.abort();

        let progress = result?;
        self.renderer.render(&progress.to_string())
    }

    async fn remediate_step(
        &self,
        params: &Id,
        step_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RemediationProgress> {
        self.remedy.plan_remediation(params).await?;
        self.remedy.execute_step(params, step_id, cancel).await?;
        Ok(self.remedy.remediation_progress(params)?)
    }
}

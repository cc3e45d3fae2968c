//! High-level engine API.
//!
//! [`Remedy`] is the single entry point used by interfaces such as the CLI.
//! It ties the incident store, the diagnosis pipeline and the remediation
//! executor together and returns display-ready types.
//!
//! ```text
//! ┌──────────────┐    ┌────────────────────┐    ┌──────────────────┐
//! │  Interfaces  │    │       Remedy       │    │  Collaborators   │
//! │    (CLI)     │───▶│ incident_ops       │───▶│ IncidentRepository│
//! │              │    │ remediation_ops    │    │ ContextRetriever │
//! └──────────────┘    └────────────────────┘    │ DiagnosisGenerator│
//!                                               │ ActionExecutor   │
//!                                               └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use remedy_core::{params::{Id, IncidentSubmission}, RemedyBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let remedy = RemedyBuilder::new()
//!     .with_database_path(Some("/tmp/remedy.db"))
//!     .build()
//!     .await?;
//!
//! let submission = IncidentSubmission {
//!     source: "monitoring".to_string(),
//!     title: "DB timeout".to_string(),
//!     description: "Connection pool exhausted".to_string(),
//!     severity: Some("high".to_string()),
//! };
//! let outcome = remedy.ingest(None, &submission).await?;
//!
//! let diagnosis = remedy.diagnose(&Id { id: outcome.id }).await?;
//! println!("{diagnosis}");
//!
//! let progress = remedy
//!     .remediate(&Id { id: outcome.id }, &CancellationToken::new())
//!     .await?;
//! println!("{progress}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
mod incident_ops;
mod remediation_ops;


use std::sync::Arc;

pub use builder::RemedyBuilder;

use crate::{
    diagnosis::DiagnosisPipeline,
    ingest::{Authorization, SharedSecret},
    remediation::RemediationExecutor,
    repository::IncidentRepository,
};

/// Incident lifecycle and remediation engine.
pub struct Remedy {
    repository: Arc<dyn IncidentRepository>,
    pipeline: DiagnosisPipeline,
    executor: RemediationExecutor,
    ingest_secret: Option<SharedSecret>,
}

impl Remedy {
    pub(crate) fn new(
        repository: Arc<dyn IncidentRepository>,
        pipeline: DiagnosisPipeline,
        executor: RemediationExecutor,
        ingest_secret: Option<SharedSecret>,
    ) -> Self {
        Self {
            repository,
            pipeline,
            executor,
            ingest_secret,
        }
    }

    pub fn repository(&self) -> &Arc<dyn IncidentRepository> {
        &self.repository
    }

    pub fn pipeline(&self) -> &DiagnosisPipeline {
        &self.pipeline
    }

    pub fn executor(&self) -> &RemediationExecutor {
        &self.executor
    }

    /// Check an ingestion token against the configured secret.
    ///
    /// Without a configured secret every caller is local and trusted.
    pub fn authorize(&self, token: Option<&str>) -> Authorization {
        match &self.ingest_secret {
            Some(secret) => secret.authorize(token),
            None => Authorization::Authorized,
        }
    }
}

//! Core library for the Remedy incident engine.
//!
//! This crate tracks operational incidents through their lifecycle, asks a
//! diagnosis generator for a root cause grounded in incident history, and
//! executes the proposed remediation steps one at a time with observable
//! progress.
//!
//! # Components
//!
//! - [`ingest`]: validation and normalization of inbound submissions
//! - [`lifecycle`]: the forward-only incident status machine
//! - [`diagnosis`]: the staged diagnosis pipeline and its collaborators
//! - [`remediation`]: the in-memory plan store and step executor
//! - [`repository`] and [`db`]: SQLite persistence of incidents and diagnoses
//! - [`outcome`]: helpers for folding results and accumulating violations
//! - [`display`]: markdown `Display` for models and operation results
//!
//! [`Remedy`] (built with [`RemedyBuilder`]) ties these together.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use remedy_core::{params::{IncidentSubmission, ListIncidents}, RemedyBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let remedy = RemedyBuilder::new()
//!     .with_database_path(Some("incidents.db"))
//!     .build()
//!     .await?;
//!
//! let submission = IncidentSubmission {
//!     source: "monitoring".to_string(),
//!     title: "Checkout latency".to_string(),
//!     description: "p99 above 2s for 10 minutes".to_string(),
//!     severity: None,
//! };
//! let outcome = remedy.ingest(None, &submission).await?;
//! println!("{outcome}");
//!
//! let incidents = remedy.list_incidents(&ListIncidents::default()).await?;
//! println!("{incidents}");
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod diagnosis;
pub mod display;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod lifecycle;
pub mod models;
pub mod outcome;
pub mod params;
pub mod remediation;
pub mod repository;

// Re-export commonly used types
pub use db::Database;
pub use display::{Incidents, LocalDateTime, StatusChange};
pub use engine::{Remedy, RemedyBuilder};
pub use error::{
    ActionError, BuildError, DiagnosisError, ErrorKind, ExecutionError, GeneratorError,
    IngestError, InvalidTransition, LifecycleError, RetrievalError, StoreError,
};
pub use ingest::{Authorization, IngestionOutcome, SharedSecret};
pub use models::{
    Confidence, Diagnosis, DiagnosisRef, DiagnosisResult, Incident, IncidentStatus,
    RemediationAction, RemediationPlan, RemediationProgress, RemediationStep, Severity,
    StatusKind, StepStatus,
};
pub use outcome::{Fold, Violations};
pub use params::{Id, IncidentSubmission, ListIncidents};
pub use repository::{IncidentRepository, SqliteIncidentStore};

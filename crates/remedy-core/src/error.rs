//! Error types for the incident and remediation engine.
//!
//! Every component owns one error enum so callers can tell apart failures
//! that need different handling. All of them map onto the shared
//! [`ErrorKind`] taxonomy through a `kind()` method.

use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::models::{StatusKind, StepStatus};

/// Coarse classification shared by every error in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed entity does not exist.
    NotFound,
    /// The caller supplied input that violates a constraint.
    Validation,
    /// The caller failed the shared-secret check.
    Unauthorized,
    /// The entity is in a state that does not allow the operation.
    Conflict,
    /// A collaborator could not be reached or faulted.
    UpstreamUnavailable,
    /// A collaborator answered with an unusable payload.
    UpstreamInvalidResponse,
    /// The incident store failed.
    Persistence,
    /// The operation was cancelled by its caller.
    Cancelled,
}

impl ErrorKind {
    /// Whether a caller may reasonably retry the same request later.
    ///
    /// The engine itself never retries.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::UpstreamUnavailable | ErrorKind::Persistence)
    }
}

/// Errors raised by the incident store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// The incident addressed by an update does not exist
    #[error("Incident with ID {id} not found")]
    IncidentNotFound { id: u64 },
    /// A status write lost the race against another writer
    #[error("Incident {id} is no longer {expected}")]
    StatusChanged { id: u64, expected: StatusKind },
    /// Backend faults that carry no structured source
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> StoreError {
        StoreError::Database {
            message: self.message,
            source,
        }
    }
}

impl StoreError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates an error for a blocking task that failed to join.
    pub fn join(error: impl fmt::Display) -> Self {
        StoreError::Unavailable {
            message: format!("Task join error: {error}"),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T, StoreError>;
}

impl<T> DatabaseResultExt<T> for Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T, StoreError> {
        self.map_err(|e| StoreError::database(message).with_source(e))
    }
}

/// An incident status change that would move the lifecycle backwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot move incident from {from} to {to}")]
pub struct InvalidTransition {
    pub from: StatusKind,
    pub to: StatusKind,
}

/// Errors raised while acknowledging or resolving an incident.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Incident with ID {id} not found")]
    NotFound { id: u64 },
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::NotFound { .. } => ErrorKind::NotFound,
            LifecycleError::Transition(_) => ErrorKind::Conflict,
            LifecycleError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Failure kinds of the diagnosis pipeline, one per stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosisError {
    /// No incident exists with the requested ID
    #[error("Incident with ID {id} not found")]
    IncidentNotFound { id: u64 },
    /// The retrieval collaborator produced no usable context
    #[error("No supporting context could be retrieved for incident {id}")]
    RetrievalFailed { id: u64 },
    /// The diagnosis generator could not be reached or faulted
    #[error("Diagnosis generator unavailable: {message}")]
    LlmUnavailable { message: String },
    /// The diagnosis generator answered but the payload is unusable
    #[error("Diagnosis generator returned an invalid response: {reason}")]
    LlmResponseInvalid { reason: String },
    /// The incident has already been resolved
    #[error("Incident {id} is resolved and cannot be diagnosed")]
    IncidentResolved { id: u64 },
    /// Storing the diagnosis or the status change failed
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl DiagnosisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiagnosisError::IncidentNotFound { .. } => ErrorKind::NotFound,
            DiagnosisError::RetrievalFailed { .. } => ErrorKind::UpstreamUnavailable,
            DiagnosisError::LlmUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            DiagnosisError::LlmResponseInvalid { .. } => ErrorKind::UpstreamInvalidResponse,
            DiagnosisError::IncidentResolved { .. } => ErrorKind::Conflict,
            DiagnosisError::Persistence { .. } => ErrorKind::Persistence,
        }
    }
}

impl From<StoreError> for DiagnosisError {
    fn from(error: StoreError) -> Self {
        DiagnosisError::Persistence {
            message: error.to_string(),
        }
    }
}

/// Errors raised by the retrieval collaborator.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Failed to read runbook '{path}': {source}")]
    Runbook {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the diagnosis generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Generator unreachable: {message}")]
    Unavailable { message: String },
    #[error("Generator returned an empty response")]
    EmptyResponse,
    #[error("Invalid generator configuration: {message}")]
    Configuration { message: String },
}

/// Errors raised by the action-execution collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Action failed: {message}")]
    Failed { message: String },
    #[error("Action target '{target}' is unavailable")]
    TargetUnavailable { target: String },
}

/// Errors raised by the remediation executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("No remediation plan for incident {incident_id}")]
    PlanNotFound { incident_id: u64 },
    #[error("Step '{step_id}' not found in plan for incident {incident_id}")]
    StepNotFound { incident_id: u64, step_id: String },
    #[error("Step '{step_id}' cannot be executed while {status}")]
    StepNotRunnable { step_id: String, status: StepStatus },
    #[error("Remediation for incident {incident_id} cancelled before step '{step_id}'")]
    Cancelled { incident_id: u64, step_id: String },
    #[error("Remediation plan for incident {incident_id} has no steps")]
    EmptyPlan { incident_id: u64 },
    #[error("Remediation plan for incident {incident_id} repeats step '{step_id}'")]
    DuplicateStep { incident_id: u64, step_id: String },
    #[error("Incident {incident_id} has no diagnosis to remediate")]
    NoDiagnosis { incident_id: u64 },
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::PlanNotFound { .. } | ExecutionError::StepNotFound { .. } => {
                ErrorKind::NotFound
            }
            ExecutionError::StepNotRunnable { .. } => ErrorKind::Conflict,
            ExecutionError::Cancelled { .. } => ErrorKind::Cancelled,
            ExecutionError::EmptyPlan { .. } | ExecutionError::DuplicateStep { .. } => {
                ErrorKind::Validation
            }
            ExecutionError::NoDiagnosis { .. } => ErrorKind::Conflict,
            ExecutionError::Persistence { .. } => ErrorKind::Persistence,
        }
    }
}

impl From<StoreError> for ExecutionError {
    fn from(error: StoreError) -> Self {
        ExecutionError::Persistence {
            message: error.to_string(),
        }
    }
}

/// Errors raised while ingesting an incident submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Unauthorized: invalid or missing ingestion token")]
    Unauthorized,
    #[error("Validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Unauthorized => ErrorKind::Unauthorized,
            IngestError::Validation { .. } => ErrorKind::Validation,
            IngestError::Persistence { .. } => ErrorKind::Persistence,
        }
    }
}

/// Errors raised while building the engine.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

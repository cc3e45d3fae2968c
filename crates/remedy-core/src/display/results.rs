//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::{
    ingest::IngestionOutcome,
    models::{DiagnosisResult, Incident, StatusKind},
};

impl fmt::Display for IngestionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ingested incident with ID: {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Title: {}", self.title)?;
        writeln!(f, "- Source: {}", self.source)?;
        writeln!(f, "- Severity: {}", self.severity)
    }
}

impl fmt::Display for DiagnosisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosisResult::Success(diagnosis) => write!(f, "{diagnosis}"),
            DiagnosisResult::Failure { error } => writeln!(f, "Diagnosis failed: {error}"),
        }
    }
}

/// Wrapper type for displaying an incident after a status change.
///
/// # Examples
///
/// ```rust
/// use remedy_core::{
///     display::StatusChange,
///     models::{Incident, IncidentStatus, Severity, StatusKind},
/// };
/// use jiff::Timestamp;
///
/// let incident = Incident {
///     id: 7,
///     source: "pager".to_string(),
///     title: "Disk full".to_string(),
///     description: "/var is at 100%".to_string(),
///     severity: Severity::Critical,
///     status: IncidentStatus::Resolved,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let output = StatusChange::new(StatusKind::Acknowledged, incident).to_string();
/// assert!(output.starts_with("Incident 7 moved from acknowledged to resolved"));
/// ```
#[derive(Debug)]
pub struct StatusChange {
    pub previous: StatusKind,
    pub incident: Incident,
}

impl StatusChange {
    pub fn new(previous: StatusKind, incident: Incident) -> Self {
        Self { previous, incident }
    }
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Incident {} moved from {} to {}",
            self.incident.id,
            self.previous,
            self.incident.status.kind()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.incident)
    }
}

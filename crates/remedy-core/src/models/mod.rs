//! Data models for incidents, diagnoses and remediation plans.
//!
//! Display implementations for these models live in
//! [`crate::display::models`] so that data structures stay free of
//! presentation logic.

pub mod diagnosis;
pub mod filters;
pub mod incident;
pub mod remediation;
pub mod status;

#[cfg(test)]
mod tests;

pub use diagnosis::{Diagnosis, DiagnosisResult, StoredDiagnosis};
pub use filters::{IncidentFilter, Page};
pub use incident::{Incident, UNASSIGNED_ID};
pub use remediation::{RemediationAction, RemediationPlan, RemediationProgress, RemediationStep};
pub use status::{
    Confidence, DiagnosisRef, IncidentStatus, ProgressStatus, Severity, StatusKind, StepStatus,
};

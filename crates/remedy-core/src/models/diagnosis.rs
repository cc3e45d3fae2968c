//! Diagnosis model definitions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Confidence, DiagnosisRef};
use crate::error::DiagnosisError;

/// A proposed root cause with remediation steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub root_cause: String,

    /// Remediation steps in execution order
    pub steps: Vec<String>,

    pub confidence: Confidence,
}

/// A diagnosis as persisted by the incident store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredDiagnosis {
    pub id: DiagnosisRef,

    pub incident_id: u64,

    #[serde(flatten)]
    pub diagnosis: Diagnosis,

    pub created_at: Timestamp,
}

/// Reportable outcome of a diagnosis attempt.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DiagnosisResult {
    Success(Diagnosis),
    Failure { error: String },
}

impl From<Result<Diagnosis, DiagnosisError>> for DiagnosisResult {
    fn from(result: Result<Diagnosis, DiagnosisError>) -> Self {
        match result {
            Ok(diagnosis) => DiagnosisResult::Success(diagnosis),
            Err(error) => DiagnosisResult::Failure {
                error: error.to_string(),
            },
        }
    }
}

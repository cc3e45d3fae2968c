//! Remediation plan, step and progress models.

use std::num::NonZeroU32;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{DiagnosisRef, ProgressStatus, StepStatus};

/// Structured action attached to a remediation step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemediationAction {
    RestartService {
        service_name: String,
    },
    ScaleCluster {
        cluster_id: String,
        desired_capacity: NonZeroU32,
    },
    ManualStep {
        instructions: String,
    },
}

/// One step of a remediation plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemediationStep {
    /// Identifier, unique within its plan
    pub id: String,

    pub description: String,

    /// Action to perform; steps without one complete without side effects
    pub action: Option<RemediationAction>,

    pub status: StepStatus,

    /// Outcome text reported by the action, or the failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl RemediationStep {
    /// Create a pending step.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        action: Option<RemediationAction>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            action,
            status: StepStatus::Pending,
            outcome: None,
        }
    }
}

/// Ordered remediation steps for one incident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemediationPlan {
    pub incident_id: u64,

    /// Diagnosis the plan was built from, if any
    pub diagnosis_id: Option<DiagnosisRef>,

    pub steps: Vec<RemediationStep>,

    pub created_at: Timestamp,

    /// Set when the first step starts
    pub started_at: Option<Timestamp>,

    /// Set when the plan reaches a terminal state
    pub completed_at: Option<Timestamp>,
}

impl RemediationPlan {
    /// Create a plan whose steps are all reset to pending.
    pub fn new(
        incident_id: u64,
        diagnosis_id: Option<DiagnosisRef>,
        steps: Vec<RemediationStep>,
    ) -> Self {
        let steps = steps
            .into_iter()
            .map(|step| RemediationStep {
                status: StepStatus::Pending,
                outcome: None,
                ..step
            })
            .collect();

        Self {
            incident_id,
            diagnosis_id,
            steps,
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&RemediationStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub(crate) fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    /// Overall status derived from the step states.
    pub fn status(&self) -> ProgressStatus {
        if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            ProgressStatus::Failed
        } else if self.steps.iter().all(|s| s.status == StepStatus::Completed) {
            ProgressStatus::Completed
        } else if self.steps.iter().all(|s| s.status == StepStatus::Pending) {
            ProgressStatus::NotStarted
        } else {
            ProgressStatus::InProgress
        }
    }

    /// Read-only projection of the plan and its execution cursor.
    pub fn progress(&self) -> RemediationProgress {
        let current_step_index = self
            .steps
            .iter()
            .position(|s| s.status != StepStatus::Completed)
            .unwrap_or(self.steps.len());
        let error_message = self
            .steps
            .iter()
            .find(|s| s.status == StepStatus::Failed)
            .and_then(|s| s.outcome.clone());

        RemediationProgress {
            incident_id: self.incident_id,
            diagnosis_id: self.diagnosis_id,
            steps: self.steps.clone(),
            current_step_index,
            status: self.status(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            error_message,
        }
    }
}

/// Snapshot of a plan's execution state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemediationProgress {
    pub incident_id: u64,
    pub diagnosis_id: Option<DiagnosisRef>,
    pub steps: Vec<RemediationStep>,
    /// Index of the first step that has not completed
    pub current_step_index: usize,
    pub status: ProgressStatus,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
}

//! Remediation operations for the engine.

use tokio_util::sync::CancellationToken;

use super::Remedy;
use crate::{
    error::ExecutionError,
    models::{RemediationPlan, RemediationProgress, RemediationStep, StoredDiagnosis},
    params::Id,
    remediation::plan_from_diagnosis,
};

impl Remedy {
    async fn require_diagnosis(&self, incident_id: u64) -> Result<StoredDiagnosis, ExecutionError> {
        self.repository
            .latest_diagnosis(incident_id)
            .await?
            .ok_or(ExecutionError::NoDiagnosis { incident_id })
    }

    /// Build a pending plan from the incident's latest diagnosis, replacing
    /// any existing plan.
    pub async fn plan_remediation(&self, params: &Id) -> Result<RemediationPlan, ExecutionError> {
        let stored = self.require_diagnosis(params.id).await?;
        self.executor.create_plan(plan_from_diagnosis(
            params.id,
            &stored.diagnosis,
            Some(stored.id),
        ))
    }

    /// Execute every step planned from the incident's latest diagnosis.
    pub async fn remediate(
        &self,
        params: &Id,
        cancel: &CancellationToken,
    ) -> Result<RemediationProgress, ExecutionError> {
        let stored = self.require_diagnosis(params.id).await?;
        self.executor
            .execute_all_steps(params.id, &stored.diagnosis, Some(stored.id), cancel)
            .await
    }

    pub async fn execute_step(
        &self,
        params: &Id,
        step_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RemediationStep, ExecutionError> {
        self.executor.execute_step(params.id, step_id, cancel).await
    }

    pub fn remediation_progress(&self, params: &Id) -> Result<RemediationProgress, ExecutionError> {
        self.executor.get_progress(params.id)
    }
}

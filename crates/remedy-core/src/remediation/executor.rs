//! Step-by-step execution of remediation plans.

use std::sync::Arc;

use jiff::Timestamp;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::{
    actions::ActionExecutor,
    plan_from_diagnosis,
    store::{PlanSlot, PlanStore},
};
use crate::{
    error::{ActionError, ExecutionError},
    models::{
        Diagnosis, DiagnosisRef, RemediationPlan, RemediationProgress, RemediationStep,
        StepStatus,
    },
};

const CANCELLED_OUTCOME: &str = "cancelled before execution";
const NO_ACTION_OUTCOME: &str = "No action required";

/// Runs plan steps through an [`ActionExecutor`], recording every state
/// change in the [`PlanStore`].
///
/// Execution is serialized per incident: while one step runs, other
/// execution requests for the same incident wait. Progress reads never
/// wait and observe a step as `InProgress` while its action runs.
pub struct RemediationExecutor {
    store: Arc<PlanStore>,
    actions: Arc<dyn ActionExecutor>,
}

impl RemediationExecutor {
    pub fn new(store: Arc<PlanStore>, actions: Arc<dyn ActionExecutor>) -> Self {
        Self { store, actions }
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    /// Register a plan for its incident, replacing any existing one.
    ///
    /// # Errors
    ///
    /// `EmptyPlan` or `DuplicateStep` when the plan is malformed; the
    /// existing plan is then kept.
    pub fn create_plan(&self, plan: RemediationPlan) -> Result<RemediationPlan, ExecutionError> {
        self.store.create_plan(plan)
    }

    pub fn get_plan(&self, incident_id: u64) -> Option<RemediationPlan> {
        self.store.get_plan(incident_id)
    }

    /// Current progress for an incident's plan.
    ///
    /// # Errors
    ///
    /// `ExecutionError::PlanNotFound` when the incident has no plan.
    pub fn get_progress(&self, incident_id: u64) -> Result<RemediationProgress, ExecutionError> {
        self.store
            .progress(incident_id)
            .ok_or(ExecutionError::PlanNotFound { incident_id })
    }

    /// Execute one step of an incident's plan.
    ///
    /// Only `Pending` and `Failed` steps are runnable. An action fault is
    /// recorded on the step (status `Failed`, message as outcome) and the
    /// step is returned normally.
    ///
    /// # Errors
    ///
    /// - `PlanNotFound` / `StepNotFound` when the plan or step is missing
    /// - `StepNotRunnable` when the step is `Completed` or `InProgress`
    /// - `Cancelled` when `cancel` fired before the step started; the step
    ///   is recorded as `Failed`
    pub async fn execute_step(
        &self,
        incident_id: u64,
        step_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RemediationStep, ExecutionError> {
        let slot = self
            .store
            .slot(incident_id)
            .ok_or(ExecutionError::PlanNotFound { incident_id })?;

        let _guard = slot.execution.lock().await;
        self.run_step(&slot, incident_id, step_id, cancel).await
    }

    /// Build a plan from `diagnosis` and execute it in order.
    ///
    /// Each diagnosis step becomes a plan step with an action derived from
    /// its text. Execution stops at the first failed step; the returned
    /// progress then reports `Failed` with the step's message.
    ///
    /// # Errors
    ///
    /// - `EmptyPlan` when the diagnosis has no steps
    /// - `Cancelled` when `cancel` fired; the step that would have run
    ///   next is recorded as `Failed`
    pub async fn execute_all_steps(
        &self,
        incident_id: u64,
        diagnosis: &Diagnosis,
        diagnosis_id: Option<DiagnosisRef>,
        cancel: &CancellationToken,
    ) -> Result<RemediationProgress, ExecutionError> {
        let slot = self
            .store
            .insert(plan_from_diagnosis(incident_id, diagnosis, diagnosis_id))?;
        let _guard = slot.execution.lock().await;

        let step_ids: Vec<String> = slot.snapshot().steps.into_iter().map(|s| s.id).collect();
        info!(
            "Executing {} remediation steps for incident {incident_id}",
            step_ids.len()
        );

        for step_id in &step_ids {
            let step = self.run_step(&slot, incident_id, step_id, cancel).await?;
            if step.status == StepStatus::Failed {
                warn!("Stopping remediation for incident {incident_id} after failed step '{step_id}'");
                break;
            }
        }

        Ok(slot.snapshot().progress())
    }

    /// Run a single step; the caller holds the slot's execution lock.
    async fn run_step(
        &self,
        slot: &PlanSlot,
        incident_id: u64,
        step_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RemediationStep, ExecutionError> {
        let (index, action) = slot.update(|plan| {
            let index = plan
                .step_index(step_id)
                .ok_or_else(|| ExecutionError::StepNotFound {
                    incident_id,
                    step_id: step_id.to_string(),
                })?;

            let status = plan.steps[index].status;
            if matches!(status, StepStatus::Completed | StepStatus::InProgress) {
                return Err(ExecutionError::StepNotRunnable {
                    step_id: step_id.to_string(),
                    status,
                });
            }

            let now = Timestamp::now();
            let step = &mut plan.steps[index];
            if cancel.is_cancelled() {
                step.status = StepStatus::Failed;
                step.outcome = Some(CANCELLED_OUTCOME.to_string());
                plan.completed_at = Some(now);
                return Err(ExecutionError::Cancelled {
                    incident_id,
                    step_id: step_id.to_string(),
                });
            }

            step.status = StepStatus::InProgress;
            step.outcome = None;
            let action = step.action.clone();
            plan.started_at.get_or_insert(now);
            plan.completed_at = None;
            Ok((index, action))
        })?;

        debug!("Step '{step_id}' of incident {incident_id} in progress");

        let result = match action {
            Some(action) => {
                let actions = Arc::clone(&self.actions);
                // A panicking action must not leave the step stuck in progress
                tokio::spawn(async move { actions.execute(&action).await })
                    .await
                    .unwrap_or_else(|e| {
                        Err(ActionError::Failed {
                            message: format!("action task failed: {e}"),
                        })
                    })
            }
            None => Ok(NO_ACTION_OUTCOME.to_string()),
        };

        let step = slot.update(|plan| {
            let step = &mut plan.steps[index];
            match result {
                Ok(outcome) => {
                    step.status = StepStatus::Completed;
                    step.outcome = Some(outcome);
                }
                Err(e) => {
                    step.status = StepStatus::Failed;
                    step.outcome = Some(e.to_string());
                }
            }
            let step = step.clone();

            if plan.status().is_terminal() {
                plan.completed_at = Some(Timestamp::now());
            }
            step
        });

        match step.status {
            StepStatus::Failed => warn!(
                "Step '{step_id}' of incident {incident_id} failed: {}",
                step.outcome.as_deref().unwrap_or_default()
            ),
            _ => info!("Step '{step_id}' of incident {incident_id} completed"),
        }

        Ok(step)
    }
}

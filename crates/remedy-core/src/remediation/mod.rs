//! Remediation plans and their execution.
//!
//! Plans live only in memory in a [`PlanStore`]; the [`RemediationExecutor`]
//! runs their steps through an [`ActionExecutor`] and records each state
//! change so progress can be polled while execution is under way.

pub mod actions;
pub mod executor;
pub mod store;

pub use actions::{derive_action, ActionExecutor, SimulatedActionExecutor};
pub use executor::RemediationExecutor;
pub use store::{PlanStore, DEFAULT_RETENTION};

use crate::models::{Diagnosis, DiagnosisRef, RemediationPlan, RemediationStep};

/// Build a pending plan with one step per diagnosis step.
///
/// Step IDs are `step-1`, `step-2`, ... in diagnosis order.
pub fn plan_from_diagnosis(
    incident_id: u64,
    diagnosis: &Diagnosis,
    diagnosis_id: Option<DiagnosisRef>,
) -> RemediationPlan {
    let steps = diagnosis
        .steps
        .iter()
        .enumerate()
        .map(|(i, text)| {
            RemediationStep::new(format!("step-{}", i + 1), text.clone(), Some(derive_action(text)))
        })
        .collect();

    RemediationPlan::new(incident_id, diagnosis_id, steps)
}

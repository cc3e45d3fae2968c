//! In-memory remediation plan store.

use std::{collections::HashSet, sync::Arc, time::Duration};

use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use log::debug;
use parking_lot::RwLock;

use crate::{
    error::ExecutionError,
    models::{RemediationPlan, RemediationProgress},
};

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);

/// One incident's plan plus the lock that serializes its execution.
///
/// Readers take the `RwLock` briefly to copy a snapshot. The async mutex is
/// held for the whole of a step (or plan) execution, so it never blocks
/// readers.
#[derive(Debug)]
pub(crate) struct PlanSlot {
    plan: RwLock<RemediationPlan>,
    pub(crate) execution: tokio::sync::Mutex<()>,
}

impl PlanSlot {
    fn new(plan: RemediationPlan) -> Self {
        Self {
            plan: RwLock::new(plan),
            execution: tokio::sync::Mutex::new(()),
        }
    }

    pub(crate) fn snapshot(&self) -> RemediationPlan {
        self.plan.read().clone()
    }

    pub(crate) fn update<T>(&self, f: impl FnOnce(&mut RemediationPlan) -> T) -> T {
        f(&mut self.plan.write())
    }
}

/// Plans keyed by incident ID.
///
/// At most one plan exists per incident; creating a plan replaces the
/// previous one. A plan must have at least one step and unique step IDs. Plans that reached a terminal state are evicted once they
/// have been finished for longer than the retention period.
#[derive(Debug)]
pub struct PlanStore {
    plans: DashMap<u64, Arc<PlanSlot>>,
    retention: SignedDuration,
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl PlanStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            plans: DashMap::new(),
            retention: SignedDuration::try_from(retention).unwrap_or(SignedDuration::MAX),
        }
    }

    /// Store `plan`, replacing any plan for the same incident. Steps are
    /// stored pending in their given order, whatever state they carried.
    ///
    /// # Errors
    ///
    /// - `EmptyPlan` when the plan has no steps
    /// - `DuplicateStep` when two steps share an ID
    pub fn create_plan(&self, plan: RemediationPlan) -> Result<RemediationPlan, ExecutionError> {
        let plan = RemediationPlan::new(plan.incident_id, plan.diagnosis_id, plan.steps);
        let snapshot = plan.clone();
        self.insert(plan)?;
        Ok(snapshot)
    }

    pub(crate) fn insert(&self, plan: RemediationPlan) -> Result<Arc<PlanSlot>, ExecutionError> {
        validate(&plan)?;
        self.sweep();

        let incident_id = plan.incident_id;
        let slot = Arc::new(PlanSlot::new(plan));
        if self.plans.insert(incident_id, Arc::clone(&slot)).is_some() {
            debug!("Replaced remediation plan for incident {incident_id}");
        }
        Ok(slot)
    }

    pub(crate) fn slot(&self, incident_id: u64) -> Option<Arc<PlanSlot>> {
        let now = Timestamp::now();
        self.plans
            .remove_if(&incident_id, |_, slot| self.is_expired(&slot.plan.read(), now));
        self.plans
            .get(&incident_id)
            .map(|slot| Arc::clone(slot.value()))
    }

    /// Snapshot of the plan for an incident.
    pub fn get_plan(&self, incident_id: u64) -> Option<RemediationPlan> {
        self.slot(incident_id).map(|slot| slot.snapshot())
    }

    pub fn progress(&self, incident_id: u64) -> Option<RemediationProgress> {
        self.slot(incident_id).map(|slot| slot.snapshot().progress())
    }

    fn is_expired(&self, plan: &RemediationPlan, now: Timestamp) -> bool {
        match plan.completed_at {
            Some(completed_at) if plan.status().is_terminal() => {
                now.duration_since(completed_at) >= self.retention
            }
            _ => false,
        }
    }

    /// Evict expired plans and return how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Timestamp::now())
    }

    pub fn sweep_at(&self, now: Timestamp) -> usize {
        let before = self.plans.len();
        self.plans
            .retain(|_, slot| !self.is_expired(&slot.plan.read(), now));
        let evicted = before.saturating_sub(self.plans.len());
        if evicted > 0 {
            debug!("Evicted {evicted} expired remediation plans");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

fn validate(plan: &RemediationPlan) -> Result<(), ExecutionError> {
    let incident_id = plan.incident_id;
    if plan.steps.is_empty() {
        return Err(ExecutionError::EmptyPlan { incident_id });
    }

    let mut seen = HashSet::new();
    match plan.steps.iter().find(|step| !seen.insert(step.id.as_str())) {
        Some(step) => Err(ExecutionError::DuplicateStep {
            incident_id,
            step_id: step.id.clone(),
        }),
        None => Ok(()),
    }
}

mod common;

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

use common::RecordingActions;
use remedy_core::{
    error::{ErrorKind, ExecutionError},
    models::{
        Confidence, Diagnosis, DiagnosisRef, ProgressStatus, RemediationAction, RemediationPlan,
        RemediationStep, StepStatus,
    },
    remediation::{plan_from_diagnosis, PlanStore, RemediationExecutor},
};
use tokio_util::sync::CancellationToken;

fn diagnosis(steps: &[&str]) -> Diagnosis {
    Diagnosis {
        root_cause: "Connection pool exhausted".to_string(),
        steps: steps.iter().map(ToString::to_string).collect(),
        confidence: Confidence::High,
    }
}

fn executor(actions: Arc<RecordingActions>) -> RemediationExecutor {
    RemediationExecutor::new(Arc::new(PlanStore::default()), actions)
}

fn statuses(executor: &RemediationExecutor, incident_id: u64) -> Vec<StepStatus> {
    executor
        .get_progress(incident_id)
        .unwrap()
        .steps
        .iter()
        .map(|s| s.status)
        .collect()
}

#[tokio::test]
async fn test_execute_all_runs_steps_in_order() {
    let actions = Arc::new(RecordingActions::new(Duration::from_millis(5)));
    let executor = executor(actions.clone());
    let cancel = CancellationToken::new();

    let progress = executor
        .execute_all_steps(
            1,
            &diagnosis(&["restart api", "scale db to 3", "notify the DBA"]),
            Some(DiagnosisRef(10)),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(
        actions.executed(),
        vec!["restart api", "scale db 3", "manual notify the DBA"]
    );
    assert_eq!(progress.status, ProgressStatus::Completed);
    assert_eq!(progress.current_step_index, 3);
    assert_eq!(progress.diagnosis_id, Some(DiagnosisRef(10)));
    assert!(progress.started_at.is_some());
    assert!(progress.completed_at.is_some());
    assert!(progress.error_message.is_none());
    assert_eq!(
        progress.steps.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        vec!["step-1", "step-2", "step-3"]
    );
    assert_eq!(
        progress.steps[0].outcome.as_deref(),
        Some("done: restart api")
    );
}

#[tokio::test]
async fn test_execute_all_stops_at_first_failure() {
    let actions = Arc::new(RecordingActions::new(Duration::ZERO).failing_on("api"));
    let executor = executor(actions.clone());

    let progress = executor
        .execute_all_steps(
            2,
            &diagnosis(&["notify the DBA", "restart api", "scale db to 3"]),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(progress.status, ProgressStatus::Failed);
    assert_eq!(progress.current_step_index, 1);
    assert_eq!(
        progress.error_message.as_deref(),
        Some("Action target 'api' is unavailable")
    );
    assert_eq!(
        statuses(&executor, 2),
        vec![StepStatus::Completed, StepStatus::Failed, StepStatus::Pending]
    );
    assert_eq!(actions.executed().len(), 2);
}

#[tokio::test]
async fn test_empty_diagnosis_is_rejected() {
    let executor = executor(Arc::new(RecordingActions::new(Duration::ZERO)));

    let err = executor
        .execute_all_steps(3, &diagnosis(&[]), None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, ExecutionError::EmptyPlan { incident_id: 3 });
    assert!(executor.get_plan(3).is_none());
}

#[tokio::test]
async fn test_missing_plan_and_step() {
    let executor = executor(Arc::new(RecordingActions::new(Duration::ZERO)));
    let cancel = CancellationToken::new();

    let err = executor.execute_step(5, "step-1", &cancel).await.unwrap_err();
    assert_eq!(err, ExecutionError::PlanNotFound { incident_id: 5 });
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(
        executor.get_progress(5),
        Err(ExecutionError::PlanNotFound { incident_id: 5 })
    ));

    executor.create_plan(plan_from_diagnosis(5, &diagnosis(&["restart api"]), None)).unwrap();
    let err = executor.execute_step(5, "step-9", &cancel).await.unwrap_err();
    assert_eq!(
        err,
        ExecutionError::StepNotFound {
            incident_id: 5,
            step_id: "step-9".to_string()
        }
    );
}

#[tokio::test]
async fn test_completed_step_cannot_rerun_but_failed_can() {
    let actions = Arc::new(RecordingActions::new(Duration::ZERO).failing_on("api"));
    let executor = executor(actions.clone());
    let cancel = CancellationToken::new();
    executor
        .create_plan(plan_from_diagnosis(
            6,
            &diagnosis(&["notify the DBA", "restart api"]),
            None,
        ))
        .unwrap();

    let step = executor.execute_step(6, "step-1", &cancel).await.unwrap();
    assert_eq!(step.status, StepStatus::Completed);

    let err = executor.execute_step(6, "step-1", &cancel).await.unwrap_err();
    assert_eq!(
        err,
        ExecutionError::StepNotRunnable {
            step_id: "step-1".to_string(),
            status: StepStatus::Completed
        }
    );
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let failed = executor.execute_step(6, "step-2", &cancel).await.unwrap();
    assert_eq!(failed.status, StepStatus::Failed);
    assert_eq!(
        failed.outcome.as_deref(),
        Some("Action target 'api' is unavailable")
    );

    let retried = executor.execute_step(6, "step-2", &cancel).await.unwrap();
    assert_eq!(retried.status, StepStatus::Failed);
    assert_eq!(actions.executed().len(), 3);
}

#[tokio::test]
async fn test_step_without_action_completes() {
    let actions = Arc::new(RecordingActions::new(Duration::ZERO));
    let executor = executor(actions.clone());
    executor
        .create_plan(RemediationPlan::new(
            7,
            None,
            vec![RemediationStep::new("check", "Look at the dashboard", None)],
        ))
        .unwrap();

    let step = executor
        .execute_step(7, "check", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(step.status, StepStatus::Completed);
    assert!(actions.executed().is_empty());
    assert_eq!(
        executor.get_progress(7).unwrap().status,
        ProgressStatus::Completed
    );
}

#[tokio::test]
async fn test_in_progress_is_observable() {
    let actions = Arc::new(RecordingActions::new(Duration::from_millis(300)));
    let executor = Arc::new(executor(actions));
    executor.create_plan(plan_from_diagnosis(8, &diagnosis(&["restart api"]), None)).unwrap();

    let running = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            executor
                .execute_step(8, "step-1", &CancellationToken::new())
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let progress = executor.get_progress(8).unwrap();
    assert_eq!(progress.steps[0].status, StepStatus::InProgress);
    assert_eq!(progress.status, ProgressStatus::InProgress);
    assert!(progress.started_at.is_some());
    assert!(progress.completed_at.is_none());

    let step = running.await.unwrap().unwrap();
    assert_eq!(step.status, StepStatus::Completed);
}

#[tokio::test]
async fn test_execution_is_serialized_per_incident() {
    let actions = Arc::new(RecordingActions::new(Duration::from_millis(50)));
    let executor = Arc::new(executor(actions.clone()));
    executor
        .create_plan(plan_from_diagnosis(
            9,
            &diagnosis(&["restart api", "restart worker"]),
            None,
        ))
        .unwrap();

    let handles: Vec<_> = ["step-1", "step-2"]
        .into_iter()
        .map(|step_id| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                executor
                    .execute_step(9, step_id, &CancellationToken::new())
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(actions.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(
        statuses(&executor, 9),
        vec![StepStatus::Completed, StepStatus::Completed]
    );
}

#[tokio::test]
async fn test_different_incidents_run_concurrently() {
    let actions = Arc::new(RecordingActions::new(Duration::from_millis(100)));
    let executor = Arc::new(executor(actions.clone()));
    for incident_id in [10, 11] {
        executor
            .create_plan(plan_from_diagnosis(
                incident_id,
                &diagnosis(&["restart api"]),
                None,
            ))
            .unwrap();
    }

    let handles: Vec<_> = [10, 11]
        .into_iter()
        .map(|incident_id| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                executor
                    .execute_step(incident_id, "step-1", &CancellationToken::new())
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(actions.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let actions = Arc::new(RecordingActions::new(Duration::ZERO));
    let executor = executor(actions.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = executor
        .execute_all_steps(12, &diagnosis(&["restart api", "restart worker"]), None, &cancel)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExecutionError::Cancelled {
            incident_id: 12,
            step_id: "step-1".to_string()
        }
    );
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(actions.executed().is_empty());

    let progress = executor.get_progress(12).unwrap();
    assert_eq!(progress.status, ProgressStatus::Failed);
    assert_eq!(
        progress.steps[0].outcome.as_deref(),
        Some("cancelled before execution")
    );
    assert_eq!(progress.steps[1].status, StepStatus::Pending);
}

#[tokio::test]
async fn test_cancel_during_run_stops_before_next_step() {
    let actions = Arc::new(RecordingActions::new(Duration::from_millis(150)));
    let executor = Arc::new(executor(actions.clone()));
    let cancel = CancellationToken::new();

    let running = {
        let executor = Arc::clone(&executor);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            executor
                .execute_all_steps(
                    13,
                    &diagnosis(&["restart api", "restart worker"]),
                    None,
                    &cancel,
                )
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let err = running.await.unwrap().unwrap_err();
    assert_eq!(
        err,
        ExecutionError::Cancelled {
            incident_id: 13,
            step_id: "step-2".to_string()
        }
    );
    assert_eq!(actions.executed(), vec!["restart api"]);
    assert_eq!(
        statuses(&executor, 13),
        vec![StepStatus::Completed, StepStatus::Failed]
    );
}

#[tokio::test]
async fn test_finished_plans_expire() {
    let actions = Arc::new(RecordingActions::new(Duration::ZERO));
    let executor = RemediationExecutor::new(Arc::new(PlanStore::new(Duration::ZERO)), actions);

    executor
        .execute_all_steps(14, &diagnosis(&["restart api"]), None, &CancellationToken::new())
        .await
        .unwrap();

    assert!(executor.get_plan(14).is_none());
    assert!(executor.store().is_empty());
}

#[tokio::test]
async fn test_unfinished_plans_are_kept() {
    let executor = RemediationExecutor::new(
        Arc::new(PlanStore::new(Duration::ZERO)),
        Arc::new(RecordingActions::new(Duration::ZERO)),
    );
    executor.create_plan(plan_from_diagnosis(15, &diagnosis(&["restart api"]), None)).unwrap();

    assert_eq!(executor.store().sweep(), 0);
    assert!(executor.get_plan(15).is_some());
}

#[tokio::test]
async fn test_replacing_plan_during_execution() {
    let actions = Arc::new(RecordingActions::new(Duration::from_millis(150)));
    let executor = Arc::new(executor(actions.clone()));
    executor.create_plan(plan_from_diagnosis(16, &diagnosis(&["restart api"]), None)).unwrap();

    let running = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            executor
                .execute_step(16, "step-1", &CancellationToken::new())
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    executor
        .create_plan(plan_from_diagnosis(
            16,
            &diagnosis(&["restart worker", "notify the DBA"]),
            None,
        ))
        .unwrap();

    let finished = running.await.unwrap().unwrap();
    assert_eq!(finished.status, StepStatus::Completed);

    // The replacement plan is untouched by the old run
    let plan = executor.get_plan(16).unwrap();
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].description, "restart worker");
    assert!(plan.steps.iter().all(|s| s.status == StepStatus::Pending));
}

fn restart_then_notify(incident_id: u64) -> RemediationPlan {
    RemediationPlan::new(
        incident_id,
        None,
        vec![
            RemediationStep::new(
                "a",
                "restart api",
                Some(RemediationAction::RestartService {
                    service_name: "api".to_string(),
                }),
            ),
            RemediationStep::new(
                "b",
                "notify on-call",
                Some(RemediationAction::ManualStep {
                    instructions: "notify on-call".to_string(),
                }),
            ),
        ],
    )
}

#[tokio::test]
async fn test_stepwise_execution_completes_plan() {
    let actions = Arc::new(RecordingActions::new(Duration::ZERO));
    let executor = executor(actions.clone());
    let cancel = CancellationToken::new();
    executor.create_plan(restart_then_notify(17)).unwrap();

    let progress = executor.get_progress(17).unwrap();
    assert_eq!(progress.status, ProgressStatus::NotStarted);
    assert_eq!(progress.current_step_index, 0);

    executor.execute_step(17, "a", &cancel).await.unwrap();
    let progress = executor.get_progress(17).unwrap();
    assert_eq!(progress.status, ProgressStatus::InProgress);
    assert_eq!(progress.current_step_index, 1);
    assert!(progress.completed_at.is_none());

    executor.execute_step(17, "b", &cancel).await.unwrap();
    let progress = executor.get_progress(17).unwrap();
    assert_eq!(progress.status, ProgressStatus::Completed);
    assert_eq!(progress.current_step_index, 2);
    assert!(progress.completed_at.is_some());
    assert!(progress.error_message.is_none());
    assert!(progress.steps.iter().all(|s| s.outcome.is_some()));
    assert_eq!(actions.executed(), vec!["restart api", "manual notify on-call"]);
}

#[tokio::test]
async fn test_created_plan_is_stored_pending_in_order() {
    let executor = executor(Arc::new(RecordingActions::new(Duration::ZERO)));
    let mut plan = restart_then_notify(18);
    plan.diagnosis_id = Some(DiagnosisRef(4));
    plan.steps[0].status = StepStatus::Completed;
    plan.steps[0].outcome = Some("restarted earlier".to_string());
    plan.steps[1].status = StepStatus::Failed;
    plan.steps[1].outcome = Some("boom".to_string());

    let created = executor.create_plan(plan).unwrap();
    let stored = executor.get_plan(18).unwrap();

    assert_eq!(created, stored);
    assert_eq!(stored.diagnosis_id, Some(DiagnosisRef(4)));
    assert_eq!(
        stored.steps.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
    assert!(stored
        .steps
        .iter()
        .all(|s| s.status == StepStatus::Pending && s.outcome.is_none()));
    assert!(stored.started_at.is_none());
    assert_eq!(
        executor.get_progress(18).unwrap().status,
        ProgressStatus::NotStarted
    );
}

#[tokio::test]
async fn test_malformed_plan_keeps_existing_one() {
    let executor = executor(Arc::new(RecordingActions::new(Duration::ZERO)));
    executor.create_plan(restart_then_notify(19)).unwrap();

    let err = executor
        .create_plan(RemediationPlan::new(19, None, Vec::new()))
        .unwrap_err();
    assert_eq!(err, ExecutionError::EmptyPlan { incident_id: 19 });
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut steps = restart_then_notify(19).steps;
    steps[1].id = "a".to_string();
    let err = executor
        .create_plan(RemediationPlan::new(19, None, steps))
        .unwrap_err();
    assert_eq!(
        err,
        ExecutionError::DuplicateStep {
            incident_id: 19,
            step_id: "a".to_string()
        }
    );

    assert_eq!(executor.get_plan(19).unwrap().steps.len(), 2);
}

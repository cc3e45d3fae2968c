#[cfg(test)]
mod model_tests {
    use std::num::NonZeroU32;

    use crate::models::{
        Confidence, DiagnosisRef, IncidentStatus, Page, ProgressStatus, RemediationAction,
        RemediationPlan, RemediationStep, Severity, StatusKind, StepStatus,
    };

    fn create_test_step(id: &str, status: StepStatus) -> RemediationStep {
        RemediationStep {
            id: id.to_string(),
            description: format!("Step {id}"),
            action: Some(RemediationAction::ManualStep {
                instructions: "check dashboards".to_string(),
            }),
            status,
            outcome: match status {
                StepStatus::Completed => Some("done".to_string()),
                StepStatus::Failed => Some("boom".to_string()),
                _ => None,
            },
        }
    }

    fn plan_with(statuses: &[StepStatus]) -> RemediationPlan {
        let mut plan = RemediationPlan::new(7, Some(DiagnosisRef(3)), Vec::new());
        plan.steps = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| create_test_step(&format!("step-{}", i + 1), *status))
            .collect();
        plan
    }

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("HiGh".parse::<Severity>(), Ok(Severity::High));
        assert_eq!(" info ".parse::<Severity>(), Ok(Severity::Info));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_lenient_fallback() {
        assert_eq!(Severity::parse_lenient(None), Severity::Medium);
        assert_eq!(Severity::parse_lenient(Some("")), Severity::Medium);
        assert_eq!(Severity::parse_lenient(Some("sev-1")), Severity::Medium);
        assert_eq!(Severity::parse_lenient(Some("LOW")), Severity::Low);
    }

    #[test]
    fn test_status_from_parts() {
        assert_eq!(
            IncidentStatus::from_parts(StatusKind::Diagnosed, Some(9)),
            Ok(IncidentStatus::Diagnosed(DiagnosisRef(9)))
        );
        assert!(IncidentStatus::from_parts(StatusKind::Diagnosed, None).is_err());
        assert_eq!(
            IncidentStatus::from_parts(StatusKind::Resolved, Some(9)),
            Ok(IncidentStatus::Resolved)
        );
    }

    #[test]
    fn test_incident_status_serializes_with_payload() {
        let json = serde_json::to_string(&IncidentStatus::Diagnosed(DiagnosisRef(4))).unwrap();
        assert_eq!(json, r#"{"state":"diagnosed","diagnosis":4}"#);

        let json = serde_json::to_string(&IncidentStatus::Open).unwrap();
        assert_eq!(json, r#"{"state":"open"}"#);
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!("high".parse::<Confidence>(), Ok(Confidence::High));
        assert_eq!("Low".parse::<Confidence>(), Ok(Confidence::Low));
        assert!("certain".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_new_plan_resets_steps_to_pending() {
        let plan = RemediationPlan::new(
            1,
            None,
            vec![create_test_step("a", StepStatus::Completed)],
        );
        assert_eq!(plan.steps[0].status, StepStatus::Pending);
        assert_eq!(plan.steps[0].outcome, None);
        assert_eq!(plan.status(), ProgressStatus::NotStarted);
    }

    #[test]
    fn test_progress_not_started() {
        let progress = plan_with(&[StepStatus::Pending, StepStatus::Pending]).progress();
        assert_eq!(progress.status, ProgressStatus::NotStarted);
        assert_eq!(progress.current_step_index, 0);
        assert_eq!(progress.error_message, None);
    }

    #[test]
    fn test_progress_in_progress_cursor() {
        let progress = plan_with(&[
            StepStatus::Completed,
            StepStatus::InProgress,
            StepStatus::Pending,
        ])
        .progress();
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert_eq!(progress.current_step_index, 1);
    }

    #[test]
    fn test_progress_completed_moves_cursor_past_last_step() {
        let progress = plan_with(&[StepStatus::Completed, StepStatus::Completed]).progress();
        assert_eq!(progress.status, ProgressStatus::Completed);
        assert_eq!(progress.current_step_index, 2);
        assert_eq!(progress.diagnosis_id, Some(DiagnosisRef(3)));
    }

    #[test]
    fn test_progress_failed_reports_error_message() {
        let progress = plan_with(&[
            StepStatus::Completed,
            StepStatus::Failed,
            StepStatus::Pending,
        ])
        .progress();
        assert_eq!(progress.status, ProgressStatus::Failed);
        assert_eq!(progress.current_step_index, 1);
        assert_eq!(progress.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_scale_action_serialization() {
        let action = RemediationAction::ScaleCluster {
            cluster_id: "c1".to_string(),
            desired_capacity: NonZeroU32::new(4).unwrap(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "scale_cluster");
        assert_eq!(json["desired_capacity"], 4);
    }

    #[test]
    fn test_page_clamps_limit() {
        assert_eq!(Page::new(0, 5).limit, 1);
        assert_eq!(Page::new(10_000, 0).limit, 500);
        assert_eq!(Page::default().limit, 50);
    }
}

//! Display implementations for domain models.
//!
//! All output is markdown so the CLI can render it with styling.

use std::fmt;

use super::datetime::{LocalDateTime, MaybeDateTime};
use crate::models::{
    Confidence, Diagnosis, Incident, IncidentStatus, ProgressStatus, RemediationAction,
    RemediationProgress, RemediationStep, Severity, StatusKind, StepStatus, StoredDiagnosis,
};

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diagnosis() {
            Some(reference) => write!(f, "{} (diagnosis #{})", self.kind(), reference.0),
            None => write!(f, "{}", self.kind()),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.title)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Severity: {}", self.severity)?;
        writeln!(f, "- Source: {}", self.source)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Root cause ({} confidence)", self.confidence)?;
        writeln!(f)?;
        writeln!(f, "{}", self.root_cause)?;
        writeln!(f)?;
        writeln!(f, "## Remediation steps")?;
        writeln!(f)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {step}", i + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for StoredDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# Diagnosis #{} for incident {}",
            self.id.0, self.incident_id
        )?;
        writeln!(f)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;
        write!(f, "{}", self.diagnosis)
    }
}

impl fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemediationAction::RestartService { service_name } => {
                write!(f, "restart service `{service_name}`")
            }
            RemediationAction::ScaleCluster {
                cluster_id,
                desired_capacity,
            } => write!(f, "scale cluster `{cluster_id}` to {desired_capacity}"),
            RemediationAction::ManualStep { .. } => f.write_str("manual"),
        }
    }
}

impl fmt::Display for RemediationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {} {} ({})",
            self.id,
            self.description,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if let Some(action) = &self.action {
            writeln!(f, "- Action: {action}")?;
        }
        if let Some(outcome) = &self.outcome {
            writeln!(f, "- Outcome: {outcome}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RemediationProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let completed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();

        writeln!(
            f,
            "# Remediation for incident {} ({}/{})",
            self.incident_id,
            completed,
            self.steps.len()
        )?;
        writeln!(f)?;
        writeln!(f, "- Status: {}", self.status)?;
        if let Some(reference) = self.diagnosis_id {
            writeln!(f, "- Diagnosis: #{}", reference.0)?;
        }
        writeln!(f, "- Started: {}", MaybeDateTime(self.started_at.as_ref()))?;
        writeln!(f, "- Finished: {}", MaybeDateTime(self.completed_at.as_ref()))?;
        if let Some(error) = &self.error_message {
            writeln!(f, "- Error: {error}")?;
        }
        writeln!(f)?;

        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

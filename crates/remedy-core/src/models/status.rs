//! Status and classification enumerations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Incident severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    /// Fallback for absent or unparsable input
    #[default]
    Medium,
    Low,
    Info,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" => Ok(Severity::Info),
            _ => Err(format!("Invalid severity: {s}")),
        }
    }
}

impl Severity {
    /// Parse a submitted severity, falling back to [`Severity::Medium`] when
    /// the value is absent or not recognised. Never fails.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
        }
    }
}

/// Reference to a stored diagnosis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DiagnosisRef(pub u64);

/// Lifecycle state of an incident.
///
/// States only move forward: `Open → Acknowledged → Diagnosed → Resolved`.
/// See [`crate::lifecycle::advance`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", content = "diagnosis", rename_all = "lowercase")]
pub enum IncidentStatus {
    #[default]
    Open,
    Acknowledged,
    Diagnosed(DiagnosisRef),
    Resolved,
}

/// Payload-free view of [`IncidentStatus`], used for filtering and errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Open,
    Acknowledged,
    Diagnosed,
    Resolved,
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(StatusKind::Open),
            "acknowledged" | "ack" => Ok(StatusKind::Acknowledged),
            "diagnosed" => Ok(StatusKind::Diagnosed),
            "resolved" => Ok(StatusKind::Resolved),
            _ => Err(format!("Invalid incident status: {s}")),
        }
    }
}

impl StatusKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Open => "open",
            StatusKind::Acknowledged => "acknowledged",
            StatusKind::Diagnosed => "diagnosed",
            StatusKind::Resolved => "resolved",
        }
    }
}

impl IncidentStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            IncidentStatus::Open => StatusKind::Open,
            IncidentStatus::Acknowledged => StatusKind::Acknowledged,
            IncidentStatus::Diagnosed(_) => StatusKind::Diagnosed,
            IncidentStatus::Resolved => StatusKind::Resolved,
        }
    }

    /// The diagnosis attached to this status, if any.
    pub fn diagnosis(&self) -> Option<DiagnosisRef> {
        match self {
            IncidentStatus::Diagnosed(reference) => Some(*reference),
            _ => None,
        }
    }

    /// Rebuild a status from its stored columns.
    pub fn from_parts(kind: StatusKind, diagnosis: Option<u64>) -> Result<Self, String> {
        match (kind, diagnosis) {
            (StatusKind::Open, _) => Ok(IncidentStatus::Open),
            (StatusKind::Acknowledged, _) => Ok(IncidentStatus::Acknowledged),
            (StatusKind::Diagnosed, Some(id)) => Ok(IncidentStatus::Diagnosed(DiagnosisRef(id))),
            (StatusKind::Diagnosed, None) => {
                Err("Diagnosed incident is missing its diagnosis reference".to_string())
            }
            (StatusKind::Resolved, _) => Ok(IncidentStatus::Resolved),
        }
    }
}

/// Confidence attached to a diagnosis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("Invalid confidence: {s}")),
        }
    }
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

/// Execution state of a single remediation step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step has not been started
    #[default]
    Pending,

    /// Step action is running
    InProgress,

    /// Step finished successfully
    Completed,

    /// Step action faulted or was cancelled
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }

    /// Whether the step has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use remedy_core::models::StepStatus;
    ///
    /// assert_eq!(StepStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(StepStatus::Failed.with_icon(), "✗ Failed");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepStatus::Pending => "○ Pending",
            StepStatus::InProgress => "➤ In Progress",
            StepStatus::Completed => "✓ Completed",
            StepStatus::Failed => "✗ Failed",
        }
    }
}

/// Overall state of a remediation plan, derived from its steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Failed)
    }
}

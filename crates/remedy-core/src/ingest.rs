//! Validation and normalization of inbound incident submissions.
//!
//! Submissions arrive as loosely-typed [`IncidentSubmission`]s. [`validate`]
//! reports every violated constraint at once, [`normalize`] turns a valid
//! submission into an unpersisted [`Incident`], and [`Ingestor`] ties both to
//! the shared-secret check and the incident store.

use jiff::Timestamp;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::IngestError,
    models::{Incident, IncidentStatus, Severity, UNASSIGNED_ID},
    outcome::Violations,
    params::IncidentSubmission,
    repository::IncidentRepository,
};

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_SOURCE_CHARS: usize = 100;

/// Check a submission against the field constraints.
///
/// Lengths are counted in characters after trimming. Severity is never a
/// validation failure: unknown values fall back to MEDIUM.
pub fn validate(submission: &IncidentSubmission) -> Result<(), Vec<String>> {
    let title = submission.title.trim();
    let description = submission.description.trim();
    let source = submission.source.trim();

    let mut violations = Violations::new();
    violations
        .check(!title.is_empty(), "title must not be blank")
        .check(
            title.chars().count() <= MAX_TITLE_CHARS,
            format!("title must be at most {MAX_TITLE_CHARS} characters"),
        )
        .check(!description.is_empty(), "description must not be blank")
        .check(!source.is_empty(), "source must not be blank")
        .check(
            source.chars().count() <= MAX_SOURCE_CHARS,
            format!("source must be at most {MAX_SOURCE_CHARS} characters"),
        );

    violations.into_result(())
}

/// Validate a submission and build the incident it describes.
///
/// The incident is `Open`, carries the unassigned ID sentinel and has its
/// text fields trimmed.
pub fn normalize(submission: &IncidentSubmission) -> Result<Incident, Vec<String>> {
    validate(submission)?;

    let now = Timestamp::now();
    Ok(Incident {
        id: UNASSIGNED_ID,
        source: submission.source.trim().to_string(),
        title: submission.title.trim().to_string(),
        description: submission.description.trim().to_string(),
        severity: Severity::parse_lenient(submission.severity.as_deref()),
        status: IncidentStatus::Open,
        created_at: now,
        updated_at: now,
    })
}

/// Result of the shared-secret check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Unauthorized,
}

/// Secret that ingestion callers must present.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Compare the presented token with the configured secret.
    ///
    /// An empty configured secret authorizes nobody.
    pub fn authorize(&self, presented: Option<&str>) -> Authorization {
        let Some(presented) = presented else {
            return Authorization::Unauthorized;
        };
        if self.0.is_empty() {
            return Authorization::Unauthorized;
        }

        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        // Compare every byte so timing does not depend on the first mismatch
        let mut diff = expected.len() ^ presented.len();
        for (i, byte) in expected.iter().enumerate() {
            let other = presented.get(i).copied().unwrap_or(0);
            diff |= usize::from(byte ^ other);
        }

        if diff == 0 {
            Authorization::Authorized
        } else {
            Authorization::Unauthorized
        }
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Summary reported back to the submitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestionOutcome {
    pub id: u64,
    pub source: String,
    pub title: String,
    pub severity: Severity,
}

/// Turns authorized submissions into stored incidents.
pub struct Ingestor<'a> {
    repository: &'a dyn IncidentRepository,
}

impl<'a> Ingestor<'a> {
    pub fn new(repository: &'a dyn IncidentRepository) -> Self {
        Self { repository }
    }

    /// Validate, normalize and persist a submission.
    ///
    /// # Errors
    ///
    /// - `IngestError::Unauthorized` when the shared-secret check failed
    /// - `IngestError::Validation` listing every violated constraint
    /// - `IngestError::Persistence` when the store rejects the incident
    pub async fn ingest(
        &self,
        authorization: Authorization,
        submission: &IncidentSubmission,
    ) -> Result<IngestionOutcome, IngestError> {
        if authorization == Authorization::Unauthorized {
            warn!("Rejected unauthorized incident submission");
            return Err(IngestError::Unauthorized);
        }

        let incident = normalize(submission).map_err(|errors| {
            debug!("Incident submission failed validation: {errors:?}");
            IngestError::Validation { errors }
        })?;

        let created = self
            .repository
            .create(&incident)
            .await
            .map_err(|e| IngestError::Persistence {
                message: e.to_string(),
            })?;

        info!(
            "Ingested incident {} from '{}' with severity {}",
            created.id,
            created.source,
            created.severity.as_str()
        );

        Ok(IngestionOutcome {
            id: created.id,
            source: created.source,
            title: created.title,
            severity: created.severity,
        })
    }
}

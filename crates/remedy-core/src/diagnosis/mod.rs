//! Diagnosis pipeline.
//!
//! [`DiagnosisPipeline::diagnose`] runs a fixed sequence of stages for one
//! incident: load it, gather supporting context, ask the generator for a
//! proposal, parse the answer and persist the result. Every stage maps its
//! failure to exactly one [`DiagnosisError`] variant, and a failure at any
//! stage leaves the stored incident untouched.
//!
//! The context retriever and the generator are collaborators behind traits
//! so the pipeline can run against history in SQLite and a local model, or
//! against fakes in tests.

pub mod ollama;
pub mod parse;
pub mod prompt;
pub mod retrieval;

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{DiagnosisError, GeneratorError, LifecycleError, RetrievalError},
    lifecycle,
    models::{Incident, IncidentStatus, StoredDiagnosis},
    repository::IncidentRepository,
};

pub use ollama::OllamaGenerator;
pub use parse::parse_diagnosis;
pub use retrieval::HistoryRetriever;

/// Application the incidents belong to, used to ground the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppProfile {
    pub name: String,
    pub stack: String,
    pub components: Vec<String>,
}

impl Default for AppProfile {
    fn default() -> Self {
        Self {
            name: "application".to_string(),
            stack: "unspecified".to_string(),
            components: Vec::new(),
        }
    }
}

/// Tiers of supporting context, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTier {
    PastResolutions,
    VerifiedDiagnoses,
    Runbooks,
    SimilarIncidents,
}

impl ContextTier {
    pub const PRECEDENCE: [ContextTier; 4] = [
        ContextTier::PastResolutions,
        ContextTier::VerifiedDiagnoses,
        ContextTier::Runbooks,
        ContextTier::SimilarIncidents,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            ContextTier::PastResolutions => "Past resolutions",
            ContextTier::VerifiedDiagnoses => "Verified diagnoses",
            ContextTier::Runbooks => "Runbook procedures",
            ContextTier::SimilarIncidents => "Similar incidents",
        }
    }
}

/// Supporting material gathered for one incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub past_resolutions: Vec<String>,
    pub verified_diagnoses: Vec<String>,
    pub runbooks: Vec<String>,
    pub similar_incidents: Vec<String>,
}

impl RetrievedContext {
    pub fn entries(&self, tier: ContextTier) -> &[String] {
        match tier {
            ContextTier::PastResolutions => &self.past_resolutions,
            ContextTier::VerifiedDiagnoses => &self.verified_diagnoses,
            ContextTier::Runbooks => &self.runbooks,
            ContextTier::SimilarIncidents => &self.similar_incidents,
        }
    }

    pub fn is_empty(&self) -> bool {
        ContextTier::PRECEDENCE
            .iter()
            .all(|tier| self.entries(*tier).is_empty())
    }

    /// Number of entries across all tiers.
    pub fn len(&self) -> usize {
        ContextTier::PRECEDENCE
            .iter()
            .map(|tier| self.entries(*tier).len())
            .sum()
    }
}

/// Everything the generator receives for one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInputs {
    pub app: AppProfile,
    pub incident_text: String,
    pub context: RetrievedContext,
}

impl PromptInputs {
    pub fn new(app: &AppProfile, incident: &Incident, context: RetrievedContext) -> Self {
        Self {
            app: app.clone(),
            incident_text: incident_text(incident),
            context,
        }
    }
}

fn incident_text(incident: &Incident) -> String {
    format!(
        "Title: {}\nSeverity: {}\nSource: {}\nDescription: {}",
        incident.title,
        incident.severity.as_str(),
        incident.source,
        incident.description
    )
}

/// Finds supporting context for an incident.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Return context for `incident`, or `None` when nothing relevant exists.
    async fn retrieve_context(
        &self,
        incident: &Incident,
    ) -> Result<Option<RetrievedContext>, RetrievalError>;
}

/// Proposes a diagnosis as raw text, expected to contain a JSON object.
#[async_trait]
pub trait DiagnosisGenerator: Send + Sync {
    async fn propose(&self, inputs: &PromptInputs) -> Result<String, GeneratorError>;
}

/// Orchestrates the diagnosis of a single incident.
pub struct DiagnosisPipeline {
    repository: Arc<dyn IncidentRepository>,
    retriever: Arc<dyn ContextRetriever>,
    generator: Arc<dyn DiagnosisGenerator>,
    app: AppProfile,
}

impl DiagnosisPipeline {
    pub fn new(
        repository: Arc<dyn IncidentRepository>,
        retriever: Arc<dyn ContextRetriever>,
        generator: Arc<dyn DiagnosisGenerator>,
        app: AppProfile,
    ) -> Self {
        Self {
            repository,
            retriever,
            generator,
            app,
        }
    }

    pub fn app(&self) -> &AppProfile {
        &self.app
    }

    /// Diagnose an incident and move it to `Diagnosed`.
    ///
    /// On success the diagnosis is stored and the incident's status refers
    /// to it. Diagnosing an already diagnosed incident stores a newer
    /// diagnosis and re-points the status.
    ///
    /// # Errors
    ///
    /// - `IncidentNotFound` when no incident has this ID
    /// - `IncidentResolved` when the incident is already resolved
    /// - `RetrievalFailed` when no usable context is available
    /// - `LlmUnavailable` when the generator faults or cannot be reached
    /// - `LlmResponseInvalid` when the generator's answer cannot be parsed
    /// - `Persistence` when storing the diagnosis or status fails
    pub async fn diagnose(&self, incident_id: u64) -> Result<StoredDiagnosis, DiagnosisError> {
        let incident = self
            .repository
            .find_by_id(incident_id)
            .await?
            .ok_or(DiagnosisError::IncidentNotFound { id: incident_id })?;

        if incident.status == IncidentStatus::Resolved {
            debug!("Incident {incident_id} is resolved, skipping diagnosis");
            return Err(DiagnosisError::IncidentResolved { id: incident_id });
        }

        let context = self
            .retriever
            .retrieve_context(&incident)
            .await
            .unwrap_or_else(|e| {
                warn!("Context retrieval for incident {incident_id} failed: {e}");
                None
            })
            .filter(|context| !context.is_empty())
            .ok_or(DiagnosisError::RetrievalFailed { id: incident_id })?;
        debug!(
            "Retrieved {} context entries for incident {incident_id}",
            context.len()
        );

        let inputs = PromptInputs::new(&self.app, &incident, context);
        let raw = self.propose(inputs).await?;

        let diagnosis = parse_diagnosis(&raw).map_err(|e| {
            warn!("Discarding generator response for incident {incident_id}: {e}");
            e
        })?;

        let reference = self
            .repository
            .save_diagnosis(incident_id, &diagnosis)
            .await?;

        let (_, updated) = lifecycle::apply(
            self.repository.as_ref(),
            incident,
            IncidentStatus::Diagnosed(reference),
        )
        .await
        .map_err(|e| match e {
            LifecycleError::NotFound { id } => DiagnosisError::IncidentNotFound { id },
            LifecycleError::Transition(_) => {
                warn!(
                    "Incident {incident_id} was resolved while diagnosis #{} was stored",
                    reference.0
                );
                DiagnosisError::IncidentResolved { id: incident_id }
            }
            LifecycleError::Persistence(e) => e.into(),
        })?;

        info!(
            "Diagnosed incident {incident_id} (diagnosis #{}) with {} confidence",
            reference.0,
            diagnosis.confidence.as_str()
        );

        Ok(StoredDiagnosis {
            id: reference,
            incident_id,
            diagnosis,
            created_at: updated.updated_at,
        })
    }

    /// Call the generator on its own task so a panic is reported like any
    /// other unavailability.
    async fn propose(&self, inputs: PromptInputs) -> Result<String, DiagnosisError> {
        let generator = Arc::clone(&self.generator);

        tokio::spawn(async move { generator.propose(&inputs).await })
            .await
            .map_err(|e| DiagnosisError::LlmUnavailable {
                message: format!("generator task failed: {e}"),
            })?
            .map_err(|e| match e {
                GeneratorError::EmptyResponse => DiagnosisError::LlmResponseInvalid {
                    reason: e.to_string(),
                },
                other => DiagnosisError::LlmUnavailable {
                    message: other.to_string(),
                },
            })
    }
}

//! Incident operations for the engine.

use log::info;

use super::Remedy;
use crate::{
    display::{Incidents, StatusChange},
    error::{DiagnosisError, IngestError, LifecycleError, StoreError},
    ingest::{IngestionOutcome, Ingestor},
    lifecycle,
    models::{
        DiagnosisResult, Incident, IncidentFilter, IncidentStatus, Page, StoredDiagnosis,
    },
    params::{Id, IncidentSubmission, ListIncidents},
};

impl Remedy {
    /// Ingest a submission after checking `token` against the configured
    /// secret.
    pub async fn ingest(
        &self,
        token: Option<&str>,
        submission: &IncidentSubmission,
    ) -> Result<IngestionOutcome, IngestError> {
        let authorization = self.authorize(token);
        Ingestor::new(self.repository.as_ref())
            .ingest(authorization, submission)
            .await
    }

    /// List incidents matching the filter, newest first.
    pub async fn list_incidents(&self, params: &ListIncidents) -> Result<Incidents, StoreError> {
        let (filter, page): (IncidentFilter, Page) = params.into();
        let incidents = self.repository.search(&filter, &page).await?;
        Ok(Incidents(incidents))
    }

    pub async fn get_incident(&self, params: &Id) -> Result<Option<Incident>, StoreError> {
        self.repository.find_by_id(params.id).await
    }

    /// Latest stored diagnosis for an incident, if it was ever diagnosed.
    pub async fn latest_diagnosis(
        &self,
        params: &Id,
    ) -> Result<Option<StoredDiagnosis>, StoreError> {
        self.repository.latest_diagnosis(params.id).await
    }

    pub async fn acknowledge(&self, params: &Id) -> Result<StatusChange, LifecycleError> {
        self.transition(params.id, IncidentStatus::Acknowledged)
            .await
    }

    /// Resolve an incident. Any stored diagnosis is kept.
    pub async fn resolve(&self, params: &Id) -> Result<StatusChange, LifecycleError> {
        self.transition(params.id, IncidentStatus::Resolved).await
    }

    async fn transition(
        &self,
        incident_id: u64,
        target: IncidentStatus,
    ) -> Result<StatusChange, LifecycleError> {
        let incident = self
            .repository
            .find_by_id(incident_id)
            .await?
            .ok_or(LifecycleError::NotFound { id: incident_id })?;

        let (previous, updated) =
            lifecycle::apply(self.repository.as_ref(), incident, target).await?;

        info!(
            "Incident {incident_id} moved from {previous} to {}",
            updated.status.kind()
        );
        Ok(StatusChange::new(previous, updated))
    }

    /// Run the diagnosis pipeline for an incident.
    pub async fn diagnose(&self, params: &Id) -> Result<StoredDiagnosis, DiagnosisError> {
        self.pipeline.diagnose(params.id).await
    }

    /// Run the diagnosis pipeline and fold the outcome into a reportable
    /// result.
    pub async fn diagnose_result(&self, params: &Id) -> DiagnosisResult {
        self.diagnose(params)
            .await
            .map(|stored| stored.diagnosis)
            .into()
    }
}

//! Context retrieval from incident history and local runbooks.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use log::debug;
use tokio::task;

use super::{ContextRetriever, RetrievedContext};
use crate::{
    error::{RetrievalError, StoreError},
    models::{Incident, IncidentFilter, IncidentStatus, Page},
    repository::IncidentRepository,
};

const HISTORY_WINDOW: u32 = 20;

/// Builds context from earlier incidents of the same source and from a
/// directory of markdown runbooks.
///
/// A runbook is included when its file stem (with `-` and `_` read as
/// spaces) appears in the incident's title, description or source.
pub struct HistoryRetriever {
    repository: Arc<dyn IncidentRepository>,
    runbook_dir: Option<PathBuf>,
}

impl HistoryRetriever {
    pub fn new(repository: Arc<dyn IncidentRepository>) -> Self {
        Self {
            repository,
            runbook_dir: None,
        }
    }

    pub fn with_runbook_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runbook_dir = Some(dir.into());
        self
    }

    async fn history(
        &self,
        incident: &Incident,
        context: &mut RetrievedContext,
    ) -> Result<(), StoreError> {
        let filter = IncidentFilter::for_source(incident.source.clone());
        let related = self
            .repository
            .search(&filter, &Page::new(HISTORY_WINDOW, 0))
            .await?;

        for other in related.into_iter().filter(|other| other.id != incident.id) {
            match other.status {
                IncidentStatus::Resolved | IncidentStatus::Diagnosed(_) => {
                    let Some(stored) = self.repository.latest_diagnosis(other.id).await? else {
                        context.similar_incidents.push(summarize(&other));
                        continue;
                    };
                    let entry = format!(
                        "Incident #{} '{}': root cause: {} Steps: {}",
                        other.id,
                        other.title,
                        stored.diagnosis.root_cause,
                        stored.diagnosis.steps.join("; ")
                    );
                    if other.status == IncidentStatus::Resolved {
                        context.past_resolutions.push(entry);
                    } else {
                        context.verified_diagnoses.push(entry);
                    }
                }
                IncidentStatus::Open | IncidentStatus::Acknowledged => {
                    context.similar_incidents.push(summarize(&other));
                }
            }
        }

        Ok(())
    }
}

fn summarize(incident: &Incident) -> String {
    format!(
        "Incident #{} '{}' ({}, {}): {}",
        incident.id,
        incident.title,
        incident.severity.as_str(),
        incident.status.kind().as_str(),
        incident.description
    )
}

fn runbook_matches(stem: &str, haystack: &str) -> bool {
    let needle = stem.to_lowercase().replace(['-', '_'], " ");
    !needle.trim().is_empty() && haystack.contains(needle.trim())
}

/// Read every `.md` runbook in `dir` whose name matches `haystack`.
fn matching_runbooks(dir: &Path, haystack: &str) -> Result<Vec<String>, RetrievalError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RetrievalError::Runbook { path, source }
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut runbooks = Vec::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !runbook_matches(stem, haystack) {
            continue;
        }
        let body = fs::read_to_string(&path).map_err(io_error(&path))?;
        if !body.trim().is_empty() {
            runbooks.push(format!("{stem}: {}", body.trim()));
        }
    }
    Ok(runbooks)
}

#[async_trait]
impl ContextRetriever for HistoryRetriever {
    async fn retrieve_context(
        &self,
        incident: &Incident,
    ) -> Result<Option<RetrievedContext>, RetrievalError> {
        let mut context = RetrievedContext::default();
        self.history(incident, &mut context).await?;

        if let Some(dir) = self.runbook_dir.clone() {
            let haystack = format!(
                "{} {} {}",
                incident.title, incident.description, incident.source
            )
            .to_lowercase();
            context.runbooks = task::spawn_blocking(move || matching_runbooks(&dir, &haystack))
                .await
                .map_err(|e| RetrievalError::Store(StoreError::join(e)))??;
        }

        debug!(
            "Context for incident {}: {} resolutions, {} diagnoses, {} runbooks, {} similar",
            incident.id,
            context.past_resolutions.len(),
            context.verified_diagnoses.len(),
            context.runbooks.len(),
            context.similar_incidents.len()
        );

        Ok((!context.is_empty()).then_some(context))
    }
}

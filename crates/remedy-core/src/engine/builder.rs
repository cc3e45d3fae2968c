//! Builder for creating and configuring [`Remedy`] instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use log::debug;

use super::Remedy;
use crate::{
    diagnosis::{
        ollama::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL},
        AppProfile, ContextRetriever, DiagnosisGenerator, DiagnosisPipeline, HistoryRetriever,
        OllamaGenerator,
    },
    error::{BuildError, StoreError},
    ingest::SharedSecret,
    remediation::{
        ActionExecutor, PlanStore, RemediationExecutor, SimulatedActionExecutor,
        DEFAULT_RETENTION,
    },
    repository::{IncidentRepository, SqliteIncidentStore},
};

/// Builder for creating and configuring [`Remedy`] instances.
///
/// Every collaborator has a production default; tests and embedders can
/// swap any of them in.
pub struct RemedyBuilder {
    database_path: Option<PathBuf>,
    app: AppProfile,
    retention: Duration,
    ollama_url: String,
    model: String,
    runbook_dir: Option<PathBuf>,
    action_latency: Duration,
    ingest_secret: Option<String>,
    repository: Option<Arc<dyn IncidentRepository>>,
    retriever: Option<Arc<dyn ContextRetriever>>,
    generator: Option<Arc<dyn DiagnosisGenerator>>,
    actions: Option<Arc<dyn ActionExecutor>>,
}

impl RemedyBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            app: AppProfile::default(),
            retention: DEFAULT_RETENTION,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            runbook_dir: None,
            action_latency: SimulatedActionExecutor::DEFAULT_LATENCY,
            ingest_secret: None,
            repository: None,
            retriever: None,
            generator: None,
            actions: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/remedy/remedy.db` or `~/.local/share/remedy/remedy.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_app_profile(mut self, app: AppProfile) -> Self {
        self.app = app;
        self
    }

    /// How long finished remediation plans stay queryable.
    pub fn with_plan_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_ollama(mut self, url: impl Into<String>, model: impl Into<String>) -> Self {
        self.ollama_url = url.into();
        self.model = model.into();
        self
    }

    pub fn with_runbook_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        self.runbook_dir = dir.map(|d| d.as_ref().to_path_buf());
        self
    }

    /// Latency of the simulated action executor.
    pub fn with_action_latency(mut self, latency: Duration) -> Self {
        self.action_latency = latency;
        self
    }

    /// Require ingestion callers to present this secret.
    pub fn with_ingest_secret(mut self, secret: Option<String>) -> Self {
        self.ingest_secret = secret;
        self
    }

    pub fn with_repository(mut self, repository: Arc<dyn IncidentRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn ContextRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn DiagnosisGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_action_executor(mut self, actions: Arc<dyn ActionExecutor>) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Builds the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Store` if the database path is invalid or the
    /// database cannot be initialized, and `BuildError::Generator` if the
    /// Ollama configuration is rejected.
    pub async fn build(self) -> Result<Remedy, BuildError> {
        let repository: Arc<dyn IncidentRepository> = match self.repository {
            Some(repository) => repository,
            None => {
                let path = match self.database_path {
                    Some(path) => path,
                    None => Self::default_database_path()?,
                };
                debug!("Using incident database at {}", path.display());
                Arc::new(SqliteIncidentStore::open(path).await?)
            }
        };

        let generator: Arc<dyn DiagnosisGenerator> = match self.generator {
            Some(generator) => generator,
            None => Arc::new(OllamaGenerator::new(&self.ollama_url, self.model)?),
        };

        let retriever: Arc<dyn ContextRetriever> = match self.retriever {
            Some(retriever) => retriever,
            None => {
                let retriever = HistoryRetriever::new(Arc::clone(&repository));
                Arc::new(match self.runbook_dir {
                    Some(dir) => retriever.with_runbook_dir(dir),
                    None => retriever,
                })
            }
        };

        let actions: Arc<dyn ActionExecutor> = match self.actions {
            Some(actions) => actions,
            None => Arc::new(SimulatedActionExecutor::new(self.action_latency)),
        };

        let pipeline =
            DiagnosisPipeline::new(Arc::clone(&repository), retriever, generator, self.app);
        let executor = RemediationExecutor::new(Arc::new(PlanStore::new(self.retention)), actions);

        Ok(Remedy::new(
            repository,
            pipeline,
            executor,
            self.ingest_secret.map(SharedSecret::new),
        ))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf, StoreError> {
        xdg::BaseDirectories::with_prefix("remedy")
            .place_data_file("remedy.db")
            .map_err(|e| StoreError::XdgDirectory(e.to_string()))
    }
}

impl Default for RemedyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

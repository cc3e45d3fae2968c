#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use remedy_core::{
    diagnosis::{ContextRetriever, DiagnosisGenerator, PromptInputs, RetrievedContext},
    error::{ActionError, GeneratorError, RetrievalError},
    models::{Incident, RemediationAction},
    params::IncidentSubmission,
    remediation::ActionExecutor,
    IncidentRepository, Remedy, RemedyBuilder, SqliteIncidentStore,
};
use tempfile::TempDir;

/// Open a fresh SQLite store in a temporary directory.
pub async fn create_test_store() -> (TempDir, Arc<SqliteIncidentStore>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteIncidentStore::open(temp_dir.path().join("test.db"))
        .await
        .expect("Failed to open store");
    (temp_dir, Arc::new(store))
}

pub fn submission(title: &str) -> IncidentSubmission {
    IncidentSubmission {
        source: "monitoring".to_string(),
        title: title.to_string(),
        description: format!("{title} observed in production"),
        severity: Some("high".to_string()),
    }
}

/// Store a valid incident and return it.
pub async fn seed_incident(store: &dyn IncidentRepository, title: &str) -> Incident {
    let incident = remedy_core::ingest::normalize(&submission(title)).expect("valid submission");
    store.create(&incident).await.expect("Failed to create incident")
}

pub fn some_context() -> RetrievedContext {
    RetrievedContext {
        runbooks: vec!["db-timeout: restart the api".to_string()],
        ..Default::default()
    }
}

/// Retriever that returns a fixed answer and counts calls.
pub struct FixedRetriever {
    context: Option<RetrievedContext>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FixedRetriever {
    pub fn with(context: Option<RetrievedContext>) -> Self {
        Self {
            context,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            context: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContextRetriever for FixedRetriever {
    async fn retrieve_context(
        &self,
        _incident: &Incident,
    ) -> Result<Option<RetrievedContext>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::Runbook {
                path: "runbooks".into(),
                source: std::io::Error::other("unreadable"),
            });
        }
        Ok(self.context.clone())
    }
}

pub enum Script {
    Respond(String),
    /// Answer after sleeping, leaving room for concurrent writers.
    RespondAfter(Duration, String),
    Fail(GeneratorError),
    Panic,
}

/// Generator that replays a scripted answer and records prompts.
pub struct ScriptedGenerator {
    script: Script,
    pub prompts: Mutex<Vec<PromptInputs>>,
}

impl ScriptedGenerator {
    pub fn responding(raw: &str) -> Self {
        Self::new(Script::Respond(raw.to_string()))
    }

    pub fn new(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl DiagnosisGenerator for ScriptedGenerator {
    async fn propose(&self, inputs: &PromptInputs) -> Result<String, GeneratorError> {
        self.prompts.lock().push(inputs.clone());
        match &self.script {
            Script::Respond(raw) => Ok(raw.clone()),
            Script::RespondAfter(delay, raw) => {
                tokio::time::sleep(*delay).await;
                Ok(raw.clone())
            }
            Script::Fail(error) => Err(error.clone()),
            Script::Panic => panic!("generator crashed"),
        }
    }
}

pub const VALID_RESPONSE: &str = r#"{"rootCause": "Connection pool exhausted", "steps": ["restart api", "scale db to 3", "notify the DBA"], "confidence": "HIGH"}"#;

/// Action executor that records what it ran and can fail selected services.
pub struct RecordingActions {
    latency: Duration,
    fail_service: Option<String>,
    pub executed: Mutex<Vec<String>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RecordingActions {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_service: None,
            executed: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, service: &str) -> Self {
        self.fail_service = Some(service.to_string());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl ActionExecutor for RecordingActions {
    async fn execute(&self, action: &RemediationAction) -> Result<String, ActionError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;
        let label = match action {
            RemediationAction::RestartService { service_name } => format!("restart {service_name}"),
            RemediationAction::ScaleCluster {
                cluster_id,
                desired_capacity,
            } => format!("scale {cluster_id} {desired_capacity}"),
            RemediationAction::ManualStep { instructions } => format!("manual {instructions}"),
        };
        self.executed.lock().push(label.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let RemediationAction::RestartService { service_name } = action {
            if self.fail_service.as_deref() == Some(service_name.as_str()) {
                return Err(ActionError::TargetUnavailable {
                    target: service_name.clone(),
                });
            }
        }
        Ok(format!("done: {label}"))
    }
}

/// Build an engine over a temp database with fake collaborators.
pub async fn create_test_engine(
    generator: Arc<ScriptedGenerator>,
    actions: Arc<RecordingActions>,
) -> (TempDir, Remedy) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let remedy = RemedyBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_retriever(Arc::new(FixedRetriever::with(Some(some_context()))))
        .with_generator(generator)
        .with_action_executor(actions)
        .build()
        .await
        .expect("Failed to build engine");
    (temp_dir, remedy)
}

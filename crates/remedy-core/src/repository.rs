//! Incident persistence boundary.
//!
//! [`IncidentRepository`] is the only way the engine reaches stored
//! incidents and diagnoses. [`SqliteIncidentStore`] is the production
//! implementation: every call opens a connection on the blocking thread
//! pool, so the store itself is cheap to clone and share.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::task;

use crate::{
    db::Database,
    error::StoreError,
    models::{
        Diagnosis, DiagnosisRef, Incident, IncidentFilter, IncidentStatus, Page, StatusKind,
        StoredDiagnosis,
    },
};

/// Storage operations the engine depends on.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<Incident>, StoreError>;

    /// Persist a new incident and return it with its assigned ID.
    async fn create(&self, incident: &Incident) -> Result<Incident, StoreError>;

    async fn search(&self, filter: &IncidentFilter, page: &Page)
        -> Result<Vec<Incident>, StoreError>;

    async fn save_diagnosis(
        &self,
        incident_id: u64,
        diagnosis: &Diagnosis,
    ) -> Result<DiagnosisRef, StoreError>;

    async fn latest_diagnosis(&self, incident_id: u64)
        -> Result<Option<StoredDiagnosis>, StoreError>;

    /// Overwrite the stored status if it is still `expected`, failing with
    /// [`StoreError::StatusChanged`] otherwise. Transition rules are enforced
    /// by the caller through [`crate::lifecycle::apply`].
    async fn update_status(
        &self,
        incident_id: u64,
        expected: StatusKind,
        status: IncidentStatus,
    ) -> Result<Incident, StoreError>;
}

/// SQLite-backed incident store.
#[derive(Debug, Clone)]
pub struct SqliteIncidentStore {
    db_path: PathBuf,
}

impl SqliteIncidentStore {
    /// Open (and if needed create) the database at `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || Database::new(&db_path_clone).map(|_| ()))
            .await
            .map_err(StoreError::join)??;

        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `op` against a fresh connection on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(StoreError::join)?
    }
}

#[async_trait]
impl IncidentRepository for SqliteIncidentStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<Incident>, StoreError> {
        self.with_db(move |db| db.get_incident(id)).await
    }

    async fn create(&self, incident: &Incident) -> Result<Incident, StoreError> {
        let incident = incident.clone();
        self.with_db(move |db| db.create_incident(&incident)).await
    }

    async fn search(
        &self,
        filter: &IncidentFilter,
        page: &Page,
    ) -> Result<Vec<Incident>, StoreError> {
        let filter = filter.clone();
        let page = *page;
        self.with_db(move |db| db.search_incidents(&filter, &page))
            .await
    }

    async fn save_diagnosis(
        &self,
        incident_id: u64,
        diagnosis: &Diagnosis,
    ) -> Result<DiagnosisRef, StoreError> {
        let diagnosis = diagnosis.clone();
        self.with_db(move |db| db.insert_diagnosis(incident_id, &diagnosis))
            .await
    }

    async fn latest_diagnosis(
        &self,
        incident_id: u64,
    ) -> Result<Option<StoredDiagnosis>, StoreError> {
        self.with_db(move |db| db.latest_diagnosis(incident_id))
            .await
    }

    async fn update_status(
        &self,
        incident_id: u64,
        expected: StatusKind,
        status: IncidentStatus,
    ) -> Result<Incident, StoreError> {
        self.with_db(move |db| db.update_incident_status(incident_id, expected, status))
            .await
    }
}

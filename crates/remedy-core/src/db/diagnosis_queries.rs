//! Diagnosis persistence.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use super::{conversion_error, timestamp_column};
use crate::{
    error::{DatabaseResultExt, StoreError},
    models::{Confidence, Diagnosis, DiagnosisRef, StoredDiagnosis},
};

const CHECK_INCIDENT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM incidents WHERE id = ?1)";
const INSERT_DIAGNOSIS_SQL: &str = "INSERT INTO diagnoses (incident_id, root_cause, steps, confidence, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_LATEST_DIAGNOSIS_SQL: &str = "SELECT id, incident_id, root_cause, steps, confidence, created_at FROM diagnoses WHERE incident_id = ?1 ORDER BY id DESC LIMIT 1";

impl super::Database {
    fn build_diagnosis_from_row(row: &rusqlite::Row) -> rusqlite::Result<StoredDiagnosis> {
        let steps_json: String = row.get(3)?;
        let steps: Vec<String> = serde_json::from_str(&steps_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let confidence_str: String = row.get(4)?;
        let confidence = confidence_str
            .parse::<Confidence>()
            .map_err(|e| conversion_error(4, e))?;

        Ok(StoredDiagnosis {
            id: DiagnosisRef(row.get::<_, i64>(0)? as u64),
            incident_id: row.get::<_, i64>(1)? as u64,
            diagnosis: Diagnosis {
                root_cause: row.get(2)?,
                steps,
                confidence,
            },
            created_at: timestamp_column(row, 5)?,
        })
    }

    /// Stores a diagnosis for an existing incident.
    pub fn insert_diagnosis(
        &mut self,
        incident_id: u64,
        diagnosis: &Diagnosis,
    ) -> Result<DiagnosisRef, StoreError> {
        let steps_json = serde_json::to_string(&diagnosis.steps)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_INCIDENT_EXISTS_SQL, params![incident_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to check incident existence")?;

        if !exists {
            return Err(StoreError::IncidentNotFound { id: incident_id });
        }

        tx.execute(
            INSERT_DIAGNOSIS_SQL,
            params![
                incident_id as i64,
                diagnosis.root_cause,
                steps_json,
                diagnosis.confidence.as_str(),
                Timestamp::now().to_string()
            ],
        )
        .db_context("Failed to insert diagnosis")?;

        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(DiagnosisRef(id))
    }

    /// Retrieves the most recent diagnosis recorded for an incident.
    pub fn latest_diagnosis(&self, incident_id: u64) -> Result<Option<StoredDiagnosis>, StoreError> {
        self.connection
            .query_row(
                SELECT_LATEST_DIAGNOSIS_SQL,
                params![incident_id as i64],
                Self::build_diagnosis_from_row,
            )
            .optional()
            .db_context("Failed to query diagnosis")
    }
}

//! Incident CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use super::{conversion_error, timestamp_column};
use crate::{
    error::{DatabaseResultExt, StoreError},
    models::{Incident, IncidentFilter, IncidentStatus, Page, Severity, StatusKind},
};

const INSERT_INCIDENT_SQL: &str = "INSERT INTO incidents (source, title, description, severity, status, diagnosis_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const INCIDENT_COLUMNS: &str =
    "id, source, title, description, severity, status, diagnosis_id, created_at, updated_at";
const UPDATE_INCIDENT_STATUS_SQL: &str =
    "UPDATE incidents SET status = ?1, diagnosis_id = COALESCE(?2, diagnosis_id), updated_at = ?3 WHERE id = ?4 AND status = ?5";
const INCIDENT_EXISTS_SQL: &str = "SELECT 1 FROM incidents WHERE id = ?1";

impl super::Database {
    /// Helper function to construct an Incident from a database row
    fn build_incident_from_row(row: &rusqlite::Row) -> rusqlite::Result<Incident> {
        let severity_str: String = row.get(4)?;
        let severity = severity_str
            .parse::<Severity>()
            .map_err(|e| conversion_error(4, e))?;

        let status_str: String = row.get(5)?;
        let kind = status_str
            .parse::<StatusKind>()
            .map_err(|e| conversion_error(5, e))?;
        let diagnosis_id = row.get::<_, Option<i64>>(6)?.map(|id| id as u64);
        let status =
            IncidentStatus::from_parts(kind, diagnosis_id).map_err(|e| conversion_error(6, e))?;

        Ok(Incident {
            id: row.get::<_, i64>(0)? as u64,
            source: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            severity,
            status,
            created_at: timestamp_column(row, 7)?,
            updated_at: timestamp_column(row, 8)?,
        })
    }

    /// Inserts an incident and returns it with its assigned ID and
    /// creation timestamps.
    pub fn create_incident(&mut self, incident: &Incident) -> Result<Incident, StoreError> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_INCIDENT_SQL,
            params![
                incident.source,
                incident.title,
                incident.description,
                incident.severity.as_str(),
                incident.status.kind().as_str(),
                incident.status.diagnosis().map(|r| r.0 as i64),
                &now_str,
                &now_str
            ],
        )
        .db_context("Failed to insert incident")?;

        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Incident {
            id,
            created_at: now,
            updated_at: now,
            ..incident.clone()
        })
    }

    /// Retrieves an incident by its ID.
    pub fn get_incident(&self, id: u64) -> Result<Option<Incident>, StoreError> {
        let query = format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = ?1");
        self.connection
            .query_row(&query, params![id as i64], Self::build_incident_from_row)
            .optional()
            .db_context("Failed to query incident")
    }

    /// Lists incidents matching `filter`, newest first.
    pub fn search_incidents(
        &self,
        filter: &IncidentFilter,
        page: &Page,
    ) -> Result<Vec<Incident>, StoreError> {
        let mut query = format!("SELECT {INCIDENT_COLUMNS} FROM incidents");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(severity) = filter.severity {
            conditions.push("severity = ?");
            params_vec.push(Box::new(severity.as_str()));
        }

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params_vec.push(Box::new(status.as_str()));
        }

        if let Some(ref source) = filter.source {
            conditions.push("source = ?");
            params_vec.push(Box::new(source.clone()));
        }

        if let Some(ref title) = filter.title_contains {
            conditions.push("title LIKE ?");
            params_vec.push(Box::new(format!("%{title}%")));
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        // IDs are assigned in creation order
        query.push_str(" ORDER BY id DESC LIMIT ? OFFSET ?");
        params_vec.push(Box::new(i64::from(page.limit)));
        params_vec.push(Box::new(i64::from(page.offset)));

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let incidents = stmt
            .query_map(&params_refs[..], Self::build_incident_from_row)
            .db_context("Failed to query incidents")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read incident row")?;

        Ok(incidents)
    }

    /// Replaces the stored status of an incident and returns the updated
    /// record. The last diagnosis reference is kept when the new status
    /// carries none.
    ///
    /// The write only applies while the stored status is still `expected`;
    /// otherwise [`StoreError::StatusChanged`] is returned and nothing is
    /// written.
    pub fn update_incident_status(
        &mut self,
        id: u64,
        expected: StatusKind,
        status: IncidentStatus,
    ) -> Result<Incident, StoreError> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let updated = tx
            .execute(
                UPDATE_INCIDENT_STATUS_SQL,
                params![
                    status.kind().as_str(),
                    status.diagnosis().map(|r| r.0 as i64),
                    Timestamp::now().to_string(),
                    id as i64,
                    expected.as_str()
                ],
            )
            .db_context("Failed to update incident status")?;

        if updated == 0 {
            let exists = tx
                .query_row(INCIDENT_EXISTS_SQL, params![id as i64], |_| Ok(()))
                .optional()
                .db_context("Failed to query incident")?
                .is_some();
            return Err(if exists {
                StoreError::StatusChanged { id, expected }
            } else {
                StoreError::IncidentNotFound { id }
            });
        }

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_incident(id)?
            .ok_or(StoreError::IncidentNotFound { id })
    }
}

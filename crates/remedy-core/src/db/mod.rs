//! Database operations and SQLite management for incidents and diagnoses.
//!
//! This module provides the synchronous, low-level side of the incident
//! store. Async callers go through [`crate::repository::SqliteIncidentStore`],
//! which runs these operations on the blocking thread pool.

use std::path::Path;

use rusqlite::{types::Type, Connection};

use crate::error::{DatabaseResultExt, StoreError};

pub mod diagnosis_queries;
pub mod incident_queries;
pub mod migrations;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

/// Wrap a column decoding failure so it surfaces as a rusqlite error.
pub(crate) fn conversion_error(column: usize, message: impl Into<String>) -> rusqlite::Error {
    let message: String = message.into();
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn timestamp_column(row: &rusqlite::Row, column: usize) -> rusqlite::Result<jiff::Timestamp> {
    row.get::<_, String>(column)?
        .parse::<jiff::Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

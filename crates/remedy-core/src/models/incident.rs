//! Incident model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{IncidentStatus, Severity};

/// Sentinel ID carried by incidents that have not been persisted yet.
pub const UNASSIGNED_ID: u64 = 0;

/// A reported operational problem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Identifier assigned by the store ([`UNASSIGNED_ID`] before that)
    pub id: u64,

    /// System that reported the incident
    pub source: String,

    pub title: String,

    pub description: String,

    pub severity: Severity,

    /// Current lifecycle state
    #[serde(default)]
    pub status: IncidentStatus,

    /// Timestamp when the incident was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the incident was last modified (UTC)
    pub updated_at: Timestamp,
}

impl Incident {
    /// Whether the store has assigned an ID.
    pub fn is_persisted(&self) -> bool {
        self.id != UNASSIGNED_ID
    }
}
